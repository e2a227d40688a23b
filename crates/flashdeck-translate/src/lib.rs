//! Translation client for flashdeck
//!
//! Turns a short snippet into the text a new flashcard carries. The
//! [`Translator`] trait is the seam front-ends program against;
//! [`GoogleTranslator`] is the HTTP implementation.
//!
//! ```rust,no_run
//! use flashdeck_translate::{GoogleTranslator, TranslationRequest, Translator};
//!
//! # async fn run() -> flashdeck_translate::Result<()> {
//! let translator = GoogleTranslator::new("api-key")?;
//! let request = TranslationRequest::new("hola", "es", "en");
//! let translation = translator.translate(&request).await?;
//! println!("{}", translation.translated_text);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod google;
pub mod request;

pub use error::{Result, TranslateError};
pub use google::GoogleTranslator;
pub use request::{Translation, TranslationRequest, MAX_CHARS, MIN_CHARS};

/// Something that can translate a [`TranslationRequest`].
#[allow(async_fn_in_trait)]
pub trait Translator {
    /// Validate and translate. Input failing
    /// [`TranslationRequest::validate`] is rejected before any I/O.
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation>;
}
