//! Low-level IndexedDB helpers using web-sys
//!
//! Wraps the callback-based IndexedDB API into Rust futures using
//! `wasm_bindgen_futures::JsFuture` and `js_sys::Promise`.

use std::cell::RefCell;
use std::rc::Rc;

use flashdeck_core::card::Collection;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    DomException, IdbDatabase, IdbFactory, IdbObjectStore, IdbOpenDbRequest, IdbRequest,
    IdbTransaction, IdbTransactionMode, IdbVersionChangeEvent,
};

use crate::error::{IndexedDbError, Result};

const DB_VERSION: u32 = 1;

/// Database name used by the web front-end.
pub const DEFAULT_DB_NAME: &str = "language-learning-db";

/// Object store name for settings.
pub const SETTINGS_STORE: &str = "settings";

/// Type alias for upgrade closure to reduce complexity
type UpgradeClosure = Rc<RefCell<Option<Closure<dyn FnMut(IdbVersionChangeEvent)>>>>;

/// Every object store with its key path.
fn object_stores() -> [(&'static str, &'static str); 4] {
    [
        (Collection::Active.name(), "id"),
        (Collection::Known.name(), "id"),
        (Collection::Unknown.name(), "id"),
        (SETTINGS_STORE, "key"),
    ]
}

/// Get the global IndexedDB factory.
pub fn idb_factory() -> Result<IdbFactory> {
    let global = js_sys::global();

    let idb: JsValue = js_sys::Reflect::get(&global, &"indexedDB".into())
        .map_err(|_| IndexedDbError::NotAvailable("no indexedDB on global".into()))?;

    if idb.is_undefined() || idb.is_null() {
        return Err(IndexedDbError::NotAvailable(
            "indexedDB is null/undefined".into(),
        ));
    }

    idb.dyn_into::<IdbFactory>()
        .map_err(|_| IndexedDbError::NotAvailable("indexedDB is not IdbFactory".into()))
}

/// Convert an IdbRequest into a JS Promise that resolves with the request's
/// result and rejects with its `DOMException`.
fn request_to_promise(req: &IdbRequest) -> Promise {
    let req_success = req.clone();
    let req_error = req.clone();

    Promise::new(&mut move |resolve, reject| {
        // Store closures in Rc<RefCell> to manage their lifetime without leaking
        type ClosurePair = (
            Closure<dyn FnMut(web_sys::Event)>,
            Closure<dyn FnMut(web_sys::Event)>,
        );
        let closures: Rc<RefCell<Option<ClosurePair>>> = Rc::new(RefCell::new(None));

        let req_s = req_success.clone();
        let closures_for_success = closures.clone();
        let on_success = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let result = req_s.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::UNDEFINED, &result);
            *closures_for_success.borrow_mut() = None;
        }) as Box<dyn FnMut(web_sys::Event)>);

        let req_e = req_error.clone();
        let closures_for_error = closures.clone();
        let on_error = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let err = match req_e.error() {
                Ok(Some(e)) => JsValue::from(e),
                _ => JsValue::from_str("unknown IDB error"),
            };
            let _ = reject.call1(&JsValue::UNDEFINED, &err);
            *closures_for_error.borrow_mut() = None;
        }) as Box<dyn FnMut(web_sys::Event)>);

        req_success.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
        req_error.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        // Keep both closures alive until one fires
        *closures.borrow_mut() = Some((on_success, on_error));
    })
}

/// Convert an IdbTransaction completion into a JS Promise.
fn transaction_to_promise(tx: &IdbTransaction) -> Promise {
    let tx_complete = tx.clone();
    let tx_error = tx.clone();

    Promise::new(&mut move |resolve, reject| {
        type ClosurePair = (
            Closure<dyn FnMut(web_sys::Event)>,
            Closure<dyn FnMut(web_sys::Event)>,
        );
        let closures: Rc<RefCell<Option<ClosurePair>>> = Rc::new(RefCell::new(None));

        let closures_for_complete = closures.clone();
        let on_complete = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let _ = resolve.call0(&JsValue::UNDEFINED);
            *closures_for_complete.borrow_mut() = None;
        }) as Box<dyn FnMut(web_sys::Event)>);

        let tx_e = tx_error.clone();
        let closures_for_error = closures.clone();
        let on_error = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let msg = tx_e
                .error()
                .map(|e| JsValue::from(e.message()))
                .unwrap_or_else(|| JsValue::from_str("transaction error"));
            let _ = reject.call1(&JsValue::UNDEFINED, &msg);
            *closures_for_error.borrow_mut() = None;
        }) as Box<dyn FnMut(web_sys::Event)>);

        tx_complete.set_oncomplete(Some(on_complete.as_ref().unchecked_ref()));
        tx_error.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        *closures.borrow_mut() = Some((on_complete, on_error));
    })
}

/// Classify a rejected request by its `DOMException` name.
fn request_error(err: JsValue) -> IndexedDbError {
    match err.dyn_ref::<DomException>() {
        Some(e) if e.name() == "ConstraintError" => IndexedDbError::Constraint(e.message()),
        Some(e) => IndexedDbError::Request(format!("{}: {}", e.name(), e.message())),
        None => IndexedDbError::from(err),
    }
}

/// Create whichever object stores are missing. Runs inside `upgradeneeded`.
fn create_object_stores(event: &IdbVersionChangeEvent) -> std::result::Result<(), JsValue> {
    let target = event
        .target()
        .ok_or_else(|| JsValue::from_str("upgrade event has no target"))?;
    let req: IdbOpenDbRequest = target.unchecked_into();
    let db: IdbDatabase = req.result()?.unchecked_into();

    let existing = db.object_store_names();
    for (name, key_path) in object_stores() {
        if existing.contains(name) {
            continue;
        }
        let params = web_sys::IdbObjectStoreParameters::new();
        js_sys::Reflect::set(&params, &"keyPath".into(), &key_path.into())?;
        db.create_object_store_with_optional_parameters(name, &params)?;
    }
    Ok(())
}

/// Open (or create) the flashdeck IndexedDB database.
pub async fn open_database(db_name: &str) -> Result<IdbDatabase> {
    let factory = idb_factory()?;

    let open_req: IdbOpenDbRequest = factory
        .open_with_u32(db_name, DB_VERSION)
        .map_err(|e| IndexedDbError::Open(format!("{:?}", e)))?;

    // Store upgrade closure to manage its lifetime without leaking
    let upgrade_closure: UpgradeClosure = Rc::new(RefCell::new(None));
    let upgrade_closure_for_drop = upgrade_closure.clone();
    let upgrade_error: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let upgrade_error_for_closure = upgrade_error.clone();

    let on_upgrade = Closure::wrap(Box::new(move |event: IdbVersionChangeEvent| {
        if let Err(e) = create_object_stores(&event) {
            tracing::error!(error = ?e, "failed to create object stores");
            *upgrade_error_for_closure.borrow_mut() = Some(format!("{:?}", e));
            // Aborting the versionchange transaction fails the open request.
            if let Some(tx) = event
                .target()
                .and_then(|t| t.dyn_into::<IdbOpenDbRequest>().ok())
                .and_then(|req| req.transaction())
            {
                let _ = tx.abort();
            }
        }
    }) as Box<dyn FnMut(IdbVersionChangeEvent)>);

    open_req.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));
    *upgrade_closure.borrow_mut() = Some(on_upgrade);

    let open_promise = request_to_promise(open_req.unchecked_ref());
    let result = wasm_bindgen_futures::JsFuture::from(open_promise).await;

    *upgrade_closure_for_drop.borrow_mut() = None;

    let recorded = upgrade_error.borrow_mut().take();
    settle_open(result, recorded)
}

/// Resolve an open request, failing when the upgrade did not create the schema.
fn settle_open(
    result: std::result::Result<JsValue, JsValue>,
    upgrade_error: Option<String>,
) -> Result<IdbDatabase> {
    if let Some(message) = upgrade_error {
        if let Ok(Ok(db)) = result.map(|value| value.dyn_into::<IdbDatabase>()) {
            db.close();
        }
        return Err(IndexedDbError::Open(format!("upgrade failed: {message}")));
    }

    result
        .map_err(|e| IndexedDbError::Open(request_error(e).to_string()))?
        .dyn_into::<IdbDatabase>()
        .map_err(|_| IndexedDbError::Open("result is not IdbDatabase".into()))
}

/// Start a transaction on a single object store.
pub fn begin_transaction(
    db: &IdbDatabase,
    store_name: &str,
    mode: IdbTransactionMode,
) -> Result<(IdbTransaction, IdbObjectStore)> {
    let tx = db
        .transaction_with_str_and_mode(store_name, mode)
        .map_err(|e| IndexedDbError::Transaction(format!("{:?}", e)))?;
    let store = tx
        .object_store(store_name)
        .map_err(|e| IndexedDbError::Request(format!("{:?}", e)))?;
    Ok((tx, store))
}

/// Start one transaction spanning several object stores.
pub fn begin_multi_transaction(
    db: &IdbDatabase,
    store_names: &[&str],
    mode: IdbTransactionMode,
) -> Result<IdbTransaction> {
    let names = js_sys::Array::new();
    for name in store_names {
        names.push(&JsValue::from_str(name));
    }
    db.transaction_with_str_sequence_and_mode(&names, mode)
        .map_err(|e| IndexedDbError::Transaction(format!("{:?}", e)))
}

/// Await an IdbRequest, resolving to its result JsValue.
pub async fn await_request(req: &IdbRequest) -> Result<JsValue> {
    let promise = request_to_promise(req);
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(request_error)
}

/// Await an IdbTransaction to complete.
pub async fn await_transaction(tx: &IdbTransaction) -> Result<()> {
    let promise = transaction_to_promise(tx);
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|e| IndexedDbError::Transaction(format!("{:?}", e)))?;
    Ok(())
}

/// Delete an IndexedDB database by name.
pub async fn delete_database(db_name: &str) -> Result<()> {
    let factory = idb_factory()?;
    let req = factory
        .delete_database(db_name)
        .map_err(|e| IndexedDbError::Open(format!("delete db: {:?}", e)))?;
    let promise = request_to_promise(req.unchecked_ref());
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|e| IndexedDbError::Open(format!("delete db: {:?}", e)))?;
    Ok(())
}
