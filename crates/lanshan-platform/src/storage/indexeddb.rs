//! IndexedDB storage backend.
//! One object store of byte values keyed by string. Every request is awaited,
//! writes included, so a completed `set` has reached the database.

use async_trait::async_trait;
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

use lanshan_core::ports::StoragePort;
use lanshan_types::{ChatError, Result};

const DB_NAME: &str = "lanshan_storage";
const STORE_NAME: &str = "kv";
const DB_VERSION: u32 = 1;

pub struct IndexedDbStorage {
    db: IdbDatabase,
}

impl IndexedDbStorage {
    /// Open (or create) the database.
    pub async fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Storage("no window object".to_string()))?;
        let factory = window
            .indexed_db()
            .map_err(storage_error)?
            .ok_or_else(|| ChatError::Storage("IndexedDB not available".to_string()))?;
        let open_req = factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(storage_error)?;

        let upgrade_req = open_req.clone();
        let on_upgrade = Closure::once(move |_: web_sys::Event| {
            let db = upgrade_req
                .result()
                .ok()
                .and_then(|r| r.dyn_into::<IdbDatabase>().ok());
            match db {
                Some(db) if !db.object_store_names().contains(STORE_NAME) => {
                    if let Err(e) = db.create_object_store(STORE_NAME) {
                        log::error!("failed to create object store: {:?}", e);
                    }
                }
                Some(_) => {}
                None => log::error!("upgrade fired without a database"),
            }
        });
        open_req.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));
        on_upgrade.forget();

        let db = await_request(&open_req)
            .await?
            .dyn_into::<IdbDatabase>()
            .map_err(storage_error)?;
        Ok(Self { db })
    }

    fn store(&self, mode: IdbTransactionMode) -> Result<IdbObjectStore> {
        self.db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .and_then(|tx| tx.object_store(STORE_NAME))
            .map_err(storage_error)
    }
}

#[async_trait(?Send)]
impl StoragePort for IndexedDbStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let req = self
            .store(IdbTransactionMode::Readonly)?
            .get(&JsValue::from_str(key))
            .map_err(storage_error)?;
        let value = await_request(&req).await?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        Ok(Some(Uint8Array::new(&value).to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let req = self
            .store(IdbTransactionMode::Readwrite)?
            .put_with_key(&Uint8Array::from(value), &JsValue::from_str(key))
            .map_err(storage_error)?;
        await_request(&req).await.map(|_| ())
    }

    fn backend_name(&self) -> &str {
        "indexeddb"
    }
}

fn storage_error(e: JsValue) -> ChatError {
    ChatError::Storage(format!("{:?}", e))
}

/// Resolve when the request fires `success`, reject on `error`.
async fn await_request(req: &IdbRequest) -> Result<JsValue> {
    let target = req.clone();
    let promise = Promise::new(&mut |resolve, reject| {
        let source = target.clone();
        let on_success = Closure::once(move |_: web_sys::Event| {
            let _ = resolve.call1(&JsValue::NULL, &source.result().unwrap_or(JsValue::UNDEFINED));
        });
        let on_error = Closure::once(move |_: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        });
        target.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
        target.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_success.forget();
        on_error.forget();
    });
    JsFuture::from(promise).await.map_err(storage_error)
}
