use js_sys::Promise;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbDatabase, IdbObjectStore, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest, IdbTransactionMode};

use super::{DatabaseError, WebhookRecord, DB_NAME, DB_VERSION, RECORD_ID, STORE_NAME};

/// IndexedDB-backed webhook URL store.
#[derive(Clone, Debug, Default)]
pub struct WebhookDb;

impl WebhookDb {
    pub fn new() -> Self {
        Self
    }

    /// The stored URL, or `None` if it was never saved.
    pub async fn load(&self) -> Result<Option<String>, DatabaseError> {
        let db = open().await?;
        let store = object_store(&db, IdbTransactionMode::Readonly).map_err(load_error)?;
        let request = store.get(&JsValue::from_str(RECORD_ID)).map_err(load_error)?;
        let value = await_request(&request).await.map_err(load_error)?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }

        let record: WebhookRecord = serde_wasm_bindgen::from_value(value)
            .map_err(|e| DatabaseError::Load(e.to_string()))?;
        Ok(Some(record.url))
    }

    pub async fn save(&self, url: &str) -> Result<(), DatabaseError> {
        let db = open().await?;
        let store = object_store(&db, IdbTransactionMode::Readwrite).map_err(save_error)?;
        let record = serde_wasm_bindgen::to_value(&WebhookRecord::new(url))
            .map_err(|e| DatabaseError::Save(e.to_string()))?;
        let request = store.put(&record).map_err(save_error)?;
        await_request(&request).await.map_err(save_error)?;
        Ok(())
    }
}

async fn open() -> Result<IdbDatabase, DatabaseError> {
    let window = web_sys::window()
        .ok_or_else(|| DatabaseError::Connection("window not available".to_string()))?;
    let factory = window
        .indexed_db()
        .map_err(connection_error)?
        .ok_or_else(|| DatabaseError::Connection("IndexedDB not available".to_string()))?;
    let request = factory
        .open_with_u32(DB_NAME, DB_VERSION)
        .map_err(connection_error)?;

    let on_upgrade = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        let Some(request) = event
            .target()
            .and_then(|target| target.dyn_into::<IdbOpenDbRequest>().ok())
        else {
            return;
        };
        let Ok(result) = request.result() else {
            return;
        };
        let db: IdbDatabase = result.unchecked_into();
        if !db.object_store_names().contains(STORE_NAME) {
            let params = IdbObjectStoreParameters::new();
            params.set_key_path(&JsValue::from_str("id"));
            if let Err(e) = db.create_object_store_with_optional_parameters(STORE_NAME, &params) {
                tracing::error!("Failed to create {} store: {:?}", STORE_NAME, e);
            }
        }
    });
    request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));

    // `on_upgrade` has to outlive the open request.
    let result = await_request(&request).await.map_err(connection_error)?;
    drop(on_upgrade);
    Ok(result.unchecked_into())
}

fn object_store(db: &IdbDatabase, mode: IdbTransactionMode) -> Result<IdbObjectStore, JsValue> {
    db.transaction_with_str_and_mode(STORE_NAME, mode)?
        .object_store(STORE_NAME)
}

/// Resolves with `request.result` on success, rejects with `request.error`.
async fn await_request(request: &IdbRequest) -> Result<JsValue, JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        let succeeded = request.clone();
        let on_success = Closure::once_into_js(move |_event: web_sys::Event| {
            let value = succeeded.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &value);
        });
        let failed = request.clone();
        let on_error = Closure::once_into_js(move |_event: web_sys::Event| {
            let reason = failed
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("request failed"));
            let _ = reject.call1(&JsValue::NULL, &reason);
        });
        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    });
    JsFuture::from(promise).await
}

fn connection_error(e: JsValue) -> DatabaseError {
    tracing::error!("Database connection error: {:?}", e);
    DatabaseError::Connection(format!("{:?}", e))
}

fn load_error(e: JsValue) -> DatabaseError {
    tracing::error!("Failed to load webhook URL: {:?}", e);
    DatabaseError::Load(format!("{:?}", e))
}

fn save_error(e: JsValue) -> DatabaseError {
    tracing::error!("Failed to save webhook URL: {:?}", e);
    DatabaseError::Save(format!("{:?}", e))
}
