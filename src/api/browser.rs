use std::time::Duration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Blob, BlobPropertyBag, DomException, FormData, Request, RequestInit, Response, Window};

use super::{form_fields, FormValue, WebhookError, WebhookResponse};
use crate::config::Config;
use crate::types::ChatMessage;

#[derive(Clone, Debug)]
pub struct WebhookClient {
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(config: &Config) -> Self {
        Self {
            timeout: config.webhook_timeout,
        }
    }

    pub async fn send(&self, url: &str, message: &ChatMessage) -> Result<WebhookResponse, WebhookError> {
        if url.is_empty() {
            return Err(WebhookError::Configuration);
        }

        let window = web_sys::window().ok_or_else(|| unexpected("window not available"))?;
        let form = build_form_data(message).map_err(unexpected)?;
        let controller = AbortController::new().map_err(unexpected)?;

        // Content-Type is left to the browser so it can add the boundary.
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&form.into());
        opts.set_signal(Some(&controller.signal()));
        let request = Request::new_with_str_and_init(url, &opts).map_err(unexpected)?;

        let timer = AbortTimer::start(&window, controller, self.timeout).map_err(unexpected)?;
        let outcome = exchange(&window, &request).await;
        drop(timer);
        outcome
    }
}

async fn exchange(window: &Window, request: &Request) -> Result<WebhookResponse, WebhookError> {
    let resp_value = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(classify)?;
    let resp: Response = resp_value.dyn_into().map_err(unexpected)?;
    let status = resp.status();

    let body = match resp.text() {
        Ok(promise) => JsFuture::from(promise).await.map(|text| text.as_string().unwrap_or_default()),
        Err(e) => Err(e),
    };
    let body = match body {
        Ok(body) => body,
        Err(e) if resp.ok() => return Err(classify(e)),
        Err(_) => String::new(),
    };

    if !resp.ok() {
        let err = WebhookError::from_response(status, &body);
        tracing::warn!("Webhook answered {}: {}", status, err);
        return Err(err);
    }

    Ok(WebhookResponse { status, body })
}

fn build_form_data(message: &ChatMessage) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    for (name, value) in form_fields(message) {
        match value {
            FormValue::Text(text) => form.append_with_str(name, &text)?,
            FormValue::File { bytes, filename, mime } => {
                let blob = blob_from_bytes(bytes, mime)?;
                form.append_with_blob_and_filename(name, &blob, filename)?;
            }
        }
    }
    Ok(form)
}

fn blob_from_bytes(bytes: &[u8], mime: &str) -> Result<Blob, JsValue> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Aborts the request once the timeout elapses; cleared on drop.
struct AbortTimer {
    window: Window,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl AbortTimer {
    fn start(window: &Window, controller: AbortController, timeout: Duration) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut()>::new(move || controller.abort());
        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis,
        )?;
        Ok(Self {
            window: window.clone(),
            handle,
            _callback: callback,
        })
    }
}

impl Drop for AbortTimer {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.handle);
    }
}

fn classify(e: JsValue) -> WebhookError {
    if let Some(exception) = e.dyn_ref::<DomException>() {
        if exception.name() == "AbortError" || exception.name() == "TimeoutError" {
            tracing::warn!("Webhook request timed out");
            return WebhookError::Timeout;
        }
    }
    // fetch rejects with a TypeError when no response arrives.
    if e.is_instance_of::<js_sys::TypeError>() {
        tracing::warn!("No response from webhook: {:?}", e);
        return WebhookError::Connectivity;
    }
    unexpected(e)
}

fn unexpected(e: impl std::fmt::Debug) -> WebhookError {
    tracing::error!("Webhook request failed: {:?}", e);
    WebhookError::Unexpected(format!("{:?}", e))
}
