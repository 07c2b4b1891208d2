use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::{form_fields, FormValue, WebhookError, WebhookResponse};
use crate::config::Config;
use crate::types::ChatMessage;

#[derive(Clone, Debug)]
pub struct WebhookClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout: config.webhook_timeout,
        }
    }

    pub async fn send(&self, url: &str, message: &ChatMessage) -> Result<WebhookResponse, WebhookError> {
        if url.is_empty() {
            return Err(WebhookError::Configuration);
        }

        let form = build_form(message)?;
        tracing::debug!("Posting message to {}", url);
        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(classify(e)),
            Err(_) => String::new(),
        };

        if !status.is_success() {
            let err = WebhookError::from_response(status.as_u16(), &body);
            tracing::warn!("Webhook answered {}: {}", status, err);
            return Err(err);
        }

        Ok(WebhookResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn build_form(message: &ChatMessage) -> Result<Form, WebhookError> {
    let mut form = Form::new();
    for (name, value) in form_fields(message) {
        form = match value {
            FormValue::Text(text) => form.text(name, text),
            FormValue::File { bytes, filename, mime } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(filename)
                    .mime_str(mime)
                    .map_err(|e| WebhookError::Unexpected(e.to_string()))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

fn classify(e: reqwest::Error) -> WebhookError {
    if e.is_timeout() {
        tracing::warn!("Webhook request timed out: {}", e);
        WebhookError::Timeout
    } else if e.is_connect() || e.is_request() {
        // `is_request` covers a connection that closes before any response
        // arrives, which counts as no response at all.
        tracing::warn!("No response from webhook: {}", e);
        WebhookError::Connectivity
    } else {
        tracing::error!("Webhook request failed: {}", e);
        WebhookError::Unexpected(e.to_string())
    }
}
