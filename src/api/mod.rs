//! Delivery of chat messages to the configured webhook.
//!
//! A message goes out as one `multipart/form-data` POST. Whatever goes
//! wrong is folded into one of the five [`WebhookError`] categories, checked
//! in declaration order. There are no retries.

use thiserror::Error;

use crate::config::Config;
use crate::types::{ChatMessage, AUDIO_FILENAME};

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(target_arch = "wasm32")]
pub use browser::WebhookClient;
#[cfg(not(target_arch = "wasm32"))]
pub use native::WebhookClient;

pub const GENERIC_SERVER_ERROR: &str = "Failed to send message.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Webhook URL is not set.")]
    Configuration,
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("No response from server. Please try again later.")]
    Connectivity,
    /// Carries the underlying failure for logs; the display text is fixed.
    #[error("An unexpected error occurred.")]
    Unexpected(String),
}

impl WebhookError {
    /// Builds the error for a non-2xx reply, preferring the server's own
    /// `{"message": ...}` over the generic text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
        WebhookError::Server { status, message }
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")?
        .as_str()
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// A 2xx reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, PartialEq)]
pub enum FormValue<'a> {
    Text(String),
    File {
        bytes: &'a [u8],
        filename: &'static str,
        mime: &'a str,
    },
}

/// The multipart fields for `message`, in wire order.
pub fn form_fields(message: &ChatMessage) -> Vec<(&'static str, FormValue<'_>)> {
    let mut fields = vec![("text", FormValue::Text(message.text.clone()))];
    if let Some(audio) = &message.audio {
        fields.push((
            "audio",
            FormValue::File {
                bytes: &audio.bytes,
                filename: AUDIO_FILENAME,
                mime: &audio.mime,
            },
        ));
    }
    fields.push(("timestamp", FormValue::Text(message.timestamp.clone())));
    fields.push(("os", FormValue::Text(message.os.clone())));
    fields.push(("browser", FormValue::Text(message.browser.clone())));
    fields.push(("audioAttached", FormValue::Text(message.audio_attached.to_string())));
    fields.push(("imageAttached", FormValue::Text(message.image_attached.to_string())));
    fields
}

/// Posts `message` with the default five second timeout.
pub async fn send_to_webhook(url: &str, message: &ChatMessage) -> Result<WebhookResponse, WebhookError> {
    WebhookClient::new(&Config::default()).send(url, message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AudioClip;

    fn message() -> ChatMessage {
        ChatMessage {
            text: "hello".to_string(),
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            os: "Linux".to_string(),
            browser: "Firefox".to_string(),
            ..ChatMessage::default()
        }
    }

    fn names(fields: &[(&'static str, FormValue<'_>)]) -> Vec<&'static str> {
        fields.iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_form_fields_without_audio() {
        let message = message();
        let fields = form_fields(&message);
        assert_eq!(
            names(&fields),
            vec!["text", "timestamp", "os", "browser", "audioAttached", "imageAttached"]
        );
        assert_eq!(fields[4].1, FormValue::Text("false".to_string()));
    }

    #[test]
    fn test_form_fields_with_audio() {
        let message = message().with_audio(AudioClip::new(vec![0xff, 0xfb]));
        let fields = form_fields(&message);
        assert_eq!(
            names(&fields),
            vec!["text", "audio", "timestamp", "os", "browser", "audioAttached", "imageAttached"]
        );
        assert_eq!(
            fields[1].1,
            FormValue::File {
                bytes: &[0xff, 0xfb],
                filename: "audio.mp3",
                mime: "audio/mpeg",
            }
        );
        assert_eq!(fields[5].1, FormValue::Text("true".to_string()));
    }

    #[test]
    fn test_server_error_uses_body_message() {
        let err = WebhookError::from_response(400, r#"{"message":"X"}"#);
        assert_eq!(err.to_string(), "X");
        assert_eq!(
            err,
            WebhookError::Server {
                status: 400,
                message: "X".to_string()
            }
        );
    }

    #[test]
    fn test_server_error_falls_back_to_generic() {
        for body in ["", "Internal Server Error", r#"{"message":""}"#, r#"{"error":"nope"}"#, r#"{"message":7}"#] {
            let err = WebhookError::from_response(500, body);
            assert_eq!(err.to_string(), GENERIC_SERVER_ERROR, "body {:?}", body);
        }
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(WebhookError::Configuration.to_string(), "Webhook URL is not set.");
        assert_eq!(WebhookError::Timeout.to_string(), "Request timed out. Please try again.");
        assert_eq!(
            WebhookError::Connectivity.to_string(),
            "No response from server. Please try again later."
        );
        assert_eq!(
            WebhookError::Unexpected("boom".to_string()).to_string(),
            "An unexpected error occurred."
        );
    }
}
