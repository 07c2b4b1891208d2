use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::client_info::ClientInfo;

/// Filename the audio part is posted under.
pub const AUDIO_FILENAME: &str = "audio.mp3";
pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Category labels are opaque strings kept in insertion order.
pub type Category = String;

/// Binary audio attached to a chat turn.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: DEFAULT_AUDIO_MIME.to_string(),
        }
    }

    pub fn with_mime(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

/// One user turn, as posted to the webhook and kept in history.
///
/// The audio blob travels with the request only. Persisted history keeps
/// `audio_attached` as the record that a clip existed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub os: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub browser: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_attached: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_attached: bool,
    #[serde(skip)]
    pub audio: Option<AudioClip>,
}

impl ChatMessage {
    /// Builds a text-only message stamped with the current UTC time.
    pub fn new(text: impl Into<String>, client: &ClientInfo) -> Self {
        Self {
            text: text.into(),
            timestamp: now_timestamp(),
            os: client.os.clone(),
            browser: client.browser.clone(),
            audio_attached: false,
            image_attached: false,
            audio: None,
        }
    }

    pub fn with_audio(mut self, clip: AudioClip) -> Self {
        self.audio = Some(clip);
        self.audio_attached = true;
        self
    }
}

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 timestamp with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
