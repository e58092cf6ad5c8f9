//! JSON echo handler.
//!
//! Parses each message as JSON and replies with
//! `{"message": <parsed value>, "at": <RFC 3339 timestamp>}`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::connection::MessageHandler;
use crate::error::Result;

/// Replies to every JSON message with the message and the time it was seen.
pub struct JsonEcho {
    clock: Box<dyn FnMut() -> DateTime<Utc> + Send>,
}

impl JsonEcho {
    /// Create a handler stamping replies with the current UTC time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Create a handler with a custom time source.
    #[must_use]
    pub fn with_clock(clock: impl FnMut() -> DateTime<Utc> + Send + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Build the reply for one message.
    ///
    /// # Errors
    ///
    /// Returns `Error::Handler` if `text` is not valid JSON.
    pub fn reply(&mut self, text: &str) -> Result<String> {
        let message: Value = serde_json::from_str(text)?;
        let at = (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true);
        log::info!("message received: {}", message);
        Ok(json!({ "message": message, "at": at }).to_string())
    }
}

impl Default for JsonEcho {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JsonEcho {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonEcho").finish_non_exhaustive()
    }
}

impl MessageHandler for JsonEcho {
    fn on_message(&mut self, text: String) -> Result<Option<String>> {
        self.reply(&text).map(Some)
    }
}
