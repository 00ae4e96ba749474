//! Control messages pushed in by the host page.

use serde::{Deserialize, Serialize};

/// A recognized control message.
///
/// Wire form: `{"action": "cleanGiphyCache", "giphys": ["https://...", ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ControlMessage {
    /// Prune the media cache down to the listed URLs.
    #[serde(rename = "cleanGiphyCache")]
    CleanGiphyCache { giphys: Vec<String> },
}

impl ControlMessage {
    /// Parse a message; anything unrecognized or malformed yields `None`.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}
