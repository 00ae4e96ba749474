//! sw_message tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::Worker;

use super::json_result;

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// The message posted by the page, e.g. `{"action": "cleanGiphyCache", "giphys": [...]}`.
    pub message: serde_json::Value,
}

/// Output from the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageOutput {
    /// Whether the message named a known action. Work starts in the background.
    pub recognized: bool,
}

/// Implementation of the sw_message tool.
pub async fn message_impl(worker: &Worker, params: SwMessageParams) -> Result<CallToolResult, McpError> {
    let recognized = worker.handle_message(&params.message);
    json_result(&SwMessageOutput { recognized })
}
