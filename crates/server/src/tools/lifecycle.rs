//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use shellcache_client::Worker;

use super::json_result;

/// Run the install event. A seed failure is returned as a tool error.
pub async fn install_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

/// Run the activate event. Refused until install has succeeded.
pub async fn activate_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}
