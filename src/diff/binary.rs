use content_inspector::{ContentType, inspect};
use tracing::debug;

/// Number of leading bytes inspected for binary detection.
const INSPECT_LEN: usize = 8192;

/// Whether `content` looks binary.
///
/// Only the first 8KB are inspected. Empty content counts as text.
#[must_use]
pub fn is_binary(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }

    let head = &content[..content.len().min(INSPECT_LEN)];
    let is_binary = matches!(inspect(head), ContentType::BINARY);

    debug!(is_binary, bytes_checked = head.len(), "Binary detection complete");
    is_binary
}
