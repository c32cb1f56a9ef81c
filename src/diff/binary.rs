use content_inspector::{ContentType, inspect};
use tracing::debug;

/// Number of leading bytes inspected for binary detection
const INSPECT_LIMIT: usize = 8192;

/// Check whether `content` looks binary.
///
/// Only the first 8KB are inspected. Empty content is text.
#[must_use]
pub fn is_binary(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }

    let sample = &content[..content.len().min(INSPECT_LIMIT)];
    let is_binary = matches!(inspect(sample), ContentType::BINARY);

    debug!(is_binary, bytes_checked = sample.len(), "Binary detection complete");
    is_binary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content() {
        assert!(!is_binary(b"This is a text file\nWith multiple lines\n"));
    }

    #[test]
    fn test_binary_content() {
        assert!(is_binary(&[0xFF, 0x00, 0xAA, 0xBB, 0xCC, 0xDD]));
    }

    #[test]
    fn test_empty_content_is_text() {
        assert!(!is_binary(&[]));
    }

    #[test]
    fn test_utf8_content() {
        assert!(!is_binary("Grüße, 世界\n".as_bytes()));
    }

    #[test]
    fn test_nul_after_inspect_limit_is_ignored() {
        let mut content = vec![b'a'; INSPECT_LIMIT];
        content.push(0);
        assert!(!is_binary(&content));
    }
}
