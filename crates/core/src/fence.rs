//! The fenced-JSON response convention.
//!
//! Models that cannot emit native tool calls are instructed to reply with a
//! single ```json block. This helper pulls the payload out of such a reply.

/// Extract the first ```json fenced block from `input`.
///
/// Returns the block's inner text if a complete fence is present, otherwise
/// the whole (trimmed) input — a model that skipped the fence but replied
/// with bare JSON still resolves.
pub fn extract_json_block(input: &str) -> &str {
    if let Some(start) = input.find("```json") {
        let after = &input[start + "```json".len()..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    input.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_block() {
        let input = "Here you go:\n```json\n{\"name\":\"finish\"}\n```\nDone.";
        assert_eq!(extract_json_block(input), "{\"name\":\"finish\"}");
    }

    #[test]
    fn first_block_wins() {
        let input = "```json\n{\"a\":1}\n```\n```json\n{\"b\":2}\n```";
        assert_eq!(extract_json_block(input), "{\"a\":1}");
    }

    #[test]
    fn no_fence_returns_whole_input() {
        assert_eq!(extract_json_block("  {\"name\":\"x\"}  "), "{\"name\":\"x\"}");
    }

    #[test]
    fn unclosed_fence_returns_whole_input() {
        let input = "```json\n{\"name\":\"x\"}";
        assert_eq!(extract_json_block(input), input.trim());
    }
}
