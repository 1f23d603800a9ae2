//! Code extraction from model responses.

const FENCE: &str = "```";

/// Pull the first fenced code block out of a model response.
///
/// Splitting on the fence marker, the first odd-indexed segment is the code.
/// A leading tag line equal to `language` (ignoring case) is dropped. Text
/// without a fence is returned unchanged.
pub fn extract_first_code_block(text: &str, language: &str) -> String {
    if !text.contains(FENCE) {
        return text.to_string();
    }

    let block = text.split(FENCE).nth(1).unwrap_or_default();

    let (first_line, rest) = block.split_once('\n').unwrap_or((block, ""));
    if first_line.trim().eq_ignore_ascii_case(language) {
        rest.trim().to_string()
    } else {
        block.trim().to_string()
    }
}
