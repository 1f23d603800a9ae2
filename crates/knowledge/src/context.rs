//! Rendering of search hits into prompt context.

use crate::types::SearchHit;

/// Format hits as numbered blocks, nearest first.
///
/// Ordinals start at 1 for every call.
pub fn format_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("Document {}:\n{}", i + 1, hit.document.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;

    fn hit(id: u64, content: &str) -> SearchHit {
        SearchHit {
            distance: id as f32,
            document: Document {
                id,
                content: content.to_string(),
                metadata: serde_json::json!({}),
            },
        }
    }

    #[test]
    fn test_format_numbers_from_one() {
        let context = format_context(&[hit(7, "fn a() {}"), hit(2, "fn b() {}")]);
        assert_eq!(context, "Document 1:\nfn a() {}\n\nDocument 2:\nfn b() {}");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_context(&[]), "");
    }
}
