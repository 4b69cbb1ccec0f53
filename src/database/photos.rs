use serde_json::Value;

/// Encode an ordered photo reference list for the serialized column.
pub fn encode_refs(refs: &[String]) -> String {
    serde_json::to_string(refs).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a stored photo column value back into an ordered reference list.
///
/// Stored values can predate the current writer: null, malformed text, or
/// JSON that is not an array of strings all normalize to an empty (or
/// partial) list. A read never fails on a bad photo column.
pub fn normalize_refs(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ordered_list() {
        let refs = vec![
            "/uploads/prop_a.jpg".to_string(),
            "/uploads/prop_b.png".to_string(),
        ];
        assert_eq!(normalize_refs(Some(&encode_refs(&refs))), refs);
    }

    #[test]
    fn empty_list_round_trips() {
        let refs: Vec<String> = vec![];
        assert_eq!(encode_refs(&refs), "[]");
        assert_eq!(normalize_refs(Some("[]")), refs);
    }

    #[test]
    fn null_column_normalizes_to_empty() {
        assert!(normalize_refs(None).is_empty());
        assert!(normalize_refs(Some("null")).is_empty());
    }

    #[test]
    fn malformed_text_normalizes_to_empty() {
        assert!(normalize_refs(Some("not json at all")).is_empty());
        assert!(normalize_refs(Some("{\"photo\": \"x.jpg\"}")).is_empty());
        assert!(normalize_refs(Some("42")).is_empty());
    }

    #[test]
    fn non_string_members_are_dropped() {
        let normalized = normalize_refs(Some("[\"/uploads/a.jpg\", 7, null, \"/uploads/b.png\"]"));
        assert_eq!(normalized, vec!["/uploads/a.jpg", "/uploads/b.png"]);
    }
}
