use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decode a JSON-in-text column.
///
/// Missing, blank, `null` or malformed text yields `T::default()`; rows written by
/// older clients contain all of these, and one bad column must not hide the row.
pub fn decode_json_text<T>(column: &str, raw: Option<&str>) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty() && *t != "null") else {
        return T::default();
    };

    match serde_json::from_str::<T>(text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!(
                "malformed JSON in column `{}` ({}), using empty value",
                column,
                e
            );
            T::default()
        }
    }
}

/// Strict variant of [`decode_json_text`]: reports whether the stored text is
/// already the canonical encoding of a valid value.
pub fn is_canonical_json_text<T>(raw: Option<&str>) -> bool
where
    T: DeserializeOwned + Serialize,
{
    let Some(text) = raw else {
        return false;
    };
    match serde_json::from_str::<T>(text) {
        Ok(value) => serde_json::to_string(&value).map(|c| c == text).unwrap_or(false),
        Err(_) => false,
    }
}

/// Encode a value for a JSON-in-text column
pub fn encode_json_text<T: Serialize>(value: &T) -> String {
    // Plain data structs and vecs; serialization cannot fail
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductOption, Seo};

    #[test]
    fn test_valid_json_decodes() {
        let options: Vec<ProductOption> = decode_json_text(
            "options",
            Some(r#"[{"title":"Size","values":["S","M"]}]"#),
        );
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].values, vec!["S", "M"]);
    }

    #[test]
    fn test_malformed_json_falls_back_to_empty() {
        let options: Vec<ProductOption> = decode_json_text("options", Some("[{\"title\":"));
        assert!(options.is_empty());

        let seo: Seo = decode_json_text("seo", Some("not json"));
        assert_eq!(seo, Seo::default());
    }

    #[test]
    fn test_missing_and_null_fall_back_to_empty() {
        let tags: Vec<String> = decode_json_text("tags", None);
        assert!(tags.is_empty());
        let tags: Vec<String> = decode_json_text("tags", Some("  "));
        assert!(tags.is_empty());
        let tags: Vec<String> = decode_json_text("tags", Some("null"));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_wrong_shape_falls_back_to_empty() {
        // an object where an array is expected
        let tags: Vec<String> = decode_json_text("tags", Some(r#"{"a":1}"#));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_canonical_detection() {
        assert!(is_canonical_json_text::<Vec<String>>(Some(r#"["a","b"]"#)));
        assert!(!is_canonical_json_text::<Vec<String>>(Some(r#"[ "a", "b" ]"#)));
        assert!(!is_canonical_json_text::<Vec<String>>(Some("garbage")));
        assert!(!is_canonical_json_text::<Vec<String>>(None));
    }

    #[test]
    fn test_encode_is_compact() {
        let tags = vec!["new".to_string(), "sale".to_string()];
        assert_eq!(encode_json_text(&tags), r#"["new","sale"]"#);
    }
}
