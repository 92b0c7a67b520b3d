//! Extraction of a structured JSON object from free-form model output.
//!
//! Models wrap JSON in prose, markdown fences, or trailing commentary no
//! matter how strictly the prompt forbids it. The contract here: find the
//! first balanced `{...}` substring (string- and escape-aware), then
//! decode it strictly.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonExtractError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    #[error("embedded JSON failed to decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Returns the first balanced `{...}` substring, or `None`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts and strictly decodes the embedded object.
pub fn decode_embedded<T: DeserializeOwned>(text: &str) -> Result<T, JsonExtractError> {
    let raw = extract_json_object(text).ok_or(JsonExtractError::NoJsonObject)?;
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        score: i64,
        label: String,
    }

    #[test]
    fn test_extracts_object_embedded_in_prose() {
        let text = r#"Here is the result: {"score": 85, "label": "good"} thanks!"#;
        let sample: Sample = decode_embedded(text).unwrap();
        assert_eq!(
            sample,
            Sample {
                score: 85,
                label: "good".to_string()
            }
        );
    }

    #[test]
    fn test_handles_markdown_fences() {
        let text = "```json\n{\"score\": 1, \"label\": \"x\"}\n```";
        let sample: Sample = decode_embedded(text).unwrap();
        assert_eq!(sample.score, 1);
    }

    #[test]
    fn test_nested_objects_stay_balanced() {
        let text = r#"out: {"a": {"b": {"c": 1}}, "d": 2} trailing { junk"#;
        assert_eq!(
            extract_json_object(text).unwrap(),
            r#"{"a": {"b": {"c": 1}}, "d": 2}"#
        );
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"{"label": "has } and { inside", "score": 3}"#;
        let sample: Sample = decode_embedded(text).unwrap();
        assert_eq!(sample.label, "has } and { inside");
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let text = r#"{"label": "she said \"hi}\"", "score": 4}"#;
        let sample: Sample = decode_embedded(text).unwrap();
        assert_eq!(sample.score, 4);
    }

    #[test]
    fn test_no_object_at_all() {
        let err = decode_embedded::<Sample>("the model refused to answer").unwrap_err();
        assert!(matches!(err, JsonExtractError::NoJsonObject));
    }

    #[test]
    fn test_unbalanced_object_yields_none() {
        assert!(extract_json_object(r#"{"score": 1"#).is_none());
    }

    #[test]
    fn test_wrong_shape_is_a_decode_error() {
        let err = decode_embedded::<Sample>(r#"{"unexpected": true}"#).unwrap_err();
        assert!(matches!(err, JsonExtractError::Decode(_)));
    }

    #[test]
    fn test_picks_the_first_object() {
        let text = r#"{"score": 1, "label": "first"} and then {"score": 2, "label": "second"}"#;
        let sample: Sample = decode_embedded(text).unwrap();
        assert_eq!(sample.label, "first");
    }
}
