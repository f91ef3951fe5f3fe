use crate::types::analysis::{SentenceAnalysis, SyntacticElement};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

// ```json ... ```, ```js ... ``` or ``` ... ```, the whole (trimmed) response being the fence
const FENCE_PATTERN: &str = r"(?si)^```(?:[a-z]+)?\s*\n?(.*?)\n?\s*```$";

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(FENCE_PATTERN).ok()).as_ref()
}

/// Why a decoded document was rejected. Purely diagnostic: callers only see
/// "invalid shape".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("top-level array is empty")]
    EmptyArray,
    #[error("root is not an object")]
    RootNotObject,
    #[error("field '{0}' is missing or not a string")]
    NotAString(&'static str),
    #[error("field 'structure' is missing or not an array")]
    StructureNotArray,
    #[error("element at {path}: {reason}")]
    InvalidElement { path: String, reason: &'static str },
}

/// Returns the payload inside a markdown code fence, or the trimmed input when
/// there is no fence (or the fence is empty).
pub fn strip_code_fence(response_text: &str) -> &str {
    let trimmed = response_text.trim();
    fence_regex()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|inner| !inner.is_empty())
        .unwrap_or(trimmed)
}

/// Checks an arbitrary JSON value against the `SentenceAnalysis` shape and
/// builds the typed tree from it.
///
/// A top-level array is accepted and its first element is used, since the
/// model sometimes wraps the object.
pub fn validate_analysis(value: &Value) -> Result<SentenceAnalysis, ShapeError> {
    let root = match value {
        Value::Array(items) => items.first().ok_or(ShapeError::EmptyArray)?,
        other => other,
    };
    let object = root.as_object().ok_or(ShapeError::RootNotObject)?;

    let full_sentence = object
        .get("fullSentence")
        .and_then(Value::as_str)
        .ok_or(ShapeError::NotAString("fullSentence"))?;
    let classification = object
        .get("classification")
        .and_then(Value::as_str)
        .ok_or(ShapeError::NotAString("classification"))?;
    let structure = object
        .get("structure")
        .and_then(Value::as_array)
        .ok_or(ShapeError::StructureNotArray)?;

    Ok(SentenceAnalysis {
        full_sentence: full_sentence.to_string(),
        classification: classification.to_string(),
        structure: validate_elements(structure, "structure")?,
    })
}

fn validate_elements(items: &[Value], path: &str) -> Result<Vec<SyntacticElement>, ShapeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_element(item, &format!("{}[{}]", path, index)))
        .collect()
}

fn validate_element(item: &Value, path: &str) -> Result<SyntacticElement, ShapeError> {
    let invalid = |reason| ShapeError::InvalidElement { path: path.to_string(), reason };

    let object = item.as_object().ok_or_else(|| invalid("not an object"))?;
    let text = object.get("text").and_then(Value::as_str).ok_or_else(|| invalid("'text' is not a string"))?;
    let label = object.get("label").and_then(Value::as_str).ok_or_else(|| invalid("'label' is not a string"))?;

    let children = match object.get("children") {
        None | Some(Value::Null) => None,
        Some(Value::Array(kids)) => Some(validate_elements(kids, &format!("{}.children", path))?),
        Some(_) => return Err(invalid("'children' is not an array")),
    };

    Ok(SyntacticElement { text: text.to_string(), label: label.to_string(), children })
}

/// Fence-strips, decodes and validates a JSON-mode model response.
///
/// Both syntax errors and shape mismatches come back as `None`; the offending
/// payload goes to the log, never to the user.
pub fn decode_analysis(response_text: &str) -> Option<SentenceAnalysis> {
    let json_str = strip_code_fence(response_text);

    let parsed: Value = match serde_json::from_str(json_str) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, payload = json_str, "failed to parse model response as JSON");
            return None;
        }
    };

    match validate_analysis(&parsed) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            tracing::error!(
                error = %e,
                payload = %parsed,
                "model response does not match the SentenceAnalysis structure"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BODY: &str = r#"{"fullSentence":"Juan come manzanas","classification":"Oración simple","structure":[{"text":"Juan","label":"SN Sujeto","children":[{"text":"Juan","label":"N (N)"}]},{"text":"come manzanas","label":"SV - Predicado verbal"}]}"#;

    #[test]
    fn fenced_and_plain_bodies_decode_identically() {
        let plain = decode_analysis(BODY);
        assert!(plain.is_some());
        for fenced in [
            format!("```json\n{}\n```", BODY),
            format!("```\n{}\n```", BODY),
            format!("  ```JSON\n{}```  ", BODY),
            format!("```json {} ```", BODY),
        ] {
            assert_eq!(decode_analysis(&fenced), plain, "fence: {fenced:?}");
        }
    }

    #[test]
    fn other_language_tags_are_stripped_too() {
        let plain = decode_analysis(BODY);
        for fenced in [format!("```js\n{}\n```", BODY), format!("```javascript\n{}\n```", BODY)] {
            assert_eq!(decode_analysis(&fenced), plain, "fence: {fenced:?}");
        }
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("``````"), "``````");
    }

    #[test]
    fn accepts_singleton_array_wrapping() {
        let value: Value = serde_json::from_str(&format!("[{}]", BODY)).unwrap();
        let analysis = validate_analysis(&value).unwrap();
        assert_eq!(analysis.top_level_labels(), vec!["SN Sujeto", "SV - Predicado verbal"]);
    }

    #[test]
    fn rejects_empty_array() {
        assert_eq!(validate_analysis(&json!([])), Err(ShapeError::EmptyArray));
    }

    #[test]
    fn rejects_missing_label_deep_in_the_tree() {
        let value = json!({
            "fullSentence": "x",
            "classification": "y",
            "structure": [{
                "text": "a", "label": "SN",
                "children": [{ "text": "b", "label": "N", "children": [{ "text": "c" }] }]
            }]
        });
        match validate_analysis(&value) {
            Err(ShapeError::InvalidElement { path, .. }) => {
                assert_eq!(path, "structure[0].children[0].children[0]")
            }
            other => panic!("expected invalid element, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_string_text_and_non_array_children() {
        let numeric_text = json!({
            "fullSentence": "x", "classification": "y",
            "structure": [{ "text": 3, "label": "N" }]
        });
        assert!(validate_analysis(&numeric_text).is_err());

        let object_children = json!({
            "fullSentence": "x", "classification": "y",
            "structure": [{ "text": "a", "label": "N", "children": {} }]
        });
        assert!(validate_analysis(&object_children).is_err());
    }

    #[test]
    fn null_children_is_a_leaf() {
        let value = json!({
            "fullSentence": "x", "classification": "y",
            "structure": [{ "text": "a", "label": "N", "children": null }]
        });
        let analysis = validate_analysis(&value).unwrap();
        assert!(analysis.structure[0].is_leaf());
    }

    #[test]
    fn rejects_missing_root_fields() {
        assert_eq!(
            validate_analysis(&json!({ "classification": "y", "structure": [] })),
            Err(ShapeError::NotAString("fullSentence"))
        );
        assert_eq!(
            validate_analysis(&json!({ "fullSentence": "x", "classification": "y", "structure": "?" })),
            Err(ShapeError::StructureNotArray)
        );
        assert_eq!(validate_analysis(&json!("text")), Err(ShapeError::RootNotObject));
    }

    #[test]
    fn syntactically_invalid_json_is_none() {
        assert!(decode_analysis("```json\n{\"fullSentence\": \n```").is_none());
        assert!(decode_analysis("Lo siento, no puedo analizar esa oración.").is_none());
    }
}
