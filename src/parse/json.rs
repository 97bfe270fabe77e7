//! JSON object replies.

use serde_json::{Map, Value};

use super::ParseError;

/// Top-level keys of an enrichment reply.
pub const ENRICHMENT_KEYS: &[&str] = &["tokens", "idioms", "translation", "notes", "confidence"];

/// Extract the JSON object in `text` and keep only `keys`.
///
/// Surrounding prose and fences are tolerated: the object is taken from the
/// first `{` to the last `}`.  Absent keys are simply missing from the map.
pub fn parse_json_object(text: &str, keys: &[&str]) -> Result<Map<String, Value>, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }

    let value: Value = serde_json::from_str(&text[start..=end])?;
    let Value::Object(mut object) = value else {
        return Err(ParseError::NoJsonObject);
    };

    let mut kept = Map::new();
    for key in keys {
        if let Some(v) = object.remove(*key) {
            kept.insert((*key).to_string(), v);
        }
    }
    if !object.is_empty() {
        log::debug!(
            "parse: ignored unexpected keys {:?}",
            object.keys().collect::<Vec<_>>()
        );
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_from_fences_and_prose() {
        let text = "Sure!\n```json\n{\"translation\": \"The king comes.\", \"confidence\": 0.8, \"extra\": 1}\n```\nHope this helps.";
        let object = parse_json_object(text, ENRICHMENT_KEYS).unwrap();
        assert_eq!(object["translation"], "The king comes.");
        assert_eq!(object["confidence"], 0.8);
        assert!(!object.contains_key("extra"));
        assert!(!object.contains_key("idioms"));
    }

    #[test]
    fn nested_braces_survive() {
        let text = r#"{"tokens": [{"form": "rex", "gloss": "king"}], "notes": []}"#;
        let object = parse_json_object(text, ENRICHMENT_KEYS).unwrap();
        assert_eq!(object["tokens"][0]["gloss"], "king");
    }

    #[test]
    fn missing_object_is_an_error() {
        assert!(matches!(
            parse_json_object("no json here", ENRICHMENT_KEYS),
            Err(ParseError::NoJsonObject)
        ));
        assert!(matches!(
            parse_json_object("} backwards {", ENRICHMENT_KEYS),
            Err(ParseError::NoJsonObject)
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_json_object("{\"translation\": }", ENRICHMENT_KEYS),
            Err(ParseError::Json(_))
        ));
    }
}
