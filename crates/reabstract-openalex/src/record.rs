//! Work record parsing: pull the inverted-index payload out of one JSON line

use sonic_rs::JsonValueTrait;

use crate::error::LineError;

/// Field holding the serialized inverted index in OpenAlex work records
pub const DEFAULT_PAYLOAD_FIELD: &str = "abstract_inverted_index";

/// Work identifier field carried into JSONL output
pub const DEFAULT_ID_FIELD: &str = "id";

/// Payload and id extracted from a work record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPayload {
    pub id: Option<String>,
    pub payload: String,
}

/// Parse a record line and extract its payload.
///
/// Returns `Ok(None)` when the payload field is absent, `null` or not a
/// string: such works simply have no abstract. Only a line that is not a JSON
/// object is an error.
pub fn extract_payload(
    line: &str,
    payload_field: &str,
    id_field: Option<&str>,
) -> Result<Option<WorkPayload>, LineError> {
    let record: sonic_rs::Value =
        sonic_rs::from_str(line).map_err(|e| LineError::MalformedRecord(e.to_string()))?;
    if !record.is_object() {
        return Err(LineError::MalformedRecord(
            "record is not a JSON object".to_string(),
        ));
    }

    let Some(payload) = record.get(payload_field).and_then(|v| v.as_str()) else {
        return Ok(None);
    };
    let id = id_field
        .and_then(|f| record.get(f))
        .and_then(|v| v.as_str())
        .map(str::to_owned);

    Ok(Some(WorkPayload {
        id,
        payload: payload.to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(line: &str) -> Result<Option<WorkPayload>, LineError> {
        extract_payload(line, DEFAULT_PAYLOAD_FIELD, Some(DEFAULT_ID_FIELD))
    }

    #[test]
    fn string_payload_extracted() {
        let payload = r#"{"IndexLength":1,"InvertedIndex":{"x":[0]}}"#;
        let line = json!({
            "id": "https://openalex.org/W2741809807",
            "title": "The state of OA",
            "abstract_inverted_index": payload,
        })
        .to_string();

        let work = extract(&line).unwrap().unwrap();
        assert_eq!(work.id.as_deref(), Some("https://openalex.org/W2741809807"));
        assert_eq!(work.payload, payload);
    }

    #[test]
    fn missing_field_skipped() {
        let line = json!({"id": "W1", "title": "No abstract"}).to_string();
        assert_eq!(extract(&line).unwrap(), None);
    }

    #[test]
    fn null_field_skipped() {
        let line = json!({"id": "W1", "abstract_inverted_index": null}).to_string();
        assert_eq!(extract(&line).unwrap(), None);
    }

    #[test]
    fn non_string_field_skipped() {
        for value in [json!(42), json!({"Hello": [0]}), json!(["a"]), json!(true)] {
            let line = json!({"id": "W1", "abstract_inverted_index": value}).to_string();
            assert_eq!(extract(&line).unwrap(), None, "{value}");
        }
    }

    #[test]
    fn id_optional() {
        let line = json!({"abstract_inverted_index": "{}"}).to_string();
        let work = extract(&line).unwrap().unwrap();
        assert_eq!(work.id, None);

        let line = json!({"id": 7, "abstract_inverted_index": "{}"}).to_string();
        assert_eq!(extract(&line).unwrap().unwrap().id, None);

        let work = extract_payload(&line, DEFAULT_PAYLOAD_FIELD, None).unwrap().unwrap();
        assert_eq!(work.id, None);
    }

    #[test]
    fn custom_payload_field() {
        let line = json!({"inv": "{\"IndexLength\":0,\"InvertedIndex\":{}}"}).to_string();
        assert_eq!(extract(&line).unwrap(), None);
        let work = extract_payload(&line, "inv", None).unwrap().unwrap();
        assert_eq!(work.payload, r#"{"IndexLength":0,"InvertedIndex":{}}"#);
    }

    #[test]
    fn escaped_payload_unescaped() {
        let line = r#"{"abstract_inverted_index":"{\"IndexLength\":1,\"InvertedIndex\":{\"été\":[0]}}"}"#;
        let work = extract(line).unwrap().unwrap();
        assert_eq!(work.payload, r#"{"IndexLength":1,"InvertedIndex":{"été":[0]}}"#);
    }

    #[test]
    fn invalid_json_is_malformed_record() {
        let err = extract("{\"id\": \"W1\", ").unwrap_err();
        assert!(matches!(err, LineError::MalformedRecord(_)));
    }

    #[test]
    fn non_object_is_malformed_record() {
        for line in ["[1, 2, 3]", "\"text\"", "42", "null"] {
            let err = extract(line).unwrap_err();
            assert!(matches!(err, LineError::MalformedRecord(_)), "{line}");
        }
    }
}
