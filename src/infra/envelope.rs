//! Typed views of the backend's response envelopes.
//!
//! - List endpoints: `{paramObjectsMap: {<entity>VO: {data: [...], totalCount}}}`.
//! - Mutation endpoints: `{status: bool, paramObjectsMap: {...}}`.
//! - Error bodies may carry `message` and/or `error`.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};

use crate::domain::Page;
use crate::infra::brokerage::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEnvelope {
    #[serde(default)]
    param_objects_map: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPayload<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    total_count: Option<FlexNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationEnvelope {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    param_objects_map: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "paramObjectsMap")]
    param_objects_map: Option<Value>,
}

/// Acknowledgement of a successful mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationAck {
    pub message: Option<String>,
    pub payload: Option<Value>,
}

/// Numbers the backend sends either as JSON numbers or as strings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum FlexNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FlexNumber {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(raw) => raw.trim().parse().ok(),
        }
        .filter(|value: &f64| value.is_finite())
    }

    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            Self::Float(_) => None,
            Self::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

/// Decodes one list response. `key` names the `<entity>VO` entry; when it is
/// absent the first `*VO` entry in the map is used instead.
pub fn decode_list<T: DeserializeOwned>(body: Value, key: &str) -> Result<Page<T>, ApiError> {
    let envelope: ListEnvelope = serde_json::from_value(body)?;
    let map = envelope
        .param_objects_map
        .ok_or(ApiError::MissingPayload("paramObjectsMap"))?;

    let entry = match map.get(key) {
        Some(value) => value.clone(),
        None => {
            let fallback = map
                .iter()
                .find(|(name, value)| name.ends_with("VO") && !value.is_null());
            match fallback {
                Some((name, value)) => {
                    tracing::debug!(expected = key, found = %name, "list key missing, using fallback");
                    value.clone()
                }
                None => return Err(ApiError::MissingPayload("list entry")),
            }
        }
    };

    // A bare array is accepted as the data list itself.
    if entry.is_array() {
        let data: Vec<T> = serde_json::from_value(entry)?;
        let total_count = data.len() as u64;
        return Ok(Page { data, total_count });
    }

    let payload: ListPayload<T> = serde_json::from_value(entry)?;
    let total_count = payload
        .total_count
        .as_ref()
        .and_then(FlexNumber::as_i64)
        .and_then(|count| u64::try_from(count).ok())
        .unwrap_or(payload.data.len() as u64);
    Ok(Page {
        data: payload.data,
        total_count,
    })
}

/// Decodes a mutation response. An empty body after a successful HTTP status
/// counts as success; `status: false` is a rejection.
pub fn decode_mutation(body: &str) -> Result<MutationAck, ApiError> {
    if body.trim().is_empty() {
        return Ok(MutationAck::default());
    }
    let envelope: MutationEnvelope = serde_json::from_str(body)?;
    let nested_message = envelope
        .param_objects_map
        .as_ref()
        .and_then(|map| map.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = envelope.message.or(nested_message);

    if envelope.status == Some(false) {
        return Err(ApiError::Rejected {
            message,
            error: envelope.error,
        });
    }

    Ok(MutationAck {
        message,
        payload: envelope.param_objects_map,
    })
}

/// Builds the error for a non-success HTTP status from whatever body came back.
pub fn decode_error_body(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let nested_message = parsed
        .param_objects_map
        .as_ref()
        .and_then(|map| map.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);
    ApiError::Status {
        status,
        message: parsed.message.or(nested_message),
        error: parsed.error,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    #[test]
    fn list_reads_named_entry_and_total() {
        let body = json!({
            "paramObjectsMap": {
                "quoteVO": { "data": [{ "id": 1 }, { "id": 2 }], "totalCount": "14" }
            }
        });
        let page: Page<Row> = decode_list(body, "quoteVO").expect("decodes");
        assert_eq!(page.data, vec![Row { id: 1 }, Row { id: 2 }]);
        assert_eq!(page.total_count, 14);
    }

    #[test]
    fn list_falls_back_to_other_vo_entry_and_bare_arrays() {
        let body = json!({ "paramObjectsMap": { "auctionsVO": [{ "id": 5 }] } });
        let page: Page<Row> = decode_list(body, "auctionVO").expect("decodes");
        assert_eq!(page.data, vec![Row { id: 5 }]);
        assert_eq!(page.total_count, 1);
    }

    #[test]
    fn list_without_map_is_missing_payload() {
        let err = decode_list::<Row>(json!({ "status": true }), "quoteVO").expect_err("no map");
        assert!(matches!(err, ApiError::MissingPayload("paramObjectsMap")));
    }

    #[test]
    fn mutation_status_false_is_rejection_with_message() {
        let err = decode_mutation(r#"{"status": false, "paramObjectsMap": {"message": "Auction closed"}}"#)
            .expect_err("rejected");
        match err {
            ApiError::Rejected { message, .. } => assert_eq!(message.as_deref(), Some("Auction closed")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn mutation_accepts_empty_body_and_true_status() {
        assert_eq!(decode_mutation("").expect("empty ok"), MutationAck::default());
        let ack = decode_mutation(r#"{"status": true, "message": "Quote Approved"}"#).expect("ok");
        assert_eq!(ack.message.as_deref(), Some("Quote Approved"));
    }

    #[test]
    fn error_body_keeps_message_and_error_fields() {
        let err = decode_error_body(400, r#"{"message": "Invalid quote id", "error": "Bad Request"}"#);
        match err {
            ApiError::Status { status, message, error } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Invalid quote id"));
                assert_eq!(error.as_deref(), Some("Bad Request"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let html = decode_error_body(502, "<html>Bad Gateway</html>");
        assert!(matches!(html, ApiError::Status { status: 502, message: None, error: None }));
    }

    #[test]
    fn flex_numbers_parse_strings() {
        let value: FlexNumber = serde_json::from_value(json!("1250.50")).expect("flex");
        assert_eq!(value.as_f64(), Some(1250.5));
        assert_eq!(value.as_i64(), None);
        let value: FlexNumber = serde_json::from_value(json!(42)).expect("flex");
        assert_eq!(value.as_i64(), Some(42));
    }
}
