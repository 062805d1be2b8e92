//! # Send-Return Normalization
//!
//! Depending on its version, an injected provider answers a request either with
//! the bare value or with a JSON-RPC style envelope `{ "result": value }`. The
//! helpers here collapse both shapes into the bare value before anything else
//! looks at it.

use serde_json::Value;

/// A raw provider response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SendReturn {
    /// `{ "result": value }`, holding the inner value.
    Envelope(Value),
    /// Anything that is not an object with a `result` key.
    Bare(Value),
}

impl From<Value> for SendReturn {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.contains_key("result") => {
                SendReturn::Envelope(map.remove("result").unwrap_or(Value::Null))
            }
            other => SendReturn::Bare(other),
        }
    }
}

impl SendReturn {
    /// Returns the payload regardless of the shape it arrived in.
    pub fn into_result(self) -> Value {
        match self {
            SendReturn::Envelope(value) | SendReturn::Bare(value) => value,
        }
    }
}

/// Unwraps a `{ "result": .. }` envelope if present, otherwise returns the value unchanged.
pub fn parse_send_return(value: Value) -> Value {
    SendReturn::from(value).into_result()
}

/// The first entry of a normalized account list, if it is a non-empty string.
pub fn first_account(value: &Value) -> Option<String> {
    value
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(Value::as_str)
        .filter(|account| !account.is_empty())
        .map(str::to_owned)
}

/// The `length` of a normalized accounts result.
///
/// Lists count their entries and a bare string counts its UTF-16 code units, the
/// way a browser reads `.length`. Anything else counts as empty.
pub fn account_count(value: &Value) -> usize {
    match value {
        Value::Array(accounts) => accounts.len(),
        Value::String(account) => account.encode_utf16().count(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_and_bare_normalize_to_the_same_value() {
        let samples = [
            json!(["0xABC"]),
            json!([]),
            json!("0x1"),
            json!(251),
            json!(null),
            json!({ "accounts": ["0xABC"] }),
        ];
        for sample in samples {
            assert_eq!(parse_send_return(json!({ "result": sample.clone() })), sample);
            assert_eq!(parse_send_return(sample.clone()), sample);
        }
    }

    #[test]
    fn only_the_outer_envelope_is_removed() {
        let nested = json!({ "result": { "result": ["0x1"] } });
        assert_eq!(parse_send_return(nested), json!({ "result": ["0x1"] }));
    }

    #[test]
    fn classification_by_shape() {
        assert_eq!(
            SendReturn::from(json!({ "result": null })),
            SendReturn::Envelope(Value::Null)
        );
        assert_eq!(
            SendReturn::from(json!({ "id": 1 })),
            SendReturn::Bare(json!({ "id": 1 }))
        );
    }

    #[test]
    fn first_account_skips_missing_and_empty_entries() {
        assert_eq!(first_account(&json!(["0x1", "0x2"])), Some("0x1".to_string()));
        assert_eq!(first_account(&json!([])), None);
        assert_eq!(first_account(&json!([""])), None);
        assert_eq!(first_account(&json!([42])), None);
        assert_eq!(first_account(&json!("0x1")), None);
        assert_eq!(first_account(&Value::Null), None);
    }

    #[test]
    fn account_count_reads_length_like_a_browser() {
        assert_eq!(account_count(&json!(["0x1", "0x2"])), 2);
        assert_eq!(account_count(&json!([])), 0);
        assert_eq!(account_count(&json!("0xabc")), 5);
        assert_eq!(account_count(&json!("")), 0);
        assert_eq!(account_count(&json!({ "result": ["0x1"] })), 0);
        assert_eq!(account_count(&json!(7)), 0);
        assert_eq!(account_count(&Value::Null), 0);
    }
}
