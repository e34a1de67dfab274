use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tagged outcome returned by every engine operation.
///
/// Success and failure share one shape, `{success, message, data}`, and only
/// differ by the flag and the message text. Failures always carry an empty
/// `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendingResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
    #[serde(skip)]
    fatal: bool,
}

impl VendingResponse {
    /// Builds a success outcome. A payload that cannot be represented as JSON
    /// becomes a failure instead.
    pub fn success(message: impl Into<String>, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                success: true,
                message: message.into(),
                data,
                fatal: false,
            },
            Err(e) => Self::failure(format!("Failed to encode response: {e}")),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Value::Object(Map::new()),
            fatal: false,
        }
    }

    /// A failure caused by the state store rather than by the request.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            fatal: true,
            ..Self::failure(message)
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Deserializes one field of `data`.
    pub fn field<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let response = VendingResponse::success("Coin inserted.", json!({"insertedAmount": 1.0}));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": true, "message": "Coin inserted.", "data": {"insertedAmount": 1.0}})
        );
    }

    #[test]
    fn test_failure_has_empty_data() {
        let response = VendingResponse::failure("No coins to return.");
        assert!(!response.is_success());
        assert!(!response.is_fatal());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "message": "No coins to return.", "data": {}})
        );
    }

    #[test]
    fn test_fatal_serializes_like_failure() {
        let response = VendingResponse::fatal("Storage error: disk full");
        assert!(response.is_fatal());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "message": "Storage error: disk full", "data": {}})
        );
    }

    #[test]
    fn test_field_lookup() {
        let response = VendingResponse::success("ok", json!({"quantity": 7}));
        assert_eq!(response.field::<u32>("quantity"), Some(7));
        assert_eq!(response.field::<u32>("missing"), None);
    }
}
