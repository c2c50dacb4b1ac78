use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response genérica de las acciones: `{ "data": ... }` o `{ "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ActionResponse<T> {
    Data {
        data: T,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl<T> ActionResponse<T> {
    pub fn data(data: T) -> Self {
        Self::Data { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
            details: None,
        }
    }

    pub fn error_with_details(message: impl Into<String>, details: Value) -> Self {
        Self::Error {
            error: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_shape() {
        let body = serde_json::to_value(ActionResponse::data(json!({ "id": 1 }))).unwrap();
        assert_eq!(body, json!({ "data": { "id": 1 } }));
    }

    #[test]
    fn test_error_shape() {
        let body = serde_json::to_value(ActionResponse::<()>::error("falhou")).unwrap();
        assert_eq!(body, json!({ "error": "falhou" }));
    }
}
