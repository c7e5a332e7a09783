use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error response returned by the API.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Model descriptor as returned by the provider catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamModel {
    pub id: String,
    #[serde(default, deserialize_with = "version_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
}

/// OpenAI-compatible model object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

/// OpenAI-compatible `/v1/models` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<Model>,
}

impl ModelList {
    pub fn new(data: Vec<Model>) -> Self {
        Self {
            object: "list".to_string(),
            data,
        }
    }
}

/// Accept both `"version": "1"` and `"version": 1`.
fn version_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_model_numeric_version() {
        let model: UpstreamModel =
            serde_json::from_str(r#"{"id":"openai/gpt-4o","version":1}"#).unwrap();
        assert_eq!(model.version.as_deref(), Some("1"));
        assert!(model.publisher.is_none());
    }

    #[test]
    fn test_upstream_model_ignores_unknown_fields() {
        let model: UpstreamModel = serde_json::from_str(
            r#"{"id":"m","version":"2024-05-13","publisher":"OpenAI","tags":["chat"]}"#,
        )
        .unwrap();
        assert_eq!(model.version.as_deref(), Some("2024-05-13"));
        assert_eq!(model.publisher.as_deref(), Some("OpenAI"));
    }

    #[test]
    fn test_model_list_shape() {
        let body = serde_json::to_value(ModelList::new(vec![])).unwrap();
        assert_eq!(body, serde_json::json!({"object": "list", "data": []}));
    }
}
