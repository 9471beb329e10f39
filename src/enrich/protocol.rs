//! Wire types for the batch enrichment service.
use crate::error::EnrichError;
use crate::grid::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BATCH_PATH: &str = "/api/enrich/batch";
pub const HEALTH_PATH: &str = "/api/health";

/// One request per enriched column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub column_name: String,
    /// Key-column value of every grid row, in row order. Blank rows are kept
    /// so response index `i` lines up with grid row `i`.
    pub rows: Vec<String>,
    /// Other non-blank headers mapped to their first-row value.
    pub context_values: BTreeMap<String, String>,
}

/// Service reply to a [`BatchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub enriched_values: Vec<String>,
    #[serde(default)]
    pub sources: Vec<Vec<Source>>,
    /// `"success"` or `"error"`; older services omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    pub fn success(enriched_values: Vec<String>, sources: Vec<Vec<Source>>) -> Self {
        Self {
            enriched_values,
            sources,
            status: Some("success".to_string()),
            error: None,
        }
    }

    /// Check the reply before any of it is applied.
    ///
    /// A service-reported error or arrays that do not cover every requested
    /// row reject the whole batch.
    pub fn validate(&self, expected_rows: usize) -> Result<(), EnrichError> {
        if self.status.as_deref() == Some("error") {
            let detail = self.error.clone().unwrap_or_else(|| "unknown error".to_string());
            return Err(EnrichError::ServiceReported(detail));
        }
        if self.enriched_values.len() != expected_rows {
            return Err(EnrichError::MalformedResponse(format!(
                "expected {expected_rows} enriched_values, got {}",
                self.enriched_values.len()
            )));
        }
        if self.sources.len() != expected_rows {
            return Err(EnrichError::MalformedResponse(format!(
                "expected {expected_rows} sources lists, got {}",
                self.sources.len()
            )));
        }
        Ok(())
    }
}

/// Reply of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_service_field_names() {
        let request = BatchRequest {
            column_name: "Revenue".into(),
            rows: vec!["Acme".into(), String::new()],
            context_values: BTreeMap::from([("CEO".to_string(), "Jane".to_string())]),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "column_name": "Revenue",
                "rows": ["Acme", ""],
                "context_values": {"CEO": "Jane"}
            })
        );
    }

    #[test]
    fn response_without_status_is_accepted() {
        let response: BatchResponse = serde_json::from_value(json!({
            "enriched_values": ["$1B"],
            "sources": [[{"title": "X", "url": "https://x"}]]
        }))
        .unwrap();
        assert!(response.validate(1).is_ok());
        assert_eq!(response.sources[0][0].url, "https://x");
    }

    #[test]
    fn short_arrays_are_malformed() {
        let response = BatchResponse::success(vec!["a".into()], vec![vec![]]);
        assert!(matches!(
            response.validate(2),
            Err(EnrichError::MalformedResponse(_))
        ));
        let missing_sources = BatchResponse::success(vec!["a".into(), "b".into()], vec![]);
        assert!(matches!(
            missing_sources.validate(2),
            Err(EnrichError::MalformedResponse(_))
        ));
    }

    #[test]
    fn service_error_status_rejects_the_batch() {
        let response: BatchResponse = serde_json::from_value(json!({
            "enriched_values": ["Error during enrichment"],
            "status": "error",
            "error": "provider down",
            "sources": [[]]
        }))
        .unwrap();
        assert_eq!(
            response.validate(1),
            Err(EnrichError::ServiceReported("provider down".into()))
        );
    }

    #[test]
    fn missing_enriched_values_fails_to_decode() {
        let decoded: Result<BatchResponse, _> = serde_json::from_value(json!({"sources": []}));
        assert!(decoded.is_err());
    }
}
