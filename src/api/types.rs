use serde::{Deserialize, Serialize};

use crate::query::QueryResult;

/// Query parameters for `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Raw query string; split and lowercased server-side.
    pub terms: String,
}

/// Response for `GET /search`
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<QueryResult>,
    pub took_ms: u64,
}

/// Response for `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_round_trips_as_json() {
        let response = SearchResponse {
            results: vec![QueryResult {
                document_name: "a.txt".to_string(),
                rank: 3,
            }],
            took_ms: 12,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"a.txt\""));
        assert!(json.contains("\"rank\":3"));

        let back: SearchResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results.len(), 1);
        assert_eq!(back.took_ms, 12);
    }
}
