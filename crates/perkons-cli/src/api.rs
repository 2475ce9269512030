//! Request and response types for the pipeline service REST API.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use perkons_core::ParamValue;

// =============================================================================
// Request/Response types
// =============================================================================

/// Body of `POST /api/v1/runs`. The workflow document travels as a YAML
/// string; run-level `arguments` stay empty unless the caller sets any.
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateRunRequest {
    pub run_name: String,
    pub service_account: String,
    pub workflow: String,
    #[serde(default)]
    pub arguments: IndexMap<String, ParamValue>,
}

/// Handle the service returns for a created or queried run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: String,
    pub run_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_field_names() {
        let request = CreateRunRequest {
            run_name: "demo run".to_string(),
            service_account: "pipeline-runner".to_string(),
            workflow: "apiVersion: perkons.dev/v1\n".to_string(),
            arguments: IndexMap::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["run_name"], "demo run");
        assert_eq!(value["service_account"], "pipeline-runner");
        assert!(value["workflow"].as_str().unwrap().contains("apiVersion"));
        assert!(value["arguments"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_request_arguments_default_when_missing() {
        let json = r#"{
            "run_name": "r",
            "service_account": "sa",
            "workflow": "w"
        }"#;
        let request: CreateRunRequest = serde_json::from_str(json).unwrap();
        assert!(request.arguments.is_empty());
    }

    #[test]
    fn test_run_handle_round_trip() {
        let handle = RunHandle {
            run_id: "run-1".to_string(),
            run_name: "demo run".to_string(),
            status: "pending".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&handle).unwrap();
        let back: RunHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, handle.run_id);
        assert_eq!(back.created_at, handle.created_at);
    }
}
