//! Wire types for the platform API. Field names mirror the backend exactly:
//! auth payloads are snake_case, everything built on the backend's camel-case
//! model base goes over the wire in camelCase.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CredentialsReq {
    pub username: String,
    pub password: String,
}

/// Login/register response. The backend names the credential `access_token`;
/// it is normalized into the session store's token immediately on receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub role: String,
}

/// FastAPI error body: `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDetail {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadSession {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

/// The backend generates the join code and the active flag itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinSession {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReport {
    pub owner: String,
    pub name: String,
    pub level: i64,
    pub structural_changes: i64,
    pub definition_changes: i64,
    pub definition_level: i64,
    pub feature_guarded_definition_changes: i64,
    pub ast_pipeline_definition_changes: i64,
}

/// Variability analysis report for one uploaded Snap! project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub project_level: i64,
    pub blocks: Vec<BlockReport>,
    pub total_scripts: i64,
    pub duplicate_scripts: i64,
    pub total_combinations: i64,
    /// Tangling degree -> script count. JSON object keys arrive as strings.
    pub tangling_dict: BTreeMap<String, i64>,
    /// Feature name -> ids of the scripts it is scattered across.
    pub scattering_dict: BTreeMap<String, Vec<i64>>,
    pub dead_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersionSummary {
    pub version_number: i64,
    pub uploaded_at: DateTime<Utc>,
    pub project_level: i64,
    pub total_scripts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub versions: Vec<ProjectVersionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn create_session_serializes_camel_case() {
        let req = CreateSession {
            name: "week 3".into(),
            start_date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 3, 8, 18, 0, 0).unwrap(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("startDate").is_some());
        assert!(v.get("endDate").is_some());
        assert!(v.get("start_date").is_none());
    }

    #[test]
    fn read_session_accepts_the_backend_wire_form() {
        let raw = r#"{
            "id": 7,
            "name": "week 3",
            "code": "Ab3dEf9h",
            "startDate": "2025-03-01T09:00:00Z",
            "endDate": "2025-03-08T18:00:00Z",
            "isActive": true
        }"#;
        let s: ReadSession = serde_json::from_str(raw).unwrap();
        assert_eq!(s.id, 7);
        assert_eq!(s.code, "Ab3dEf9h");
        assert!(s.is_active);
    }

    #[test]
    fn analysis_report_accepts_the_backend_wire_form() {
        let raw = r#"{
            "projectLevel": 2,
            "blocks": [{
                "owner": "Stage",
                "name": "doGreet",
                "level": 1,
                "structuralChanges": 3,
                "definitionChanges": 1,
                "definitionLevel": 2,
                "featureGuardedDefinitionChanges": 1,
                "astPipelineDefinitionChanges": 0
            }],
            "totalScripts": 12,
            "duplicateScripts": 2,
            "totalCombinations": 8,
            "tanglingDict": {"1": 4, "2": 2},
            "scatteringDict": {"dark_mode": [1, 5]},
            "deadFeatures": ["legacy_intro"]
        }"#;
        let r: AnalysisReport = serde_json::from_str(raw).unwrap();
        assert_eq!(r.blocks.len(), 1);
        assert_eq!(r.blocks[0].structural_changes, 3);
        assert_eq!(r.tangling_dict.get("1"), Some(&4));
        assert_eq!(r.dead_features, vec!["legacy_intro"]);
    }
}
