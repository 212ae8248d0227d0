//! API contract types for the Keptn control-plane REST service

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A service deployed in a stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_name: String,
}

/// A stage of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub services: Vec<Service>,
}

/// Project resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_name: String,
    #[serde(rename = "gitRemoteURL", skip_serializing_if = "Option::is_none")]
    pub git_remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_token: Option<String>,
    /// Base64 encoded shipyard definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipyard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipyard_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stages: Vec<Stage>,
}

impl Project {
    /// Create a project reference carrying only its name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            project_name: name.into(),
            ..Default::default()
        }
    }
}

/// CloudEvent extended with the Keptn tracking context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeptnContextExtendedCE {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shkeptncontext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggeredid: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specversion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contenttype: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Tracking context returned by writes that trigger an asynchronous sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keptn_context: Option<String>,
}

/// Well-known sequence states accepted by the sequence control endpoint
pub struct SequenceState;

impl SequenceState {
    pub const PAUSE: &'static str = "pause";
    pub const RESUME: &'static str = "resume";
    pub const ABORT: &'static str = "abort";
}

/// Parameters addressing a running sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SequenceControlParams {
    #[validate(length(min = 1, message = "project parameter not set"))]
    pub project: String,
    #[validate(length(min = 1, message = "keptn context parameter not set"))]
    pub keptn_context: String,
    /// Empty means the control applies to every stage
    pub stage: String,
    #[validate(length(min = 1, message = "sequence state parameter not set"))]
    pub state: String,
}

/// Body sent to the sequence control endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceControlBody {
    pub stage: String,
    pub state: String,
}

impl From<&SequenceControlParams> for SequenceControlBody {
    fn from(params: &SequenceControlParams) -> Self {
        Self {
            stage: params.stage.clone(),
            state: params.state.clone(),
        }
    }
}

/// Filter for event queries. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub project: String,
    pub stage: String,
    pub service: String,
    pub event_type: String,
    pub keptn_context: String,
    pub event_id: String,
    /// Passed through to the server unchecked
    pub page_size: String,
    /// Page limit for the listing; zero fetches every page
    pub number_of_pages: u32,
    pub from_time: String,
}

impl EventFilter {
    /// Query parameters for the non-empty fields, in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("project", self.project.as_str()),
            ("stage", self.stage.as_str()),
            ("service", self.service.as_str()),
            ("keptnContext", self.keptn_context.as_str()),
            ("eventID", self.event_id.as_str()),
            ("type", self.event_type.as_str()),
            ("pageSize", self.page_size.as_str()),
            ("fromTime", self.from_time.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_wire_names() {
        let project = Project {
            project_name: "sockshop".into(),
            git_remote_url: Some("https://git.example.com/sockshop".into()),
            shipyard_version: Some("spec.keptn.sh/0.2.0".into()),
            ..Default::default()
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["projectName"], "sockshop");
        assert_eq!(json["gitRemoteURL"], "https://git.example.com/sockshop");
        assert_eq!(json["shipyardVersion"], "spec.keptn.sh/0.2.0");
        assert!(json.get("gitUser").is_none());
        assert!(json.get("stages").is_none());
    }

    #[test]
    fn test_event_parsing() {
        let event_json = r#"{
            "id": "e1",
            "shkeptncontext": "ctx-1",
            "type": "sh.keptn.event.dev.delivery.triggered",
            "source": "shipyard-controller",
            "data": {"project": "sockshop", "stage": "dev"}
        }"#;

        let event: KeptnContextExtendedCE = serde_json::from_str(event_json).unwrap();
        assert_eq!(event.id.as_deref(), Some("e1"));
        assert_eq!(
            event.event_type.as_deref(),
            Some("sh.keptn.event.dev.delivery.triggered")
        );
        assert_eq!(event.data["stage"], "dev");
        assert!(event.triggeredid.is_none());
    }

    #[test]
    fn test_event_context_optional() {
        let empty: EventContext = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.keptn_context, None);

        let ctx: EventContext = serde_json::from_str(r#"{"keptnContext":"abc"}"#).unwrap();
        assert_eq!(ctx.keptn_context.as_deref(), Some("abc"));
    }

    #[test]
    fn test_event_filter_skips_empty_fields() {
        let filter = EventFilter {
            project: "sockshop".into(),
            event_type: "sh.keptn.event.evaluation.finished".into(),
            page_size: "10".into(),
            number_of_pages: 3,
            ..Default::default()
        };

        assert_eq!(
            filter.query_pairs(),
            vec![
                ("project", "sockshop"),
                ("type", "sh.keptn.event.evaluation.finished"),
                ("pageSize", "10"),
            ]
        );
    }

    #[test]
    fn test_sequence_control_body_from_params() {
        let params = SequenceControlParams {
            project: "sockshop".into(),
            keptn_context: "ctx".into(),
            stage: "dev".into(),
            state: SequenceState::PAUSE.into(),
        };
        let body = SequenceControlBody::from(&params);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"stage":"dev","state":"pause"}"#
        );
    }
}
