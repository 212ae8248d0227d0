//! Paged listing envelopes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{KeptnContextExtendedCE, Project};

/// Query parameter carrying the page cursor
pub const NEXT_PAGE_KEY: &str = "nextPageKey";

/// A single page of a listing endpoint: its items plus the cursor to the next page.
pub trait PageEnvelope: DeserializeOwned {
    type Item;

    fn next_page_key(&self) -> &str;

    fn into_items(self) -> Vec<Self::Item>;
}

/// Whether a cursor marks the last page. Both `""` and `"0"` end a listing.
pub fn is_last_page(next_page_key: &str) -> bool {
    next_page_key.is_empty() || next_page_key == "0"
}

/// Numeric value of a cursor, used for page limits. Non-numeric cursors count as zero.
pub fn page_key_value(next_page_key: &str) -> u64 {
    next_page_key.trim().parse().unwrap_or(0)
}

/// One page of projects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projects {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub next_page_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl PageEnvelope for Projects {
    type Item = Project;

    fn next_page_key(&self) -> &str {
        &self.next_page_key
    }

    fn into_items(self) -> Vec<Project> {
        self.projects
    }
}

/// One page of events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    #[serde(default)]
    pub events: Vec<KeptnContextExtendedCE>,
    #[serde(default)]
    pub next_page_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl PageEnvelope for Events {
    type Item = KeptnContextExtendedCE;

    fn next_page_key(&self) -> &str {
        &self.next_page_key
    }

    fn into_items(self) -> Vec<KeptnContextExtendedCE> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_sentinels() {
        assert!(is_last_page(""));
        assert!(is_last_page("0"));
        assert!(!is_last_page("1"));
        assert!(!is_last_page("abc"));
    }

    #[test]
    fn test_page_key_value_degrades_to_zero() {
        assert_eq!(page_key_value("3"), 3);
        assert_eq!(page_key_value("not-a-number"), 0);
        assert_eq!(page_key_value("-2"), 0);
    }

    #[test]
    fn test_projects_page_parsing() {
        let page: Projects = serde_json::from_str(
            r#"{"projects":[{"projectName":"a"},{"projectName":"b"}],"nextPageKey":"2","totalCount":4}"#,
        )
        .unwrap();

        assert_eq!(page.next_page_key(), "2");
        assert_eq!(page.total_count, Some(4));
        let names: Vec<_> = page.into_items().into_iter().map(|p| p.project_name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_events_page_defaults() {
        let page: Events = serde_json::from_str("{}").unwrap();
        assert!(is_last_page(page.next_page_key()));
        assert!(page.into_items().is_empty());
    }
}
