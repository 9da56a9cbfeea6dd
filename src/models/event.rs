//! CI event payload for `pull_request` workflows.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// The subset of the `pull_request` event document this tool reads.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub action: PullRequestAction,
    pub number: u64,
    pub repository: Repository,
    /// Head commit before the push (synchronize events only).
    #[serde(default)]
    pub before: Option<String>,
    /// Head commit after the push (synchronize events only).
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// The action that triggered the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestAction {
    Opened,
    Synchronize,
    /// Any action this tool does not handle (`closed`, `edited`, ...).
    Other(String),
}

impl From<&str> for PullRequestAction {
    fn from(s: &str) -> Self {
        match s {
            "opened" => PullRequestAction::Opened,
            "synchronize" => PullRequestAction::Synchronize,
            other => PullRequestAction::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for PullRequestAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PullRequestAction::from(s.as_str()))
    }
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullRequestAction::Opened => write!(f, "opened"),
            PullRequestAction::Synchronize => write!(f, "synchronize"),
            PullRequestAction::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Errors reading the event payload.
#[derive(thiserror::Error, Debug)]
pub enum EventError {
    #[error("failed to read event payload {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse event payload {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl EventPayload {
    /// Parse an event document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse the event document at `path`.
    pub async fn load(path: &Path) -> Result<Self, EventError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EventError::Read {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::from_json(&content).map_err(|e| EventError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn owner(&self) -> &str {
        &self.repository.owner.login
    }

    pub fn repo(&self) -> &str {
        &self.repository.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNC_EVENT: &str = r#"{
        "action": "synchronize",
        "number": 17,
        "before": "aaa111",
        "after": "bbb222",
        "repository": { "name": "widgets", "owner": { "login": "acme" } },
        "pull_request": { "title": "ignored here" }
    }"#;

    #[test]
    fn parses_synchronize_event() {
        let event = EventPayload::from_json(SYNC_EVENT).unwrap();
        assert_eq!(event.action, PullRequestAction::Synchronize);
        assert_eq!(event.number, 17);
        assert_eq!(event.owner(), "acme");
        assert_eq!(event.repo(), "widgets");
        assert_eq!(event.before.as_deref(), Some("aaa111"));
        assert_eq!(event.after.as_deref(), Some("bbb222"));
    }

    #[test]
    fn unknown_action_is_preserved() {
        let json = r#"{"action": "closed", "number": 1,
            "repository": {"name": "r", "owner": {"login": "o"}}}"#;
        let event = EventPayload::from_json(json).unwrap();
        assert_eq!(event.action, PullRequestAction::Other("closed".to_string()));
        assert_eq!(event.action.to_string(), "closed");
        assert!(event.before.is_none());
    }

    #[test]
    fn missing_repository_is_an_error() {
        let json = r#"{"action": "opened", "number": 1}"#;
        assert!(EventPayload::from_json(json).is_err());
    }

    #[tokio::test]
    async fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, SYNC_EVENT).unwrap();

        let event = EventPayload::load(&path).await.unwrap();
        assert_eq!(event.number, 17);
    }

    #[tokio::test]
    async fn load_missing_file_names_path() {
        let err = EventPayload::load(Path::new("/tmp/ai_codereview_no_event.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ai_codereview_no_event.json"));
    }
}
