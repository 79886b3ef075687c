use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A workflow run as reported by either `gh run list --json` or the REST API.
///
/// The `gh` field names are canonical; the REST names are accepted as aliases.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowRun {
    #[serde(rename = "databaseId", alias = "id")]
    pub id: u64,
    #[serde(default, alias = "run_number")]
    pub number: u64,
    #[serde(default)]
    pub event: RunEvent,
    #[serde(rename = "headBranch", alias = "head_branch", default)]
    pub branch: String,
    #[serde(rename = "headSha", alias = "head_sha", default)]
    pub head_sha: String,
    #[serde(default)]
    pub conclusion: Conclusion,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", alias = "updated_at", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Job {
    #[serde(rename = "databaseId", alias = "id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conclusion: Conclusion,
}

/// `{"jobs": [...]}`, returned by both `gh run view --json jobs` and the REST jobs endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobList {
    pub jobs: Vec<Job>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Commit {
    pub sha: String,
    pub date: DateTime<Utc>,
}

impl Commit {
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

impl WorkflowRun {
    pub fn short_sha(&self) -> &str {
        short_sha(&self.head_sha)
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RunEvent {
    Schedule,
    WorkflowDispatch,
    PullRequest,
    #[default]
    Unknown,
    Other(String),
}

impl RunEvent {
    pub fn as_str(&self) -> &str {
        match self {
            RunEvent::Schedule => "schedule",
            RunEvent::WorkflowDispatch => "workflow_dispatch",
            RunEvent::PullRequest => "pull_request",
            RunEvent::Unknown => "unknown",
            RunEvent::Other(name) => name,
        }
    }
}

impl From<&str> for RunEvent {
    fn from(name: &str) -> Self {
        match name {
            "schedule" => RunEvent::Schedule,
            "workflow_dispatch" => RunEvent::WorkflowDispatch,
            "pull_request" => RunEvent::PullRequest,
            "" => RunEvent::Unknown,
            other => RunEvent::Other(other.to_string()),
        }
    }
}

/// The outcome of a run or job. gh reports an empty string and the REST API reports `null`
/// while a run is still in progress; both map to `Pending`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Conclusion {
    Success,
    Failure,
    Skipped,
    #[default]
    Pending,
    Other(String),
}

impl Conclusion {
    /// Whether the tests actually executed, regardless of their outcome.
    pub fn executed(&self) -> bool {
        matches!(self, Conclusion::Success | Conclusion::Failure)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Skipped => "skipped",
            Conclusion::Pending => "pending",
            Conclusion::Other(name) => name,
        }
    }
}

impl From<&str> for Conclusion {
    fn from(name: &str) -> Self {
        match name {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "skipped" => Conclusion::Skipped,
            "" | "pending" => Conclusion::Pending,
            other => Conclusion::Other(other.to_string()),
        }
    }
}

macro_rules! string_enum_serde {
    ($ty:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Option::<String>::deserialize(deserializer)?;
                Ok(<$ty>::from(raw.as_deref().unwrap_or("")))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum_serde!(RunEvent);
string_enum_serde!(Conclusion);
