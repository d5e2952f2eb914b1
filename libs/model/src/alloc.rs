//! Allocation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-observed allocation status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Lost,
    #[default]
    #[serde(other)]
    Other,
}

impl ClientStatus {
    /// Returns true if the allocation can no longer transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Lost)
    }

    /// Status name as the service spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Lost => "lost",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing view of one scheduled unit of work at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AllocationSummary {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "EvalID")]
    pub eval_id: String,

    pub name: String,

    pub namespace: String,

    #[serde(rename = "NodeID")]
    pub node_id: String,

    pub node_name: String,

    #[serde(rename = "JobID")]
    pub job_id: String,

    pub job_type: String,

    pub task_group: String,

    pub desired_status: String,

    pub desired_description: String,

    pub client_status: ClientStatus,

    pub client_description: String,

    /// Per-task state, kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_states: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_status: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reschedule_tracker: Option<serde_json::Value>,

    #[serde(rename = "FollowupEvalID")]
    pub followup_eval_id: String,

    pub next_allocation: String,

    #[serde(deserialize_with = "crate::null_as_default")]
    pub preempted_allocations: Vec<String>,

    pub preempted_by_allocation: String,

    pub create_index: u64,

    pub modify_index: u64,

    /// Creation time, nanoseconds since the Unix epoch.
    pub create_time: i64,

    /// Last modification time, nanoseconds since the Unix epoch.
    pub modify_time: i64,
}

impl AllocationSummary {
    /// Last modification time as a UTC timestamp.
    pub fn modified_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.modify_time)
    }
}

/// Full allocation record, fetched lazily for flagged ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationDetail {
    #[serde(flatten)]
    pub summary: AllocationSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_resources: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_status: Option<serde_json::Value>,
}

impl AllocationDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    /// Node the allocation is bound to (may be empty if never placed).
    pub fn node_id(&self) -> &str {
        &self.summary.node_id
    }
}

impl From<AllocationSummary> for AllocationDetail {
    fn from(summary: AllocationSummary) -> Self {
        Self {
            summary,
            ..Default::default()
        }
    }
}
