//! Core types for prompt-scraper

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Declares an `i64`-backed row identifier with sqlx support
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the inner i64 value
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl sqlx::Type<sqlx::Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
            }

            fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
                <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
                sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $name {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                Ok(Self(id))
            }
        }
    };
}

row_id!(
    /// Identifier of a scrape task (one batch)
    TaskId
);
row_id!(
    /// Identifier of a stored API endpoint configuration
    ApiConfigId
);
row_id!(
    /// Identifier of a response mapping template
    TemplateId
);
row_id!(
    /// Identifier of a system-instruction preset
    PresetId
);
row_id!(
    /// Identifier of one recorded prompt outcome
    EntryId
);

/// Lifecycle of a scrape task
///
/// Moves forward only: `pending → running → completed`, with `failed`
/// reachable from either non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, batch not started
    Pending,
    /// Batch is processing prompts
    Running,
    /// Every prompt produced an entry
    Completed,
    /// Batch could not proceed
    Failed,
}

impl TaskStatus {
    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EntryStatus {
    /// A non-empty answer was extracted
    Success,
    /// Transport failure, client error, or blank answer
    Failed,
}

impl EntryStatus {
    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Success => "success",
            EntryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request/auth dialect spoken by an endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    /// Bearer-token JSON chat API
    Standard,
    /// HMAC-SHA1 signed v2.03 gateway
    PrivateHmac,
}

impl PlatformType {
    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Standard => "standard",
            PlatformType::PrivateHmac => "private_hmac",
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard" => Ok(PlatformType::Standard),
            "private_hmac" => Ok(PlatformType::PrivateHmac),
            other => Err(Error::config(
                "platform_type",
                format!("unknown platform type '{other}'"),
            )),
        }
    }
}

/// Reasoning effort forwarded to the upstream model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    /// Least reasoning (default)
    #[default]
    Minimal,
    /// Low reasoning
    Low,
    /// Medium reasoning
    Medium,
    /// Maximum reasoning
    High,
}

impl ThinkingLevel {
    /// Wire/stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingLevel::Minimal => "minimal",
            ThinkingLevel::Low => "low",
            ThinkingLevel::Medium => "medium",
            ThinkingLevel::High => "high",
        }
    }
}

impl fmt::Display for ThinkingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThinkingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "minimal" => Ok(ThinkingLevel::Minimal),
            "low" => Ok(ThinkingLevel::Low),
            "medium" => Ok(ThinkingLevel::Medium),
            "high" => Ok(ThinkingLevel::High),
            other => Err(Error::config(
                "thinking_level",
                format!("unknown thinking level '{other}'"),
            )),
        }
    }
}

/// Validated per-task settings consumed by the protocol adapters
///
/// Built once at batch start so unknown variants are rejected before any
/// request is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskProfile {
    /// Upstream model name
    pub model: String,
    /// Reasoning effort
    pub thinking_level: ThinkingLevel,
    /// Endpoint dialect
    pub platform: PlatformType,
    /// Whether to attach the search tool
    pub use_search: bool,
}

/// Events emitted while batches run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task moved to a new lifecycle state
    TaskStatusChanged {
        /// Task ID
        task_id: TaskId,
        /// New status
        status: TaskStatus,
    },

    /// A prompt outcome was persisted
    EntryRecorded {
        /// Task ID
        task_id: TaskId,
        /// Entry ID
        entry_id: EntryId,
        /// Outcome
        status: EntryStatus,
        /// Tokens reported by the endpoint (0 on failure)
        tokens_used: i64,
    },

    /// The prompt loop ended normally
    BatchFinished {
        /// Task ID
        task_id: TaskId,
        /// Entries recorded as success
        succeeded: usize,
        /// Entries recorded as failed
        failed: usize,
    },
}
