use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Persisted and displayed value of a task that has no concrete time.
pub const UNSCHEDULED: &str = "no fixed time";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    #[default]
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Higher ranks sort first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Maps free text onto the closed set. Only the exact lowercase names
    /// are recognized; everything else becomes `Medium`.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Importance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Importance::coerce).unwrap_or_default())
    }
}

/// Time-of-day label for a task.
///
/// Concrete times are kept as the text the user (or the extractor) gave,
/// e.g. `"09:00"` or `"2pm"`, and compare lexicographically. `Unscheduled`
/// always orders after every concrete time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TaskTime {
    At(String),
    #[default]
    Unscheduled,
}

impl TaskTime {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNSCHEDULED) {
            Self::Unscheduled
        } else {
            Self::At(trimmed.to_string())
        }
    }

    pub fn is_unscheduled(&self) -> bool {
        matches!(self, Self::Unscheduled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::At(value) => value,
            Self::Unscheduled => UNSCHEDULED,
        }
    }
}

impl Ord for TaskTime {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::At(left), Self::At(right)) => left.cmp(right),
            (Self::At(_), Self::Unscheduled) => Ordering::Less,
            (Self::Unscheduled, Self::At(_)) => Ordering::Greater,
            (Self::Unscheduled, Self::Unscheduled) => Ordering::Equal,
        }
    }
}

impl PartialOrd for TaskTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TaskTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Option<String>> for TaskTime {
    fn from(value: Option<String>) -> Self {
        value
            .as_deref()
            .map(TaskTime::parse)
            .unwrap_or(TaskTime::Unscheduled)
    }
}

impl From<TaskTime> for String {
    fn from(value: TaskTime) -> Self {
        match value {
            TaskTime::At(time) => time,
            TaskTime::Unscheduled => UNSCHEDULED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub time: TaskTime,
    #[serde(default)]
    pub importance: Importance,
    /// Creation instant in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub completed: bool,
}

/// A normalized task candidate that has not been given an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTask {
    pub description: String,
    pub time: TaskTime,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}
