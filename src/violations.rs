use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single constraint broken by a request before it was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Violation {
    FieldEmpty { field: String },
    ScheduledTimeNegative { scheduled_time: i64 },
}

impl Violation {
    pub fn field(&self) -> &str {
        match self {
            Violation::FieldEmpty { field } => field,
            Violation::ScheduledTimeNegative { .. } => "scheduledTime",
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::FieldEmpty { field } => write!(f, "{} must not be empty", field),
            Violation::ScheduledTimeNegative { scheduled_time } => write!(
                f,
                "scheduledTime must be a non-negative integer, got {}",
                scheduled_time
            ),
        }
    }
}
