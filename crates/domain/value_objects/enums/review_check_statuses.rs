use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCheckStatus {
    #[default]
    Pending,
    Running,
    Matched,
    Abandoned,
}

impl Display for ReviewCheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ReviewCheckStatus::Pending => "pending",
            ReviewCheckStatus::Running => "running",
            ReviewCheckStatus::Matched => "matched",
            ReviewCheckStatus::Abandoned => "abandoned",
        };
        write!(f, "{}", status)
    }
}

impl ReviewCheckStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "running" => ReviewCheckStatus::Running,
            "matched" => ReviewCheckStatus::Matched,
            "abandoned" => ReviewCheckStatus::Abandoned,
            _ => ReviewCheckStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewCheckStatus::Matched | ReviewCheckStatus::Abandoned)
    }
}
