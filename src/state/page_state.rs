//! Page view structure: what the remote page shows and sends

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hidden field carrying the client-observed remaining time
pub const REMAINING_TIME_FIELD: &str = "remaining_time";
/// Hidden field marking an automatic submission
pub const TIMEOUT_FLAG_FIELD: &str = "timeout_flag";
/// Field holding the user's chosen answer
pub const ANSWER_FIELD: &str = "answer";

/// Display and form state of one quiz page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    /// Remaining time as shown to the user
    pub display_text: String,
    /// Whether the "loading" placeholder is still shown
    pub loading: bool,
    /// Display color override, set once the warning threshold is crossed
    pub color: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub submission: Option<Submission>,
}

impl PageView {
    /// Fresh page whose form carries the given (empty) fields
    pub fn new<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            display_text: String::new(),
            loading: true,
            color: None,
            fields: fields
                .into_iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
            submission: None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }
}

/// What the form posted when it was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub fields: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
    pub timed_out: bool,
    pub message: String,
}

impl Submission {
    /// Record a submission of the given form fields
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        let timed_out = fields.get(TIMEOUT_FLAG_FIELD).map(String::as_str) == Some("true");
        let message = if timed_out { "Time is up." } else { "Answer submitted." };
        Self {
            fields,
            submitted_at: Utc::now(),
            timed_out,
            message: message.to_string(),
        }
    }
}
