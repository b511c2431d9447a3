use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single label value. Integers order before strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Text(s)
    }
}

/// One participant of a job
#[derive(Debug, Clone)]
pub struct Worker {
    pub identity: String,
    pub has_submitted: bool,
    /// Empty until the worker submits
    pub labels: Vec<Label>,
    pub registered_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Worker {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            has_submitted: false,
            labels: Vec::new(),
            registered_at: Utc::now(),
            submitted_at: None,
        }
    }

    pub fn record_submission(&mut self, labels: Vec<Label>) {
        self.labels = labels;
        self.has_submitted = true;
        self.submitted_at = Some(Utc::now());
    }
}
