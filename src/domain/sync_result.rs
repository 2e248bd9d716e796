use serde::Serialize;
use serde_json::Value;

/// Outcome of a sync operation. Sync steps report failures through this value
/// instead of returning `Err`, so a batch can move on to the next sibling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl SyncResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
            details: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            details: None,
        }
    }

    pub fn failed_with(message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::failed(message)
        }
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Success/failure counts for a batch of records
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SyncTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl SyncTally {
    pub fn record(&mut self, success: bool) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// `"<n> <noun> failed to sync"` when anything failed.
    pub fn failure_note(&self, noun: &str) -> Option<String> {
        (self.failed > 0).then(|| format!("{} {} failed to sync", self.failed, noun))
    }
}
