//! Shared domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user message paired with the reply shown for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExchange {
    pub user: String,
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatExchange {
    pub fn new(user: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            reply: reply.into(),
            timestamp: Utc::now(),
        }
    }
}
