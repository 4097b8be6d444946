// ## 📂 File: `src/audit/event.rs`

//! audit/event.rs
//! One structured audit record, serialized as a single JSON object.
//!
//! ```json
//! {"timestamp":"2024-05-06T07:08:09.123Z","event_type":"conversion","user_id":"system",
//!  "action":"convert_excel_to_xml","status":"success","details":{"input_file":"a.xlsx"}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Authentication,
    FileOperation,
    Conversion,
    Security,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Failure,
}

impl AuditStatus {
    pub fn from_ok(ok: bool) -> Self {
        if ok { AuditStatus::Success } else { AuditStatus::Failure }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub user_id: String,
    pub action: String,
    pub status: AuditStatus,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            user_id: user_id.into(),
            action: action.into(),
            status: AuditStatus::Success,
            details: Map::new(),
        }
    }

    pub fn authentication(user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(AuditEventType::Authentication, user_id, action)
    }

    pub fn file_operation(user_id: impl Into<String>, action: impl Into<String>, file_name: &str, file_size: u64) -> Self {
        Self::new(AuditEventType::FileOperation, user_id, action)
            .with_detail("file_name", file_name)
            .with_detail("file_size", file_size)
    }

    pub fn conversion(user_id: impl Into<String>, input_file: &str, output_file: &str, conversion_time_ms: f64) -> Self {
        Self::new(AuditEventType::Conversion, user_id, "convert_excel_to_xml")
            .with_detail("input_file", input_file)
            .with_detail("output_file", output_file)
            .with_detail("conversion_time_ms", conversion_time_ms)
    }

    pub fn error(user_id: impl Into<String>, action: impl Into<String>, error_code: &str, message: &str) -> Self {
        Self::new(AuditEventType::Error, user_id, action)
            .with_status(AuditStatus::Failure)
            .with_detail("error_code", error_code)
            .with_detail("message", message)
    }

    pub fn with_status(mut self, status: AuditStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == AuditStatus::Success
    }

    /// Single-line JSON. Serialization of these types cannot fail; fall back
    /// to an empty object rather than panic.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
