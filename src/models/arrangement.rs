//! Daily staff arrangement model.
//!
//! One arrangement row exists per employee per calendar day. The free-text
//! columns describe audits, leave and presence checks for that day.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Free-text columns of an arrangement row, in storage order.
pub const TEXT_COLUMNS: [&str; 8] = [
    "audit_activity",
    "audit_purpose",
    "order_number",
    "order_period",
    "audit_address",
    "leave_status",
    "presence_check",
    "not_started",
];

/// The free-text part of an arrangement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementNotes {
    pub audit_activity: String,
    pub audit_purpose: String,
    pub order_number: String,
    pub order_period: String,
    pub audit_address: String,
    pub leave_status: String,
    pub presence_check: String,
    pub not_started: String,
}

impl ArrangementNotes {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| v.is_empty())
    }

    /// Values in [`TEXT_COLUMNS`] order.
    pub fn values(&self) -> [&str; 8] {
        [
            &self.audit_activity,
            &self.audit_purpose,
            &self.order_number,
            &self.order_period,
            &self.audit_address,
            &self.leave_status,
            &self.presence_check,
            &self.not_started,
        ]
    }
}

/// A stored arrangement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrangement {
    pub id: String,
    pub profile_id: String,
    pub date: NaiveDate,
    /// Position copied from the profile when the row was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_auditor_id: Option<String>,
    #[serde(flatten)]
    pub notes: ArrangementNotes,
    pub updated_at: String,
}

/// An arrangement joined with the names needed to display it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementRow {
    #[serde(flatten)]
    pub arrangement: Arrangement,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    pub is_inspector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_auditor_name: Option<String>,
}

/// All rows of one day, split by staffing category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayArrangements {
    pub date: NaiveDate,
    pub inspectors: Vec<ArrangementRow>,
    pub apparatus: Vec<ArrangementRow>,
}

impl DayArrangements {
    /// Partition rows, keeping full name order in each half.
    pub fn split(date: NaiveDate, mut rows: Vec<ArrangementRow>) -> Self {
        rows.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| a.patronymic.cmp(&b.patronymic))
                .then_with(|| a.arrangement.id.cmp(&b.arrangement.id))
        });
        let (inspectors, apparatus): (Vec<_>, Vec<_>) =
            rows.into_iter().partition(|row| row.is_inspector);
        Self {
            date,
            inspectors,
            apparatus,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inspectors.len() + self.apparatus.len()
    }
}

/// Fields that can be edited one cell at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangementField {
    AuditActivity,
    AuditPurpose,
    OrderNumber,
    OrderPeriod,
    AuditAddress,
    LeaveStatus,
    PresenceCheck,
    NotStarted,
    ResponsibleAuditor,
    Position,
}

impl ArrangementField {
    pub const ALL: [ArrangementField; 10] = [
        ArrangementField::AuditActivity,
        ArrangementField::AuditPurpose,
        ArrangementField::OrderNumber,
        ArrangementField::OrderPeriod,
        ArrangementField::AuditAddress,
        ArrangementField::LeaveStatus,
        ArrangementField::PresenceCheck,
        ArrangementField::NotStarted,
        ArrangementField::ResponsibleAuditor,
        ArrangementField::Position,
    ];

    /// Wire name of the field, as sent by the client.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrangementField::AuditActivity => "audit_activity",
            ArrangementField::AuditPurpose => "audit_purpose",
            ArrangementField::OrderNumber => "order_number",
            ArrangementField::OrderPeriod => "order_period",
            ArrangementField::AuditAddress => "audit_address",
            ArrangementField::LeaveStatus => "leave_status",
            ArrangementField::PresenceCheck => "presence_check",
            ArrangementField::NotStarted => "not_started",
            ArrangementField::ResponsibleAuditor => "responsible_auditor",
            ArrangementField::Position => "position",
        }
    }

    /// Accepts the wire name or its camelCase form.
    pub fn parse(name: &str) -> Result<Self, AppError> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == name || field.camel_case() == name)
            .ok_or_else(|| AppError::InvalidField(format!("Unknown arrangement field: {}", name)))
    }

    fn camel_case(&self) -> &'static str {
        match self {
            ArrangementField::AuditActivity => "auditActivity",
            ArrangementField::AuditPurpose => "auditPurpose",
            ArrangementField::OrderNumber => "orderNumber",
            ArrangementField::OrderPeriod => "orderPeriod",
            ArrangementField::AuditAddress => "auditAddress",
            ArrangementField::LeaveStatus => "leaveStatus",
            ArrangementField::PresenceCheck => "presenceCheck",
            ArrangementField::NotStarted => "notStarted",
            ArrangementField::ResponsibleAuditor => "responsibleAuditor",
            ArrangementField::Position => "position",
        }
    }

    /// Storage column written by this field.
    pub fn column(&self) -> &'static str {
        match self {
            ArrangementField::ResponsibleAuditor => "responsible_auditor_id",
            ArrangementField::Position => "position_id",
            other => other.as_str(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ArrangementField::ResponsibleAuditor | ArrangementField::Position
        )
    }

    /// Type the raw client value for this field.
    ///
    /// Text fields take a string (null clears to empty). Reference fields
    /// take an id string, null or empty to clear.
    pub fn value_from_json(&self, raw: &serde_json::Value) -> Result<FieldValue, AppError> {
        let text = match raw {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => {
                return Err(AppError::Validation(format!(
                    "Field {} expects a string, got {}",
                    self.as_str(),
                    other
                )))
            }
        };

        if self.is_reference() {
            Ok(FieldValue::Reference(
                text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            ))
        } else {
            Ok(FieldValue::Text(text.unwrap_or_default()))
        }
    }
}

/// A typed value for an [`ArrangementField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Reference(Option<String>),
}

impl FieldValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(text) => serde_json::Value::String(text.clone()),
            FieldValue::Reference(Some(id)) => serde_json::Value::String(id.clone()),
            FieldValue::Reference(None) => serde_json::Value::Null,
        }
    }
}

/// Request body for a single-cell edit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldRequest {
    pub field: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Result of a single-cell edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub id: String,
    pub field: String,
    pub value: serde_json::Value,
}

/// Request body for copying one day onto another.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDayRequest {
    pub source_date: NaiveDate,
    pub target_date: NaiveDate,
}

/// Outcome of a day import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Imported { count: u64 },
    NothingToImport,
}

/// Request body for month generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMonthRequest {
    pub year: i32,
    pub month: u32,
}

/// Request body for the single-day bulk operations.
#[derive(Debug, Clone, Deserialize)]
pub struct DayRequest {
    pub date: NaiveDate,
}

/// Query parameters for listing a day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Count of rows touched by a bulk operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    pub affected: u64,
}

/// Every calendar day of a month, first to last.
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("Invalid month: {}-{}", year, month)))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::Validation(format!("Invalid month: {}-{}", year, month)))?;

    Ok(first
        .iter_days()
        .take_while(|day| *day < next_first)
        .filter(|day| day.month() == month)
        .collect())
}
