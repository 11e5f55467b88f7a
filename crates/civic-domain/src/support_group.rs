// support_group.rs
use crate::validation::{Validate, ValidationReport};
use chrono::NaiveDate;
use flow::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportGroupDraft {
    pub name: String,
    pub type_code: String,
    pub detail: String,
    pub started: Option<NaiveDate>,
    pub social_link: String,
    pub founder: String,
}

impl SupportGroupDraft {
    pub fn new(name: &str, type_code: &str) -> Self {
        Self { name: name.to_string(),
               type_code: type_code.to_string(),
               ..Default::default() }
    }

    /// Fila de `support_groups`. La fecha viaja como `YYYY-MM-DD` o null.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("group_name".into(), JsonValue::from(self.name.trim()));
        row.insert("group_type_code".into(), JsonValue::from(self.type_code.trim()));
        row.insert("group_detail".into(), JsonValue::from(self.detail.as_str()));
        row.insert("group_started_date".into(),
                   self.started.map(|d| JsonValue::from(d.format("%Y-%m-%d").to_string())).unwrap_or(JsonValue::Null));
        row.insert("group_socmed_link".into(), JsonValue::from(self.social_link.trim()));
        row.insert("founder".into(), JsonValue::from(self.founder.trim()));
        row
    }
}

impl Validate for SupportGroupDraft {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.require(&self.name, "name", "Group name is required");
        report.require(&self.type_code, "type_code", "Group type is required");
        report
    }
}
