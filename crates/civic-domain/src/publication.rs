// publication.rs
use crate::validation::{Validate, ValidationReport};
use chrono::NaiveDate;
use flow::{Row, RowId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Publicación del feed: cabecera, contenido y referencia opcional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub type_code: String,
    pub author_id: Option<RowId>,
    pub content: String,
    pub reference: Option<String>,
}

impl PublicationDraft {
    pub fn new(title: &str, date: NaiveDate, type_code: &str, author_id: impl Into<RowId>, content: &str) -> Self {
        Self { title: title.to_string(),
               date: Some(date),
               type_code: type_code.to_string(),
               author_id: Some(author_id.into()),
               content: content.to_string(),
               reference: None }
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn root_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("publication_title".into(), JsonValue::from(self.title.trim()));
        row.insert("publication_date".into(),
                   self.date.map(|d| JsonValue::from(d.format("%Y-%m-%d").to_string())).unwrap_or(JsonValue::Null));
        row.insert("publication_type".into(), JsonValue::from(self.type_code.trim()));
        row.insert("author_id".into(), self.author_id.as_ref().map(RowId::to_json).unwrap_or(JsonValue::Null));
        row
    }

    pub fn content_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("content_detail".into(), JsonValue::from(self.content.as_str()));
        row
    }

    /// `None` si no hay referencia o está en blanco.
    pub fn reference_row(&self) -> Option<Row> {
        self.reference.as_deref().map(str::trim).filter(|r| !r.is_empty()).map(|r| {
                                                                               let mut row = Row::new();
                                                                               row.insert("ref_detail".into(), JsonValue::from(r));
                                                                               row
                                                                           })
    }
}

impl Validate for PublicationDraft {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check(self.title.trim().chars().count() >= 5, "title", "Title must be at least 5 characters");
        report.check(self.date.is_some(), "date", "Please select a publication date");
        report.require(&self.type_code, "type_code", "Select a standardized publication type");
        report.check(self.author_id.is_some(), "author_id", "Author ID is required");
        report.check(self.content.trim().chars().count() >= 20, "content", "Content must be at least 20 characters");
        report
    }
}
