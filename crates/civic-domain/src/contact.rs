// contact.rs
use crate::errors::DomainError;
use crate::schema::InstitutionSchema;
use crate::validation::{self, Validate, ValidationReport};
use flow::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Tipo de contacto. Se guarda con la misma grafía que usa el esquema
/// remoto (`Mobile`, `Landline`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactType {
    Mobile,
    Landline,
    Email,
    Facebook,
    Website,
}

impl ContactType {
    pub const ALL: [ContactType; 5] = [Self::Mobile, Self::Landline, Self::Email, Self::Facebook, Self::Website];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Landline => "Landline",
            Self::Email => "Email",
            Self::Facebook => "Facebook",
            Self::Website => "Website",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
                 .copied()
                 .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
                 .ok_or_else(|| DomainError::UnknownValue { kind: "tipo de contacto",
                                                            value: s.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetail {
    pub kind: ContactType,
    pub value: String,
}

impl ContactDetail {
    pub fn new(kind: ContactType, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn to_row(&self, schema: &InstitutionSchema) -> Row {
        let mut row = Row::new();
        row.insert(schema.contact_detail.to_string(), JsonValue::from(self.value.trim()));
        row.insert(schema.contact_type.to_string(), JsonValue::from(self.kind.as_str()));
        row
    }
}

impl Validate for ContactDetail {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let value = self.value.trim();
        if value.is_empty() {
            report.push("value", "Contact detail is required");
            return report;
        }
        match self.kind {
            ContactType::Mobile => report.check(validation::is_mobile(value), "value", "Mobile number must have 11 digits"),
            ContactType::Landline => {
                report.check(validation::is_landline(value), "value", "Landline number must have 7 to 9 digits")
            }
            ContactType::Email => report.check(validation::is_email(value), "value", "Invalid email"),
            ContactType::Facebook | ContactType::Website => {}
        }
        report
    }
}
