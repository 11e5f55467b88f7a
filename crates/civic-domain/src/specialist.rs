// specialist.rs
use crate::errors::DomainError;
use crate::validation::{self, Validate, ValidationReport};
use flow::{Row, RowId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Modalidad de atención de un horario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleKind {
    Appointment,
    WalkIn,
    Both,
}

impl ScheduleKind {
    pub const ALL: [ScheduleKind; 3] = [Self::Appointment, Self::WalkIn, Self::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appointment => "Appointment",
            Self::WalkIn => "Walk ins",
            Self::Both => "Both Appointment and Walk ins",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
                 .copied()
                 .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
                 .ok_or_else(|| DomainError::UnknownValue { kind: "tipo de horario",
                                                            value: s.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: String,
    pub open: String,
    pub close: String,
    pub kind: ScheduleKind,
}

impl ScheduleSlot {
    pub fn new(day: &str, open: &str, close: &str, kind: ScheduleKind) -> Self {
        Self { day: day.to_string(),
               open: open.to_string(),
               close: close.to_string(),
               kind }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("schedday".into(), JsonValue::from(self.day.as_str()));
        row.insert("schedopen".into(), JsonValue::from(self.open.as_str()));
        row.insert("schedclose".into(), JsonValue::from(self.close.as_str()));
        row.insert("schedtype".into(), JsonValue::from(self.kind.as_str()));
        row
    }
}

impl Validate for ScheduleSlot {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check(validation::is_weekday(&self.day), "day", "Day is required");
        report.check(validation::is_time(&self.open), "open", "Opening time is required");
        report.check(validation::is_time(&self.close), "close", "Closing time is required");
        report
    }
}

/// Atención del especialista en una institución de salud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicAssignment {
    pub institution_id: RowId,
    /// Consultorio o ubicación dentro de la institución.
    pub location: String,
    pub schedule: Vec<ScheduleSlot>,
}

impl ClinicAssignment {
    pub fn new(institution_id: impl Into<RowId>, location: &str) -> Self {
        Self { institution_id: institution_id.into(),
               location: location.to_string(),
               schedule: Vec::new() }
    }

    pub fn with_slot(mut self, slot: ScheduleSlot) -> Self {
        self.schedule.push(slot);
        self
    }

    /// Fila del mapeo especialista ↔ institución. El contacto del
    /// especialista se repite en cada mapeo.
    pub fn to_row(&self, email: &str, phone: &str) -> Row {
        let mut row = Row::new();
        row.insert("health_institution_id".into(), self.institution_id.to_json());
        row.insert("location".into(), JsonValue::from(self.location.trim()));
        row.insert("email".into(), JsonValue::from(email.trim()));
        row.insert("phonenumber".into(), JsonValue::from(phone.trim()));
        row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistDraft {
    pub name: String,
    pub suffixes: String,
    pub specializations: Vec<String>,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub assignments: Vec<ClinicAssignment>,
}

impl SpecialistDraft {
    pub fn new(name: &str, suffixes: &str) -> Self {
        Self { name: name.to_string(),
               suffixes: suffixes.to_string(),
               specializations: Vec::new(),
               description: String::new(),
               email: String::new(),
               phone: String::new(),
               assignments: Vec::new() }
    }

    pub fn root_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), JsonValue::from(self.name.trim()));
        row.insert("specialized".into(),
                   JsonValue::Array(self.specializations.iter().map(|s| JsonValue::from(s.trim())).collect()));
        row.insert("suffixes".into(), JsonValue::from(self.suffixes.trim()));
        row.insert("description".into(), JsonValue::from(self.description.as_str()));
        row
    }
}

impl Validate for SpecialistDraft {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check(self.name.trim().chars().count() >= 2, "name", "Name must have at least 2 letters");
        report.require(&self.suffixes, "suffixes", "Suffixes are required");
        report.check(!self.specializations.is_empty(), "specializations", "At least one specialization is required");
        for (i, s) in self.specializations.iter().enumerate() {
            report.require(s, format!("specializations.{}", i), "Specialization cannot be blank");
        }
        report.check(validation::is_email(self.email.trim()), "email", "Invalid email");
        report.check(self.phone.trim().chars().count() >= 11, "phone", "Invalid Number, Too short");
        report.check(!self.assignments.is_empty(), "assignments", "At least one institution is required");
        for (i, a) in self.assignments.iter().enumerate() {
            let prefix = format!("assignments.{}", i);
            report.require(&a.location, format!("{}.location", prefix), "Room/Unit is required");
            report.check(!a.schedule.is_empty(), format!("{}.schedule", prefix), "At least one schedule is required");
            for (j, slot) in a.schedule.iter().enumerate() {
                report.merge(&format!("{}.schedule.{}", prefix, j), slot.validate());
            }
        }
        report
    }
}
