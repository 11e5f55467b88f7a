// institution.rs
//
// Borrador de institución (salud o financiera) tal como lo arma el
// asistente de alta: fila raíz, horarios, contactos y ofertas (servicios o
// programas) con sus pasos, requisitos y beneficios.
use crate::contact::ContactDetail;
use crate::errors::DomainError;
use crate::schema::{self, DescriptionStorage, InstitutionSchema};
use crate::validation::{self, Validate, ValidationReport};
use flow::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstitutionKind {
    #[default]
    Health,
    Financial,
}

impl InstitutionKind {
    pub fn schema(&self) -> &'static InstitutionSchema {
        match self {
            Self::Health => &schema::HEALTH,
            Self::Financial => &schema::FINANCIAL,
        }
    }

    /// Nombre de la oferta en la interfaz.
    pub fn offering_label(&self) -> &'static str {
        match self {
            Self::Health => "service",
            Self::Financial => "program",
        }
    }
}

impl fmt::Display for InstitutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Health => write!(f, "health"),
            Self::Financial => write!(f, "financial"),
        }
    }
}

impl FromStr for InstitutionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" | "salud" => Ok(Self::Health),
            "financial" | "financiera" => Ok(Self::Financial),
            other => Err(DomainError::UnknownValue { kind: "tipo de institución",
                                                     value: other.to_string() }),
        }
    }
}

/// Referencias a la jerarquía geográfica provincia → ciudad → barangay → purok.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRef {
    pub province_code: String,
    pub city_zip_code: String,
    pub brgy_code: String,
    pub purok_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHour {
    pub day: String,
    pub open: String,
    pub close: String,
}

impl OperatingHour {
    pub fn new(day: &str, open: &str, close: &str) -> Self {
        Self { day: day.to_string(),
               open: open.to_string(),
               close: close.to_string() }
    }

    pub fn to_row(&self, schema: &InstitutionSchema) -> Row {
        let mut row = Row::new();
        row.insert(schema.hours_day.to_string(), JsonValue::from(self.day.as_str()));
        row.insert(schema.hours_open.to_string(), JsonValue::from(self.open.as_str()));
        row.insert(schema.hours_close.to_string(), JsonValue::from(self.close.as_str()));
        row
    }
}

impl Validate for OperatingHour {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check(validation::is_weekday(&self.day), "day", "Day is required");
        report.check(validation::is_time(&self.open), "open", "Start time is required");
        report.check(validation::is_time(&self.close), "close", "End time is required");
        report
    }
}

/// Servicio (salud) o programa (financiera).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingDraft {
    pub name: String,
    pub description: String,
    pub procedures: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
}

impl OfferingDraft {
    pub fn new(name: &str, description: &str) -> Self {
        Self { name: name.to_string(),
               description: description.to_string(),
               ..Default::default() }
    }

    pub fn with_procedures<I, S>(mut self, items: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.procedures.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn with_requirements<I, S>(mut self, items: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.requirements.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn with_benefits<I, S>(mut self, items: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.benefits.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn to_row(&self, schema: &InstitutionSchema) -> Row {
        let mut row = Row::new();
        row.insert(schema.offering_name.to_string(), JsonValue::from(self.name.trim()));
        row.insert(schema.offering_desc.to_string(), JsonValue::from(self.description.as_str()));
        row
    }

    fn validate_for(&self, kind: InstitutionKind) -> ValidationReport {
        let mut report = ValidationReport::new();
        let label = kind.offering_label();
        report.require(&self.name, "name", &format!("{} name is required", capitalize(label)));
        report.require(&self.description, "description", &format!("{} description is required", capitalize(label)));
        report.check(!self.procedures.is_empty(), "procedures", "At least one procedure is required");
        blank_entries(&mut report, "procedures", &self.procedures, "Procedure step is required");
        blank_entries(&mut report, "requirements", &self.requirements, "Requirement is required");
        blank_entries(&mut report, "benefits", &self.benefits, "Benefit is required");
        if kind == InstitutionKind::Health && !self.benefits.is_empty() {
            report.push("benefits", "Health services do not carry benefits");
        }
        report
    }
}

/// Fila de procedimiento/paso. `seq_no` es la posición + 1.
pub fn procedure_row(schema: &InstitutionSchema, position: usize, text: &str) -> Row {
    let mut row = Row::new();
    row.insert(schema.procedure_desc.to_string(), JsonValue::from(text.trim()));
    row.insert(schema.procedure_seq.to_string(), JsonValue::from(position as u64 + 1));
    row
}

pub fn requirement_row(schema: &InstitutionSchema, text: &str) -> Row {
    let mut row = Row::new();
    row.insert(schema.requirement_desc.to_string(), JsonValue::from(text.trim()));
    row
}

/// `None` para las instituciones sin tabla de beneficios.
pub fn benefit_row(schema: &InstitutionSchema, text: &str) -> Option<Row> {
    schema.benefits.map(|_| {
                       let mut row = Row::new();
                       row.insert(schema.benefit_desc.to_string(), JsonValue::from(text.trim()));
                       row
                   })
}

fn blank_entries(report: &mut ValidationReport, field: &str, items: &[String], message: &str) {
    for (i, item) in items.iter().enumerate() {
        report.require(item, format!("{}.{}", field, i), message);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionDraft {
    pub kind: InstitutionKind,
    pub name: String,
    /// HTML del editor de texto enriquecido.
    pub description: Option<String>,
    pub latitude: String,
    pub longitude: String,
    pub location: GeoRef,
    pub hours: Vec<OperatingHour>,
    pub contacts: Vec<ContactDetail>,
    pub offerings: Vec<OfferingDraft>,
}

impl InstitutionDraft {
    pub fn new(kind: InstitutionKind, name: &str) -> Self {
        Self { kind,
               name: name.to_string(),
               ..Default::default() }
    }

    pub fn schema(&self) -> &'static InstitutionSchema {
        self.kind.schema()
    }

    /// Descripción no vacía, si la hay.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Fila de la tabla raíz. En las financieras incluye la descripción.
    pub fn root_row(&self) -> Row {
        let s = self.schema();
        let mut row = Row::new();
        row.insert(s.name.to_string(), JsonValue::from(self.name.trim()));
        row.insert(s.latitude.to_string(), JsonValue::from(self.latitude.trim()));
        row.insert(s.longitude.to_string(), JsonValue::from(self.longitude.trim()));
        row.insert(s.purok.to_string(), JsonValue::from(self.location.purok_code.as_str()));
        row.insert(s.city.to_string(), JsonValue::from(self.location.city_zip_code.as_str()));
        row.insert(s.province.to_string(), JsonValue::from(self.location.province_code.as_str()));
        row.insert(s.barangay.to_string(), JsonValue::from(self.location.brgy_code.as_str()));
        if let DescriptionStorage::Inline { column } = s.description {
            row.insert(column.to_string(), self.description_text().map(JsonValue::from).unwrap_or(JsonValue::Null));
        }
        row
    }

    /// Fila de descripción aparte (salud). `None` si va en la raíz o no hay
    /// descripción.
    pub fn description_row(&self) -> Option<Row> {
        match self.schema().description {
            DescriptionStorage::Separate { column, .. } => self.description_text().map(|text| {
                                                                                    let mut row = Row::new();
                                                                                    row.insert(column.to_string(), JsonValue::from(text));
                                                                                    row
                                                                                }),
            DescriptionStorage::Inline { .. } => None,
        }
    }
}

impl Validate for InstitutionDraft {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.require(&self.name, "name", "Institution name is required");
        report.require(&self.location.province_code, "location.province_code", "Province is required");
        report.require(&self.location.city_zip_code, "location.city_zip_code", "City is required");
        report.require(&self.location.brgy_code, "location.brgy_code", "Barangay is required");
        report.require(&self.location.purok_code, "location.purok_code", "Purok is required");
        report.check(validation::is_coordinate(&self.latitude), "latitude", "Invalid latitude");
        report.check(validation::is_coordinate(&self.longitude), "longitude", "Invalid longitude");

        report.check(!self.hours.is_empty(), "hours", "At least one operating hour is required");
        for (i, h) in self.hours.iter().enumerate() {
            report.merge(&format!("hours.{}", i), h.validate());
        }
        report.check(!self.contacts.is_empty(), "contacts", "At least one contact is required");
        for (i, c) in self.contacts.iter().enumerate() {
            report.merge(&format!("contacts.{}", i), c.validate());
        }
        report.check(!self.offerings.is_empty(),
                     "offerings",
                     &format!("At least one {} is required", self.kind.offering_label()));
        for (i, o) in self.offerings.iter().enumerate() {
            report.merge(&format!("offerings.{}", i), o.validate_for(self.kind));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactType;

    fn draft(kind: InstitutionKind) -> InstitutionDraft {
        InstitutionDraft { kind,
                           name: "Test Clinic".into(),
                           description: Some("<p>desc</p>".into()),
                           latitude: "10.3157".into(),
                           longitude: "123.8854".into(),
                           location: GeoRef { province_code: "0722".into(),
                                              city_zip_code: "6000".into(),
                                              brgy_code: "072217001".into(),
                                              purok_code: "1".into() },
                           hours: vec![OperatingHour::new("Monday", "08:00", "17:00")],
                           contacts: vec![ContactDetail::new(ContactType::Mobile, "09123456789")],
                           offerings: vec![OfferingDraft::new("Checkup", "General").with_procedures(["Register"])] }
    }

    #[test]
    fn complete_draft_is_valid() {
        assert!(draft(InstitutionKind::Health).validate().is_valid());
        assert!(draft(InstitutionKind::Financial).validate().is_valid());
    }

    #[test]
    fn reports_every_failing_field() {
        let mut d = draft(InstitutionKind::Health);
        d.name = " ".into();
        d.latitude = "north".into();
        d.contacts.push(ContactDetail::new(ContactType::Landline, "12"));
        d.offerings[0].benefits.push("Free".into());
        let report = d.validate();
        assert!(report.has_error("name"));
        assert!(report.has_error("latitude"));
        assert!(report.has_error("contacts.1.value"));
        assert!(report.has_error("offerings.0.benefits"));
        assert!(!report.has_error("longitude"));
    }

    #[test]
    fn description_placement_depends_on_kind() {
        let health = draft(InstitutionKind::Health);
        assert!(!health.root_row().contains_key("financial_insti_desc"));
        assert_eq!(health.description_row().map(|r| r["hospitals_desc_content"].clone()),
                   Some(JsonValue::from("<p>desc</p>")));

        let financial = draft(InstitutionKind::Financial);
        assert_eq!(financial.root_row()["financial_insti_desc"], "<p>desc</p>");
        assert_eq!(financial.root_row()["geo_latitutde"], "10.3157");
        assert!(financial.description_row().is_none());

        let mut blank = draft(InstitutionKind::Health);
        blank.description = Some("   ".into());
        assert!(blank.description_row().is_none());
    }

    #[test]
    fn procedures_are_numbered_from_one() {
        let row = procedure_row(&schema::HEALTH, 0, " Register ");
        assert_eq!(row["seq_no"], 1);
        assert_eq!(row["procedure_desc"], "Register");
        assert!(benefit_row(&schema::HEALTH, "x").is_none());
        assert!(benefit_row(&schema::FINANCIAL, "x").is_some());
    }
}
