//! Modelo de dominio del panel administrativo: borradores tipados de las
//! entidades que se dan de alta (instituciones, especialistas,
//! publicaciones, grupos de apoyo), su validación local y el mapeo al
//! esquema remoto.
mod contact;
mod errors;
mod geography;
mod institution;
mod publication;
pub mod schema;
mod specialist;
mod support_group;
pub mod validation;

pub use contact::{ContactDetail, ContactType};
pub use errors::{DomainError, Result};
pub use geography::{Barangay, City, GeoLevel, LookupOption, Province, Purok};
pub use institution::{benefit_row, procedure_row, requirement_row, GeoRef, InstitutionDraft, InstitutionKind,
                      OfferingDraft, OperatingHour};
pub use publication::PublicationDraft;
pub use schema::{CatalogSpec, DescriptionStorage, InstitutionSchema, TableSpec};
pub use specialist::{ClinicAssignment, ScheduleKind, ScheduleSlot, SpecialistDraft};
pub use support_group::SupportGroupDraft;
pub use validation::{FieldError, Validate, ValidationReport};
