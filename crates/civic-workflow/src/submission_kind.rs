use crate::errors::WorkflowError;
use civic_domain::InstitutionKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tipos de envío que soporta el crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    HealthInstitution,
    FinancialInstitution,
    MedicalSpecialist,
    Publication,
    SupportGroup,
}

impl SubmissionKind {
    pub const ALL: [SubmissionKind; 5] = [Self::HealthInstitution,
                                          Self::FinancialInstitution,
                                          Self::MedicalSpecialist,
                                          Self::Publication,
                                          Self::SupportGroup];

    /// Nombre legible para los mensajes al usuario.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HealthInstitution => "health institution",
            Self::FinancialInstitution => "financial institution",
            Self::MedicalSpecialist => "medical specialist",
            Self::Publication => "publication",
            Self::SupportGroup => "support group",
        }
    }

    /// Título de la notificación de fallo remoto, el mismo que mostraba
    /// cada pantalla del panel.
    pub fn failure_title(&self) -> &'static str {
        match self {
            Self::HealthInstitution | Self::FinancialInstitution | Self::MedicalSpecialist => "Submission Failed",
            Self::Publication => "Insertion Error",
            Self::SupportGroup => "Operation Failed",
        }
    }
}

impl From<InstitutionKind> for SubmissionKind {
    fn from(kind: InstitutionKind) -> Self {
        match kind {
            InstitutionKind::Health => Self::HealthInstitution,
            InstitutionKind::Financial => Self::FinancialInstitution,
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionKind::HealthInstitution => "health_institution",
            SubmissionKind::FinancialInstitution => "financial_institution",
            SubmissionKind::MedicalSpecialist => "medical_specialist",
            SubmissionKind::Publication => "publication",
            SubmissionKind::SupportGroup => "support_group",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SubmissionKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.iter()
                 .copied()
                 .find(|k| k.to_string() == wanted)
                 .ok_or_else(|| WorkflowError::Validation(format!("tipo de envío desconocido: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        for k in SubmissionKind::ALL {
            assert_eq!(k.to_string().parse::<SubmissionKind>(), Ok(k));
        }
        assert_eq!("Support Group".parse::<SubmissionKind>(), Ok(SubmissionKind::SupportGroup));
        assert!("molecule".parse::<SubmissionKind>().is_err());
    }
}
