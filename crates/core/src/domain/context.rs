use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Answers captured by the intake form before the quote was requested.
///
/// The parser only ever reads this value; it is the second rung of every
/// field's fallback chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormContext {
    pub building_type: Option<String>,
    pub elevator_brand: Option<String>,
    pub floors: Option<String>,
    pub service_type: Option<String>,
    pub urgency: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub visit_date: Option<String>,
    pub description: Option<String>,
}

impl FormContext {
    pub fn building_type(&self) -> Option<&str> {
        present(&self.building_type)
    }

    pub fn elevator_brand(&self) -> Option<&str> {
        present(&self.elevator_brand)
    }

    pub fn floors(&self) -> Option<&str> {
        present(&self.floors)
    }

    pub fn service_type(&self) -> Option<&str> {
        present(&self.service_type)
    }

    pub fn urgency(&self) -> Option<&str> {
        present(&self.urgency)
    }

    pub fn address(&self) -> Option<&str> {
        present(&self.address)
    }

    pub fn contact_name(&self) -> Option<&str> {
        present(&self.contact_name)
    }

    pub fn contact_email(&self) -> Option<&str> {
        present(&self.contact_email)
    }

    pub fn visit_date(&self) -> Option<&str> {
        present(&self.visit_date)
    }

    /// Checks the fields the building step requires before a submission.
    pub fn validate_required(&self) -> Result<(), DomainError> {
        if self.building_type().is_none() {
            return Err(DomainError::MissingField("buildingType"));
        }
        if self.elevator_brand().is_none() {
            return Err(DomainError::MissingField("elevatorBrand"));
        }
        if self.floors().is_none() {
            return Err(DomainError::MissingField("floors"));
        }
        Ok(())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
