// src/domain/reference.rs

use crate::domain::bid::{normalize_email, optional, required};
use crate::domain::job::non_negative;
use crate::errors::ServerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    Interior,
    Exterior,
}

/// Scope-of-work line item such as "Kitchen Cabinets".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCategory {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub material: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContractor {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewContractor {
    pub fn into_contractor(self, id: String) -> Result<Contractor, ServerError> {
        Ok(Contractor {
            id,
            company_name: required("company_name", &self.company_name)?,
            contact_name: required("contact_name", &self.contact_name)?,
            email: normalize_email(&self.email)?,
            location: optional(self.location),
        })
    }
}

/// The onboarded property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub address_line: String,
    pub city: String,
    pub state_abbr: String,
    pub postal_code: String,
    pub unit_count: i64,
}

impl Property {
    pub fn validate(&self) -> Result<(), ServerError> {
        required("name", &self.name)?;
        required("address_line", &self.address_line)?;
        required("city", &self.city)?;
        required("state_abbr", &self.state_abbr)?;
        required("postal_code", &self.postal_code)?;
        if self.unit_count < 0 {
            return Err(ServerError::Validation("unit_count must not be negative".into()));
        }
        Ok(())
    }
}

/// A rental unit in the property's inventory, before any job claims it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUnit {
    pub id: String,
    pub unit_number: String,
    pub floor_plan: Option<String>,
    pub pre_rent: f64,
    pub post_rent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryUnit {
    pub unit_number: String,
    #[serde(default)]
    pub floor_plan: Option<String>,
    pub pre_rent: f64,
    pub post_rent: f64,
}

impl NewInventoryUnit {
    pub fn into_unit(self, id: String) -> Result<InventoryUnit, ServerError> {
        Ok(InventoryUnit {
            id,
            unit_number: required("unit_number", &self.unit_number)?,
            floor_plan: optional(self.floor_plan),
            pre_rent: non_negative("pre_rent", self.pre_rent)?,
            post_rent: non_negative("post_rent", self.post_rent)?,
        })
    }
}
