//! Vehicle hierarchy records and their result envelopes.

use serde::{Deserialize, Serialize};

use super::PartInfo;

/// One engine option for a make/year/model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub description: String,
    /// Site-assigned vehicle identifier.
    pub carcode: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCategory {
    pub name: String,
    /// URL-encoded name used in navigation calls.
    pub group_name: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleMakes {
    pub makes: Vec<String>,
}

impl VehicleMakes {
    pub fn count(&self) -> usize {
        self.makes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleYears {
    pub make: String,
    pub years: Vec<i32>,
}

impl VehicleYears {
    pub fn count(&self) -> usize {
        self.years.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleModels {
    pub make: String,
    pub year: i32,
    pub models: Vec<String>,
}

impl VehicleModels {
    pub fn count(&self) -> usize {
        self.models.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleEngines {
    pub make: String,
    pub year: i32,
    pub model: String,
    pub engines: Vec<Engine>,
}

impl VehicleEngines {
    pub fn count(&self) -> usize {
        self.engines.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePartCategories {
    pub make: String,
    pub year: i32,
    pub model: String,
    pub carcode: String,
    pub categories: Vec<PartCategory>,
}

impl VehiclePartCategories {
    pub fn count(&self) -> usize {
        self.categories.len()
    }

    /// First category whose name contains `needle`, ignoring case.
    pub fn find(&self, needle: &str) -> Option<&PartCategory> {
        let needle = needle.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePartsResult {
    pub make: String,
    pub year: i32,
    pub model: String,
    pub carcode: String,
    pub category: String,
    pub parts: Vec<PartInfo>,
}

impl VehiclePartsResult {
    pub fn count(&self) -> usize {
        self.parts.len()
    }
}
