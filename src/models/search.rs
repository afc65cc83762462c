//! Parts-search dropdowns and results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PartInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSearchOption {
    /// Form value sent to the server.
    pub value: String,
    pub text: String,
}

/// Which dropdown of the parts-search form an option list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchDropdown {
    Manufacturer,
    PartGroup,
    PartType,
}

impl SearchDropdown {
    pub const ALL: [SearchDropdown; 3] = [Self::Manufacturer, Self::PartGroup, Self::PartType];

    /// `id` of the `<select>` element on the parts-search page.
    pub fn select_id(self) -> &'static str {
        match self {
            Self::Manufacturer => "manufacturer_partsearch_007",
            Self::PartGroup => "partgroup_partsearch_007",
            Self::PartType => "parttype_partsearch_007",
        }
    }
}

impl fmt::Display for SearchDropdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manufacturer => "manufacturer",
            Self::PartGroup => "part group",
            Self::PartType => "part type",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub dropdown: SearchDropdown,
    pub options: Vec<PartSearchOption>,
    pub last_updated: DateTime<Utc>,
}

impl SearchOptions {
    pub fn count(&self) -> usize {
        self.options.len()
    }

    /// Case-insensitive lookup by display text.
    pub fn by_name(&self, name: &str) -> Option<&PartSearchOption> {
        let name = name.to_lowercase();
        self.options.iter().find(|o| o.text.to_lowercase() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.text.as_str()).collect()
    }
}

/// Optional filters of a part-number search. `None` or `"All"` means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSearchFilters {
    pub manufacturer: Option<String>,
    pub part_group: Option<String>,
    pub part_type: Option<String>,
    pub part_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSearchResult {
    pub parts: Vec<PartInfo>,
    pub search_term: String,
    pub manufacturer: String,
    pub part_group: String,
}

impl PartSearchResult {
    pub fn count(&self) -> usize {
        self.parts.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIsPartCalledResult {
    pub main_category: String,
    pub subcategory: String,
    pub full_path: String,
}

impl fmt::Display for WhatIsPartCalledResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_category, self.subcategory)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIsPartCalledResults {
    pub results: Vec<WhatIsPartCalledResult>,
    pub search_term: String,
}

impl WhatIsPartCalledResults {
    pub fn count(&self) -> usize {
        self.results.len()
    }

    pub fn category_pairs(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .map(|r| (r.main_category.as_str(), r.subcategory.as_str()))
            .collect()
    }
}
