//! Static part and tool data.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_PART_NUMBER: &str = "Unknown";

/// A part listing as scraped. Price is a display string (`"$12.34"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    pub name: String,
    pub part_number: String,
    pub price: Option<String>,
    pub brand: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub info_url: Option<String>,
    pub video_url: Option<String>,
    pub category: Option<String>,
    pub specifications: Option<String>,
    pub compatibility_notes: Option<String>,
}

impl PartInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            part_number: UNKNOWN_PART_NUMBER.to_string(),
            price: None,
            brand: None,
            url: None,
            image_url: None,
            info_url: None,
            video_url: None,
            category: None,
            specifications: None,
            compatibility_notes: None,
        }
    }

    pub fn has_part_number(&self) -> bool {
        self.part_number != UNKNOWN_PART_NUMBER
    }
}

impl fmt::Display for PartInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(price) = &self.price {
            write!(f, " - {price}")?;
        }
        if let Some(brand) = &self.brand {
            write!(f, " ({brand})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub part_number: String,
    pub price: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub info_url: Option<String>,
    pub video_url: Option<String>,
    pub specifications: Option<String>,
}

impl fmt::Display for ToolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(price) = &self.price {
            write!(f, " - {price}")?;
        }
        if let Some(brand) = &self.brand {
            write!(f, " ({brand})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCategory {
    pub name: String,
    pub group_name: String,
    pub href: String,
    /// 1 = top level.
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCategories {
    pub categories: Vec<ToolCategory>,
    pub level: usize,
    pub parent_path: String,
}

impl ToolCategories {
    pub fn count(&self) -> usize {
        self.categories.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsResult {
    pub tools: Vec<ToolInfo>,
    pub category: String,
    pub category_path: String,
}

impl ToolsResult {
    pub fn count(&self) -> usize {
        self.tools.len()
    }
}
