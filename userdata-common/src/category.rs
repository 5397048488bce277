//! Record categories
//!
//! Every user data record carries exactly one category, fixed at creation.
//! The category decides the payload shape and which accuracy model (if any)
//! scores the record against the rest of its comparison group.

use serde::{Deserialize, Serialize};

/// Category of a user data record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Geographic position reports (latitude/longitude plus sensor extras)
    Location,

    /// Self-reported demographic attributes
    Demographic,

    /// Catch-all for submissions with no accuracy model
    Other,
}

impl Category {
    /// Parse category from string (from database or command line)
    ///
    /// Case insensitive. Returns `None` for unknown tags.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "location" => Some(Category::Location),
            "demographic" => Some(Category::Demographic),
            "other" => Some(Category::Other),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Category::Location => "LOCATION",
            Category::Demographic => "DEMOGRAPHIC",
            Category::Other => "OTHER",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Location => "Location",
            Category::Demographic => "Demographic",
            Category::Other => "Other",
        }
    }

    /// Get all category variants
    pub fn all_variants() -> &'static [Category] {
        &[Category::Location, Category::Demographic, Category::Other]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
