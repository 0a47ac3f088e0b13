//! Role Name Value Object
//!
//! Closed set of role names. Claims carrying an unknown role string are
//! rejected at parse time instead of being passed through.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoleName {
    #[default]
    #[serde(rename = "STUDENT")]
    Student,
    #[serde(rename = "TEACHER")]
    Teacher,
}

impl RoleName {
    /// Parse a requested role name; case and surrounding whitespace are
    /// normalized to the canonical upper-case form.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_uppercase().as_str() {
            "STUDENT" => Some(RoleName::Student),
            "TEACHER" => Some(RoleName::Teacher),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoleName::Student => "STUDENT",
            RoleName::Teacher => "TEACHER",
        }
    }

    /// All seeded role names
    pub const ALL: [RoleName; 2] = [RoleName::Student, RoleName::Teacher];
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
