use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Skin types a user profile can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Normal,
    Dry,
    Oily,
    Combination,
}

impl SkinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Normal => "normal",
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combination => "combination",
        }
    }
}

impl std::fmt::Display for SkinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(SkinType::Normal),
            "dry" => Ok(SkinType::Dry),
            "oily" => Ok(SkinType::Oily),
            "combination" => Ok(SkinType::Combination),
            _ => Err(Error::InvalidSkinType(s.to_string())),
        }
    }
}

/// What the caller knows about the user a recommendation is for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub skin_type: Option<SkinType>,
    /// Allergen keywords, applied in order
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl UserProfile {
    pub fn new(skin_type: Option<SkinType>, allergies: Vec<String>) -> Self {
        Self {
            skin_type,
            allergies,
        }
    }
}
