use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::review::location_label;

/// Business profile from `GET /locations/{id}`. Everything except the id
/// may be missing for incomplete profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationProfile {
    #[serde(alias = "location_id")]
    pub id: String,
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub primary_category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: Option<u64>,
}

impl LocationProfile {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => location_label(&self.id),
        }
    }
}

/// Profile completeness flags from `GET /locations/{id}/hygiene`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationHygiene {
    pub has_phone: u8,
    pub has_website: u8,
    pub has_hours: u8,
    pub has_description: u8,
    pub has_category: u8,
    pub has_photos: u8,
    pub has_address: u8,
    /// Percentage computed server-side.
    pub health: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistItem {
    pub label: &'static str,
    pub done: bool,
}

impl LocationHygiene {
    fn flags(&self) -> [(&'static str, &'static str, u8); 7] {
        [
            ("has_phone", "Phone number", self.has_phone),
            ("has_website", "Website", self.has_website),
            ("has_hours", "Opening hours", self.has_hours),
            ("has_description", "Description", self.has_description),
            ("has_category", "Primary category", self.has_category),
            ("has_photos", "Photos", self.has_photos),
            ("has_address", "Address", self.has_address),
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, _, value) in self.flags() {
            if value > 1 {
                return Err(ValidationError::Value {
                    field,
                    reason: format!("expected 0 or 1, got {}", value),
                });
            }
        }
        if self.health > 100 {
            return Err(ValidationError::Value {
                field: "health",
                reason: format!("expected 0-100, got {}", self.health),
            });
        }
        Ok(())
    }

    pub fn checklist(&self) -> Vec<ChecklistItem> {
        self.flags()
            .into_iter()
            .map(|(_, label, value)| ChecklistItem {
                label,
                done: value == 1,
            })
            .collect()
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.checklist()
            .into_iter()
            .filter(|item| !item.done)
            .map(|item| item.label)
            .collect()
    }
}
