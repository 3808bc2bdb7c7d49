use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item categories the booking flow accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Furniture,
    Appliances,
    Electronics,
    Construction,
    YardWaste,
    General,
    Other,
}

impl ItemCategory {
    /// Human-readable label used in breakdowns and CLI output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ItemCategory::Furniture => "Furniture",
            ItemCategory::Appliances => "Appliances",
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Construction => "Construction Debris",
            ItemCategory::YardWaste => "Yard Waste",
            ItemCategory::General => "General Junk",
            ItemCategory::Other => "Other",
        }
    }

    #[must_use]
    pub fn all() -> &'static [ItemCategory] {
        &[
            ItemCategory::Furniture,
            ItemCategory::Appliances,
            ItemCategory::Electronics,
            ItemCategory::Construction,
            ItemCategory::YardWaste,
            ItemCategory::General,
            ItemCategory::Other,
        ]
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemCategory::Furniture => "furniture",
            ItemCategory::Appliances => "appliances",
            ItemCategory::Electronics => "electronics",
            ItemCategory::Construction => "construction",
            ItemCategory::YardWaste => "yard_waste",
            ItemCategory::General => "general",
            ItemCategory::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "furniture" => Ok(ItemCategory::Furniture),
            "appliances" => Ok(ItemCategory::Appliances),
            "electronics" => Ok(ItemCategory::Electronics),
            "construction" => Ok(ItemCategory::Construction),
            "yard_waste" => Ok(ItemCategory::YardWaste),
            "general" => Ok(ItemCategory::General),
            "other" => Ok(ItemCategory::Other),
            _ => Err(format!("unknown item category: '{s}'")),
        }
    }
}

/// One cart entry as submitted by a front end.
///
/// Quantity bounds (1–20) are enforced by the estimator; description length
/// is a UI-boundary concern and is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub category: ItemCategory,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn new(category: ItemCategory, quantity: u32) -> Self {
        Self {
            category,
            quantity,
            description: None,
        }
    }
}

/// Pickup address. Only the geocoded coordinates participate in pricing
/// (surge-zone containment); the street fields ride along for the booking
/// collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Address {
    /// Coordinates, if the address has been geocoded.
    #[must_use]
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// The pickup windows offered by the scheduling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "8-10")]
    Morning,
    #[serde(rename = "10-12")]
    LateMorning,
    #[serde(rename = "12-14")]
    Midday,
    #[serde(rename = "14-16")]
    Afternoon,
    #[serde(rename = "16-18")]
    LateAfternoon,
}

impl TimeSlot {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "8-10 AM",
            TimeSlot::LateMorning => "10 AM-12 PM",
            TimeSlot::Midday => "12-2 PM",
            TimeSlot::Afternoon => "2-4 PM",
            TimeSlot::LateAfternoon => "4-6 PM",
        }
    }
}

/// Requested pickup date and optional window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<TimeSlot>,
}
