use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ItemCategory;
use crate::ConfigError;

/// A quantity-range-keyed discount on the item subtotal.
///
/// Ranges are half-open: a tier matches when `min_qty <= total < max_qty`
/// (or `total >= min_qty` when `max_qty` is absent). Overlapping tiers are
/// resolved in favor of the larger `min_qty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeDiscountTier {
    pub min_qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<u32>,
    pub discount_rate: Decimal,
}

impl VolumeDiscountTier {
    #[must_use]
    pub fn contains(&self, total_quantity: u32) -> bool {
        if total_quantity < self.min_qty {
            return false;
        }
        match self.max_qty {
            Some(max) => total_quantity < max,
            None => true,
        }
    }
}

/// Additive surcharges for scheduling proximity. Amounts of zero disable
/// the corresponding surge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSurge {
    pub same_day: Decimal,
    pub next_day: Decimal,
    pub weekend: Decimal,
}

/// A geographic surge zone with an optional time-of-day / day-of-week
/// activation window.
///
/// `boundary` is a polygon of `[lat, lng]` vertices. `days_of_week` uses
/// 0 = Monday .. 6 = Sunday; an empty list means every day. Window times are
/// `HH:MM` in the service's local convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeZone {
    pub name: String,
    pub boundary: Vec<[f64; 2]>,
    pub amount: Decimal,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Admin-owned pricing parameters, read-only to the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub base_price: Decimal,
    pub per_item_rate: Decimal,
    #[serde(default)]
    pub category_multipliers: HashMap<ItemCategory, Decimal>,
    #[serde(default)]
    pub volume_discount_tiers: Vec<VolumeDiscountTier>,
    pub service_fee_rate: Decimal,
    pub minimum_job_price: Decimal,
    #[serde(default)]
    pub time_surge: TimeSurge,
    #[serde(default)]
    pub surge_zones: Vec<SurgeZone>,
}

impl PricingConfig {
    /// Multiplier for a category; unknown categories price at 1.0.
    #[must_use]
    pub fn multiplier(&self, category: ItemCategory) -> Decimal {
        self.category_multipliers
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Select the matching discount tier for a total quantity.
    ///
    /// When more than one tier contains the quantity, the tier with the
    /// largest `min_qty` wins.
    #[must_use]
    pub fn discount_tier(&self, total_quantity: u32) -> Option<&VolumeDiscountTier> {
        self.volume_discount_tiers
            .iter()
            .filter(|tier| tier.contains(total_quantity))
            .max_by_key(|tier| tier.min_qty)
    }
}

/// Load and validate the pricing configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_pricing(path: &Path) -> Result<PricingConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PricingFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: PricingConfig = serde_yaml::from_str(&content)?;
    validate_pricing(&config)?;

    Ok(config)
}

fn validate_pricing(config: &PricingConfig) -> Result<(), ConfigError> {
    let non_negative = [
        ("base_price", config.base_price),
        ("per_item_rate", config.per_item_rate),
        ("minimum_job_price", config.minimum_job_price),
        ("time_surge.same_day", config.time_surge.same_day),
        ("time_surge.next_day", config.time_surge.next_day),
        ("time_surge.weekend", config.time_surge.weekend),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "{field} must be non-negative, got {value}"
            )));
        }
    }

    if config.service_fee_rate < Decimal::ZERO || config.service_fee_rate >= Decimal::ONE {
        return Err(ConfigError::Validation(format!(
            "service_fee_rate must be in [0, 1), got {}",
            config.service_fee_rate
        )));
    }

    for (category, multiplier) in &config.category_multipliers {
        if *multiplier <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "category multiplier for '{category}' must be positive, got {multiplier}"
            )));
        }
    }

    for tier in &config.volume_discount_tiers {
        if tier.min_qty == 0 {
            return Err(ConfigError::Validation(
                "volume discount tier min_qty must be at least 1".to_string(),
            ));
        }
        if let Some(max) = tier.max_qty {
            if max <= tier.min_qty {
                return Err(ConfigError::Validation(format!(
                    "volume discount tier [{}, {max}) is empty",
                    tier.min_qty
                )));
            }
        }
        if tier.discount_rate < Decimal::ZERO || tier.discount_rate >= Decimal::ONE {
            return Err(ConfigError::Validation(format!(
                "volume discount rate must be in [0, 1), got {}",
                tier.discount_rate
            )));
        }
    }

    let mut seen_zones = HashSet::new();
    for zone in &config.surge_zones {
        if zone.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "surge zone name must be non-empty".to_string(),
            ));
        }
        if !seen_zones.insert(zone.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate surge zone name: '{}'",
                zone.name
            )));
        }
        if zone.boundary.len() < 3 {
            return Err(ConfigError::Validation(format!(
                "surge zone '{}' boundary needs at least 3 vertices, got {}",
                zone.name,
                zone.boundary.len()
            )));
        }
        if zone.amount < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "surge zone '{}' amount must be non-negative, got {}",
                zone.name, zone.amount
            )));
        }
        if let Some(day) = zone.days_of_week.iter().find(|d| **d > 6) {
            return Err(ConfigError::Validation(format!(
                "surge zone '{}' has invalid weekday {day}; expected 0 (Mon) through 6 (Sun)",
                zone.name
            )));
        }
    }

    Ok(())
}

/// Serde adapter for optional `HH:MM` window times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveTime::parse_from_str(&s, FORMAT)
                .map_err(|e| serde::de::Error::custom(format!("invalid HH:MM time '{s}': {e}")))
        })
        .transpose()
    }
}
