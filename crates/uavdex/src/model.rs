//! Core record types for the uavdex catalogue.
//!
//! This module defines the aircraft, subsystem, and custom-parameter records
//! that the store persists, along with the fixed numeric-attribute schema the
//! statistics module selects from.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The fixed numeric attributes of an aircraft record, with display units.
///
/// These are the axes offered by the statistics module alongside any
/// registered custom parameters.
pub const NUMERIC_ATTRIBUTES: &[(&str, &str)] = &[
    ("length_m", "m"),
    ("wingspan_m", "m"),
    ("height_m", "m"),
    ("mtow_kg", "kg"),
    ("empty_weight_kg", "kg"),
    ("max_payload_kg", "kg"),
    ("max_speed_kmh", "km/h"),
    ("cruise_speed_kmh", "km/h"),
    ("range_km", "km"),
    ("endurance_min", "min"),
    ("ceiling_m", "m"),
];

/// The fixed aircraft category enumeration.
///
/// Serialized exactly as the legacy strings (`"Fixed-Wing"`, `"Multi-Rotor"`,
/// `"VTOL"`, `"Helicopter"`, `"Other"`) so existing JSON files load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    /// Fixed-wing airframe.
    #[serde(rename = "Fixed-Wing")]
    FixedWing,
    /// Multi-rotor airframe.
    #[serde(rename = "Multi-Rotor")]
    MultiRotor,
    /// Vertical take-off and landing hybrid.
    #[serde(rename = "VTOL")]
    Vtol,
    /// Conventional helicopter.
    Helicopter,
    /// Anything else.
    #[default]
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 5] = [
        Self::FixedWing,
        Self::MultiRotor,
        Self::Vtol,
        Self::Helicopter,
        Self::Other,
    ];

    /// The legacy string form of this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedWing => "Fixed-Wing",
            Self::MultiRotor => "Multi-Rotor",
            Self::Vtol => "VTOL",
            Self::Helicopter => "Helicopter",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fixed-Wing" => Ok(Self::FixedWing),
            "Multi-Rotor" => Ok(Self::MultiRotor),
            "VTOL" => Ok(Self::Vtol),
            "Helicopter" => Ok(Self::Helicopter),
            "Other" => Ok(Self::Other),
            other => Err(Error::UnknownCategory {
                value: other.to_string(),
            }),
        }
    }
}

/// A value stored for a user-defined custom parameter on an aircraft record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomValue {
    /// The numeric value; `None` when unset.
    pub value: Option<f64>,
    /// The display unit, copied from the parameter definition at write time.
    pub unit: String,
}

/// A catalogued aircraft model.
///
/// The `name` field is the de-facto unique key for merge and update
/// matching; the `id` is opaque and generated from a coarse timestamp, so
/// two records created in the same second share an id. That weakness is
/// accepted and the id is never used for matching.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftModel {
    /// Opaque time-derived identifier (`uav-<unix-seconds>`).
    pub id: String,
    /// Model name; unique key within the collection.
    pub name: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Airframe category.
    #[serde(rename = "type")]
    pub category: Category,
    /// Image reference: absolute URL or a local file name.
    pub image_url: Option<String>,
    /// Free-text description.
    pub description: String,
    /// Length in meters.
    pub length_m: Option<f64>,
    /// Wingspan in meters.
    pub wingspan_m: Option<f64>,
    /// Height in meters.
    pub height_m: Option<f64>,
    /// Maximum take-off weight in kilograms.
    pub mtow_kg: Option<f64>,
    /// Empty weight in kilograms.
    pub empty_weight_kg: Option<f64>,
    /// Maximum payload in kilograms.
    pub max_payload_kg: Option<f64>,
    /// Maximum speed in km/h.
    pub max_speed_kmh: Option<f64>,
    /// Cruise speed in km/h.
    pub cruise_speed_kmh: Option<f64>,
    /// Range in kilometers.
    pub range_km: Option<f64>,
    /// Endurance in minutes.
    pub endurance_min: Option<f64>,
    /// Service ceiling in meters.
    pub ceiling_m: Option<f64>,
    /// Purpose tags.
    pub purpose: Vec<String>,
    /// User-defined parameter values keyed by parameter name.
    pub custom_params: BTreeMap<String, CustomValue>,
}

impl AircraftModel {
    /// Generate a fresh identifier from the current time.
    ///
    /// The timestamp resolution is one second; collisions are accepted.
    #[must_use]
    pub fn new_id() -> String {
        format!("uav-{}", Utc::now().timestamp())
    }

    /// Look up a numeric attribute by key.
    ///
    /// Fixed attributes are resolved first, then custom parameters.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<f64> {
        let fixed = match key {
            "length_m" => self.length_m,
            "wingspan_m" => self.wingspan_m,
            "height_m" => self.height_m,
            "mtow_kg" => self.mtow_kg,
            "empty_weight_kg" => self.empty_weight_kg,
            "max_payload_kg" => self.max_payload_kg,
            "max_speed_kmh" => self.max_speed_kmh,
            "cruise_speed_kmh" => self.cruise_speed_kmh,
            "range_km" => self.range_km,
            "endurance_min" => self.endurance_min,
            "ceiling_m" => self.ceiling_m,
            _ => None,
        };
        fixed.or_else(|| self.custom_params.get(key).and_then(|c| c.value))
    }

    /// Set a fixed numeric attribute by key.
    ///
    /// Returns `false` when the key names no fixed attribute.
    pub fn set_attribute(&mut self, key: &str, value: f64) -> bool {
        let slot = match key {
            "length_m" => &mut self.length_m,
            "wingspan_m" => &mut self.wingspan_m,
            "height_m" => &mut self.height_m,
            "mtow_kg" => &mut self.mtow_kg,
            "empty_weight_kg" => &mut self.empty_weight_kg,
            "max_payload_kg" => &mut self.max_payload_kg,
            "max_speed_kmh" => &mut self.max_speed_kmh,
            "cruise_speed_kmh" => &mut self.cruise_speed_kmh,
            "range_km" => &mut self.range_km,
            "endurance_min" => &mut self.endurance_min,
            "ceiling_m" => &mut self.ceiling_m,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Normalize every "missing" numeric representation to `None`.
    ///
    /// serde_json cannot emit NaN, so this must run before serialization;
    /// unset values then land in the file as an explicit `null`.
    pub fn normalize(&mut self) {
        for (key, _) in NUMERIC_ATTRIBUTES {
            let slot = self.attribute_slot_mut(key);
            if slot.is_some_and(f64::is_nan) {
                *slot = None;
            }
        }
        for custom in self.custom_params.values_mut() {
            if custom.value.is_some_and(f64::is_nan) {
                custom.value = None;
            }
        }
    }

    /// Validate the record for insertion.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the name or manufacturer is blank or
    /// any numeric attribute is negative.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name is required"));
        }
        if self.manufacturer.trim().is_empty() {
            return Err(Error::validation("manufacturer is required"));
        }
        for (key, _) in NUMERIC_ATTRIBUTES {
            if let Some(Some(v)) = self.attribute_slot(key) {
                if *v < 0.0 {
                    return Err(Error::validation(format!(
                        "{key} must be non-negative, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn attribute_slot(&self, key: &str) -> Option<&Option<f64>> {
        match key {
            "length_m" => Some(&self.length_m),
            "wingspan_m" => Some(&self.wingspan_m),
            "height_m" => Some(&self.height_m),
            "mtow_kg" => Some(&self.mtow_kg),
            "empty_weight_kg" => Some(&self.empty_weight_kg),
            "max_payload_kg" => Some(&self.max_payload_kg),
            "max_speed_kmh" => Some(&self.max_speed_kmh),
            "cruise_speed_kmh" => Some(&self.cruise_speed_kmh),
            "range_km" => Some(&self.range_km),
            "endurance_min" => Some(&self.endurance_min),
            "ceiling_m" => Some(&self.ceiling_m),
            _ => None,
        }
    }

    fn attribute_slot_mut(&mut self, key: &str) -> &mut Option<f64> {
        match key {
            "length_m" => &mut self.length_m,
            "wingspan_m" => &mut self.wingspan_m,
            "height_m" => &mut self.height_m,
            "mtow_kg" => &mut self.mtow_kg,
            "empty_weight_kg" => &mut self.empty_weight_kg,
            "max_payload_kg" => &mut self.max_payload_kg,
            "max_speed_kmh" => &mut self.max_speed_kmh,
            "cruise_speed_kmh" => &mut self.cruise_speed_kmh,
            "range_km" => &mut self.range_km,
            "endurance_min" => &mut self.endurance_min,
            "ceiling_m" => &mut self.ceiling_m,
            other => unreachable!("not a fixed attribute: {other}"),
        }
    }
}

/// Split a comma-delimited purpose string into trimmed, non-empty tags.
#[must_use]
pub fn split_purpose(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// A catalogued subsystem component.
///
/// Subsystems carry no identifier; the name is the natural key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subsystem {
    /// Component name; natural key within the collection.
    pub name: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Free-text category (flight controller, gimbal, engine, ...).
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Image reference: absolute URL or a local file name.
    pub image_url: Option<String>,
    /// Open map of key specifications (name to displayable value).
    pub key_specs: BTreeMap<String, String>,
}

/// A user-defined custom parameter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Parameter name; unique, matched case-sensitively.
    pub name: String,
    /// Display unit.
    pub unit: String,
    /// When the definition was created.
    pub created_at: DateTime<Utc>,
}

impl ParamDef {
    /// Create a definition timestamped now.
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(category, back);
        }
    }

    #[test]
    fn test_category_legacy_strings() {
        assert_eq!(
            serde_json::to_string(&Category::FixedWing).unwrap(),
            "\"Fixed-Wing\""
        );
        assert_eq!(serde_json::to_string(&Category::Vtol).unwrap(), "\"VTOL\"");
        assert_eq!(
            serde_json::to_string(&Category::MultiRotor).unwrap(),
            "\"Multi-Rotor\""
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("VTOL".parse::<Category>().unwrap(), Category::Vtol);
        assert_eq!(
            "Fixed-Wing".parse::<Category>().unwrap(),
            Category::FixedWing
        );
        assert!("Blimp".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_matches_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
        }
    }

    #[test]
    fn test_new_id_shape() {
        let id = AircraftModel::new_id();
        assert!(id.starts_with("uav-"));
        assert!(id["uav-".len()..].parse::<i64>().is_ok());
    }

    #[test]
    fn test_attribute_lookup_fixed() {
        let model = AircraftModel {
            mtow_kg: Some(25.0),
            ..AircraftModel::default()
        };
        assert_eq!(model.attribute("mtow_kg"), Some(25.0));
        assert_eq!(model.attribute("range_km"), None);
        assert_eq!(model.attribute("nonsense"), None);
    }

    #[test]
    fn test_attribute_lookup_custom() {
        let mut model = AircraftModel::default();
        model.custom_params.insert(
            "max_torque".to_string(),
            CustomValue {
                value: Some(3.5),
                unit: "N*m".to_string(),
            },
        );
        assert_eq!(model.attribute("max_torque"), Some(3.5));
    }

    #[test]
    fn test_set_attribute() {
        let mut model = AircraftModel::default();
        assert!(model.set_attribute("range_km", 120.0));
        assert_eq!(model.range_km, Some(120.0));
        assert!(!model.set_attribute("not_a_field", 1.0));
    }

    #[test]
    fn test_normalize_clears_nan() {
        let mut model = AircraftModel {
            mtow_kg: Some(f64::NAN),
            range_km: Some(80.0),
            ..AircraftModel::default()
        };
        model.custom_params.insert(
            "x".to_string(),
            CustomValue {
                value: Some(f64::NAN),
                unit: String::new(),
            },
        );
        model.normalize();
        assert_eq!(model.mtow_kg, None);
        assert_eq!(model.range_km, Some(80.0));
        assert_eq!(model.custom_params["x"].value, None);
    }

    #[test]
    fn test_validate_requires_name_and_manufacturer() {
        let model = AircraftModel::default();
        assert!(model.validate().is_err());

        let model = AircraftModel {
            name: "Heron".to_string(),
            manufacturer: "  ".to_string(),
            ..AircraftModel::default()
        };
        assert!(model.validate().is_err());

        let model = AircraftModel {
            name: "Heron".to_string(),
            manufacturer: "IAI".to_string(),
            ..AircraftModel::default()
        };
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative() {
        let model = AircraftModel {
            name: "Heron".to_string(),
            manufacturer: "IAI".to_string(),
            wingspan_m: Some(-1.0),
            ..AircraftModel::default()
        };
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("wingspan_m"));
    }

    #[test]
    fn test_unset_attribute_serializes_as_null() {
        let model = AircraftModel {
            name: "Heron".to_string(),
            manufacturer: "IAI".to_string(),
            ..AircraftModel::default()
        };
        let json = serde_json::to_value(&model).unwrap();
        assert!(json["mtow_kg"].is_null());
        assert!(json["image_url"].is_null());
        assert_eq!(json["type"], "Other");
    }

    #[test]
    fn test_model_round_trip() {
        let mut model = AircraftModel {
            id: "uav-1700000000".to_string(),
            name: "Heron".to_string(),
            manufacturer: "IAI".to_string(),
            category: Category::FixedWing,
            description: "MALE UAV".to_string(),
            wingspan_m: Some(16.6),
            endurance_min: Some(3120.0),
            purpose: vec!["Surveillance".to_string()],
            ..AircraftModel::default()
        };
        model.custom_params.insert(
            "fuel_l".to_string(),
            CustomValue {
                value: Some(430.0),
                unit: "L".to_string(),
            },
        );

        let json = serde_json::to_string(&model).unwrap();
        let back: AircraftModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model, back);
    }

    #[test]
    fn test_partial_json_loads_with_defaults() {
        let json = r#"{"name": "Anka", "manufacturer": "TAI", "type": "Fixed-Wing"}"#;
        let model: AircraftModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.name, "Anka");
        assert_eq!(model.category, Category::FixedWing);
        assert_eq!(model.mtow_kg, None);
        assert!(model.purpose.is_empty());
    }

    #[test]
    fn test_split_purpose() {
        assert_eq!(
            split_purpose("Mapping, Survey , ,Delivery"),
            vec!["Mapping", "Survey", "Delivery"]
        );
        assert!(split_purpose("  ").is_empty());
    }

    #[test]
    fn test_subsystem_round_trip() {
        let mut subsystem = Subsystem {
            name: "Pixhawk 6C".to_string(),
            manufacturer: "Holybro".to_string(),
            category: "Flight Controller".to_string(),
            description: "Open-standard autopilot".to_string(),
            image_url: None,
            key_specs: BTreeMap::new(),
        };
        subsystem
            .key_specs
            .insert("Processor".to_string(), "STM32H743".to_string());

        let json = serde_json::to_string(&subsystem).unwrap();
        let back: Subsystem = serde_json::from_str(&json).unwrap();
        assert_eq!(subsystem, back);
    }

    #[test]
    fn test_param_def_new() {
        let def = ParamDef::new("max_torque", "N*m");
        assert_eq!(def.name, "max_torque");
        assert_eq!(def.unit, "N*m");
    }

    #[test]
    fn test_numeric_attributes_cover_lookup() {
        let mut model = AircraftModel::default();
        for (i, (key, _)) in NUMERIC_ATTRIBUTES.iter().enumerate() {
            assert!(model.set_attribute(key, i as f64));
            assert_eq!(model.attribute(key), Some(i as f64));
        }
    }
}
