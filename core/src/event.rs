//! Domain event model
//!
//! [`Event`] is the typed form of a wire [`Disaster`](crate::proto::Disaster).
//! The relay decides delivery from `id`, `category`, `magnitude` and
//! `alert_level`; every other field is display payload for sinks.
//!
//! # Wire Mapping
//!
//! ```text
//! proto::Disaster                Event
//! ───────────────                ─────
//! id                      ──►    id
//! type (i32)              ──►    category      (unknown / UNSPECIFIED → Other)
//! magnitude               ──►    magnitude
//! alert_level (i32)       ──►    alert_level   (unknown → Unknown)
//! latitude, longitude     ──►    coordinates
//! timestamp (unix secs)   ──►    timestamp     (out of range → None)
//! title, source, extras   ──►    unchanged
//! ```

use crate::proto;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Disaster category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Earthquake,
    Flood,
    Wildfire,
    Cyclone,
    Tsunami,
    Volcano,
    Drought,
    Other,
}

impl Category {
    /// All categories, in wire order
    pub const ALL: [Category; 8] = [
        Category::Earthquake,
        Category::Flood,
        Category::Wildfire,
        Category::Cyclone,
        Category::Tsunami,
        Category::Volcano,
        Category::Drought,
        Category::Other,
    ];

    /// Upper-case name, as used in configuration and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Earthquake => "EARTHQUAKE",
            Category::Flood => "FLOOD",
            Category::Wildfire => "WILDFIRE",
            Category::Cyclone => "CYCLONE",
            Category::Tsunami => "TSUNAMI",
            Category::Volcano => "VOLCANO",
            Category::Drought => "DROUGHT",
            Category::Other => "OTHER",
        }
    }

    /// Wire value for upstream filters
    ///
    /// `Other` has no wire counterpart and cannot be requested upstream.
    pub fn to_proto(self) -> Option<proto::DisasterType> {
        match self {
            Category::Earthquake => Some(proto::DisasterType::Earthquake),
            Category::Flood => Some(proto::DisasterType::Flood),
            Category::Wildfire => Some(proto::DisasterType::Wildfire),
            Category::Cyclone => Some(proto::DisasterType::Cyclone),
            Category::Tsunami => Some(proto::DisasterType::Tsunami),
            Category::Volcano => Some(proto::DisasterType::Volcano),
            Category::Drought => Some(proto::DisasterType::Drought),
            Category::Other => None,
        }
    }

    /// Map a raw wire value, folding unknown values into `Other`
    pub fn from_wire(value: i32) -> Self {
        match proto::DisasterType::try_from(value) {
            Ok(proto::DisasterType::Earthquake) => Category::Earthquake,
            Ok(proto::DisasterType::Flood) => Category::Flood,
            Ok(proto::DisasterType::Wildfire) => Category::Wildfire,
            Ok(proto::DisasterType::Cyclone) => Category::Cyclone,
            Ok(proto::DisasterType::Tsunami) => Category::Tsunami,
            Ok(proto::DisasterType::Volcano) => Category::Volcano,
            Ok(proto::DisasterType::Drought) => Category::Drought,
            Ok(proto::DisasterType::Unspecified) | Err(_) => Category::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Category`] or [`AlertLevel`] from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLevelError {
    kind: &'static str,
    value: String,
}

impl FromStr for Category {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| ParseLevelError {
                kind: "disaster type",
                value: s.to_string(),
            })
    }
}

/// Qualitative alert tier
///
/// Ordered: `Unknown < Green < Orange < Red`. The derive order is the
/// comparison order, so do not reorder variants.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    #[default]
    Unknown,
    Green,
    Orange,
    Red,
}

impl AlertLevel {
    /// All levels, lowest first
    pub const ALL: [AlertLevel; 4] = [
        AlertLevel::Unknown,
        AlertLevel::Green,
        AlertLevel::Orange,
        AlertLevel::Red,
    ];

    /// Upper-case name, as used in configuration and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Unknown => "UNKNOWN",
            AlertLevel::Green => "GREEN",
            AlertLevel::Orange => "ORANGE",
            AlertLevel::Red => "RED",
        }
    }

    /// Wire value
    pub fn to_proto(self) -> proto::AlertLevel {
        match self {
            AlertLevel::Unknown => proto::AlertLevel::Unknown,
            AlertLevel::Green => proto::AlertLevel::Green,
            AlertLevel::Orange => proto::AlertLevel::Orange,
            AlertLevel::Red => proto::AlertLevel::Red,
        }
    }

    /// Map a raw wire value, folding unknown values into `Unknown`
    pub fn from_wire(value: i32) -> Self {
        match proto::AlertLevel::try_from(value) {
            Ok(proto::AlertLevel::Green) => AlertLevel::Green,
            Ok(proto::AlertLevel::Orange) => AlertLevel::Orange,
            Ok(proto::AlertLevel::Red) => AlertLevel::Red,
            Ok(proto::AlertLevel::Unknown) | Err(_) => AlertLevel::Unknown,
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        AlertLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == upper)
            .ok_or_else(|| ParseLevelError {
                kind: "alert level",
                value: s.to_string(),
            })
    }
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One disaster report
///
/// Immutable once built. Stages take it by reference or by value and never
/// mutate a shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Upstream identifier, unique per feed
    pub id: String,
    pub category: Category,
    /// Severity score; only meaningful for earthquakes
    pub magnitude: f64,
    pub alert_level: AlertLevel,
    pub title: String,
    pub coordinates: Coordinates,
    /// Reporting agency (e.g. "GDACS", "USGS")
    pub source: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-form fields passed through to sinks
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl Event {
    /// Create an event with the decision fields set and empty display fields
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            magnitude: 0.0,
            alert_level: AlertLevel::Unknown,
            title: String::new(),
            coordinates: Coordinates::default(),
            source: String::new(),
            timestamp: None,
            extras: BTreeMap::new(),
        }
    }

    /// Set the magnitude
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Set the alert level
    pub fn with_alert_level(mut self, alert_level: AlertLevel) -> Self {
        self.alert_level = alert_level;
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether this is an earthquake (magnitude-gated)
    pub fn is_earthquake(&self) -> bool {
        self.category == Category::Earthquake
    }
}

impl From<proto::Disaster> for Event {
    fn from(d: proto::Disaster) -> Self {
        Self {
            category: Category::from_wire(d.r#type),
            alert_level: AlertLevel::from_wire(d.alert_level),
            magnitude: d.magnitude,
            coordinates: Coordinates {
                latitude: d.latitude,
                longitude: d.longitude,
            },
            timestamp: Utc.timestamp_opt(d.timestamp, 0).single(),
            extras: d.extras.into_iter().collect(),
            id: d.id,
            title: d.title,
            source: d.source,
        }
    }
}
