//! Core types for scraped vehicle status.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, ParseResult};

/// One named field of a [`VehicleStatusRecord`].
///
/// The declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusField {
    /// When the app last refreshed data from the vehicle.
    LastRefreshDate,
    /// Battery state of charge, as shown by the app.
    BatteryStateOfCharge,
    /// Charger state text (e.g. `UNPLUGGED...`).
    ChargerState,
    /// Minimum estimated range.
    RangeMinimum,
    /// Maximum estimated range.
    RangeMaximum,
    /// Interior temperature range (e.g. `62-68°F`).
    InteriorTemperatureRange,
    /// Time to full on a level-two charger (e.g. `5h:30m`).
    LevelTwoChargerEta,
}

impl StatusField {
    /// Every field, in output order.
    pub const ALL: [StatusField; 7] = [
        StatusField::LastRefreshDate,
        StatusField::BatteryStateOfCharge,
        StatusField::ChargerState,
        StatusField::RangeMinimum,
        StatusField::RangeMaximum,
        StatusField::InteriorTemperatureRange,
        StatusField::LevelTwoChargerEta,
    ];

    /// Hyphenated name used in `field-name=value` output.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            StatusField::LastRefreshDate => "last-refresh-date",
            StatusField::BatteryStateOfCharge => "battery-state-of-charge",
            StatusField::ChargerState => "charger-state",
            StatusField::RangeMinimum => "range-minimum",
            StatusField::RangeMaximum => "range-maximum",
            StatusField::InteriorTemperatureRange => "interior-temperature-range",
            StatusField::LevelTwoChargerEta => "level-two-charger-eta",
        }
    }

    /// Underscored name, as used for record attributes.
    #[must_use]
    pub fn snake_name(self) -> String {
        self.key().replace('-', "_")
    }

    /// Look a field up by its hyphenated or underscored name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.key() == key || f.snake_name() == key)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Vehicle status read off the app's status screen.
///
/// A record always carries exactly one value per [`StatusField`]. Values are
/// kept verbatim as displayed, except the refresh date which is reformatted
/// by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleStatusRecord {
    values: [String; 7],
}

impl VehicleStatusRecord {
    /// Build a record from all seven values.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        last_refresh_date: impl Into<String>,
        battery_state_of_charge: impl Into<String>,
        charger_state: impl Into<String>,
        range_minimum: impl Into<String>,
        range_maximum: impl Into<String>,
        interior_temperature_range: impl Into<String>,
        level_two_charger_eta: impl Into<String>,
    ) -> Self {
        Self {
            values: [
                last_refresh_date.into(),
                battery_state_of_charge.into(),
                charger_state.into(),
                range_minimum.into(),
                range_maximum.into(),
                interior_temperature_range.into(),
                level_two_charger_eta.into(),
            ],
        }
    }

    /// Build a record from `(field, value)` pairs in any order.
    ///
    /// Every field must appear exactly once.
    pub fn from_pairs<I, S>(pairs: I) -> ParseResult<Self>
    where
        I: IntoIterator<Item = (StatusField, S)>,
        S: Into<String>,
    {
        let mut slots: [Option<String>; 7] = Default::default();
        for (field, value) in pairs {
            let slot = &mut slots[field.index()];
            if slot.is_some() {
                return Err(ParseError::InvalidRecord(format!(
                    "duplicate field '{}'",
                    field
                )));
            }
            *slot = Some(value.into());
        }

        let mut values: [String; 7] = Default::default();
        for (field, slot) in StatusField::ALL.into_iter().zip(slots) {
            values[field.index()] = slot.ok_or_else(|| {
                ParseError::InvalidRecord(format!("missing field '{}'", field))
            })?;
        }
        Ok(Self { values })
    }

    /// Parse `field-name=value` lines, as printed by the CLI.
    ///
    /// Blank lines are ignored. The value is everything after the first `=`.
    pub fn from_lines(text: &str) -> ParseResult<Self> {
        let mut pairs = Vec::with_capacity(7);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ParseError::InvalidRecord(format!("no '=' in line '{}'", line)))?;
            let field = StatusField::from_key(key)
                .ok_or_else(|| ParseError::InvalidRecord(format!("unknown field '{}'", key)))?;
            pairs.push((field, value.to_string()));
        }
        Self::from_pairs(pairs)
    }

    /// Get the value of one field.
    #[must_use]
    pub fn get(&self, field: StatusField) -> &str {
        &self.values[field.index()]
    }

    /// Iterate over `(field, value)` in output order.
    pub fn fields(&self) -> impl Iterator<Item = (StatusField, &str)> {
        StatusField::ALL
            .into_iter()
            .map(move |f| (f, self.values[f.index()].as_str()))
    }

    pub fn last_refresh_date(&self) -> &str {
        self.get(StatusField::LastRefreshDate)
    }

    pub fn battery_state_of_charge(&self) -> &str {
        self.get(StatusField::BatteryStateOfCharge)
    }

    pub fn charger_state(&self) -> &str {
        self.get(StatusField::ChargerState)
    }

    pub fn range_minimum(&self) -> &str {
        self.get(StatusField::RangeMinimum)
    }

    pub fn range_maximum(&self) -> &str {
        self.get(StatusField::RangeMaximum)
    }

    pub fn interior_temperature_range(&self) -> &str {
        self.get(StatusField::InteriorTemperatureRange)
    }

    pub fn level_two_charger_eta(&self) -> &str {
        self.get(StatusField::LevelTwoChargerEta)
    }
}

impl fmt::Display for VehicleStatusRecord {
    /// Renders the `field-name=value` lines, one per field, each newline-terminated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, value) in self.fields() {
            writeln!(f, "{}={}", field.key(), value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl Serialize for VehicleStatusRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(StatusField::ALL.len()))?;
        for (field, value) in self.fields() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for VehicleStatusRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        let raw = std::collections::BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut pairs = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let field = StatusField::from_key(&key)
                .ok_or_else(|| D::Error::custom(format!("unknown field '{}'", key)))?;
            pairs.push((field, value));
        }
        Self::from_pairs(pairs).map_err(D::Error::custom)
    }
}
