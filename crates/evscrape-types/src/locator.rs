//! UI element locators for the target application.
//!
//! The locator table is the whole surface this project knows about the
//! driven app. When the app's screen structure changes, only this table
//! needs updating.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::StatusField;

/// Android package of the supported app version.
pub const DEFAULT_APP_PACKAGE: &str = "com.aqsmartphone.android.nissan";

/// Stable identifier of one UI control (an Android resource id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementLocator(String);

impl ElementLocator {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the fully-qualified resource id `<package>:id/<name>`.
    pub fn resource_id(package: &str, name: &str) -> Self {
        Self(format!("{}:id/{}", package, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every element locator used by navigation and extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocatorTable {
    /// Application package, also used for app-state queries.
    pub app_package: String,

    // Sign-in path
    pub sign_in_entry: ElementLocator,
    pub username_field: ElementLocator,
    pub password_field: ElementLocator,
    pub sign_in_submit: ElementLocator,

    // Demo path
    pub demo_mode_entry: ElementLocator,

    // Onboarding interstitials, dismissed in this order
    pub skip_onboarding: ElementLocator,
    pub do_not_show_again: ElementLocator,

    pub refresh_icon: ElementLocator,
    pub refresh_status: ElementLocator,

    pub battery_state_of_charge: ElementLocator,
    pub charger_state: ElementLocator,
    pub range_minimum: ElementLocator,
    pub range_maximum: ElementLocator,
    pub interior_temperature_range: ElementLocator,
    pub level_two_charger_eta: ElementLocator,
}

impl Default for LocatorTable {
    fn default() -> Self {
        Self::for_package(DEFAULT_APP_PACKAGE)
    }
}

impl LocatorTable {
    /// The known screen ids, rooted under `package`.
    pub fn for_package(package: &str) -> Self {
        let id = |name: &str| ElementLocator::resource_id(package, name);
        Self {
            app_package: package.to_string(),
            sign_in_entry: id("btnsignin"),
            username_field: id("username"),
            password_field: id("passwordEdit"),
            sign_in_submit: id("signin"),
            demo_mode_entry: id("demoMode"),
            skip_onboarding: id("tv_skip_step1"),
            do_not_show_again: id("not_show_again"),
            refresh_icon: id("refresh_icon"),
            refresh_status: id("refreshdate"),
            battery_state_of_charge: id("pluginstatus"),
            charger_state: id("charge"),
            range_minimum: id("minval"),
            range_maximum: id("maxval"),
            interior_temperature_range: id("interiortemp"),
            level_two_charger_eta: id("standard_value"),
        }
    }

    /// Onboarding controls in the order they must be dismissed.
    pub fn onboarding_sequence(&self) -> [&ElementLocator; 2] {
        [&self.skip_onboarding, &self.do_not_show_again]
    }

    /// Locator of the control holding `field`.
    ///
    /// The refresh date is read from the refresh-status text.
    pub fn locator_for(&self, field: StatusField) -> &ElementLocator {
        match field {
            StatusField::LastRefreshDate => &self.refresh_status,
            StatusField::BatteryStateOfCharge => &self.battery_state_of_charge,
            StatusField::ChargerState => &self.charger_state,
            StatusField::RangeMinimum => &self.range_minimum,
            StatusField::RangeMaximum => &self.range_maximum,
            StatusField::InteriorTemperatureRange => &self.interior_temperature_range,
            StatusField::LevelTwoChargerEta => &self.level_two_charger_eta,
        }
    }
}
