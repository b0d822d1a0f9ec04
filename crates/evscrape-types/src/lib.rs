//! Platform-agnostic types for EV status scraping.
//!
//! This crate holds the data shared by the automation core and the CLI:
//! the vehicle status record, the fixed table of UI element locators, and
//! the navigation context that picks the app's entry path.
//!
//! # Example
//!
//! ```
//! use evscrape_types::{LocatorTable, StatusField};
//!
//! let locators = LocatorTable::default();
//! let battery = locators.locator_for(StatusField::BatteryStateOfCharge);
//! assert!(battery.as_str().ends_with(":id/pluginstatus"));
//! assert_eq!(StatusField::BatteryStateOfCharge.key(), "battery-state-of-charge");
//! ```

pub mod context;
pub mod error;
pub mod locator;
pub mod types;

pub use context::{FallbackReason, NavigationContext};
pub use error::{ParseError, ParseResult};
pub use locator::{DEFAULT_APP_PACKAGE, ElementLocator, LocatorTable};
pub use types::{StatusField, VehicleStatusRecord};
