//! Appium-driven status scraping for an EV companion app.
//!
//! This crate drives the vendor's Android app through a W3C WebDriver
//! (Appium) session, walks it to the vehicle status screen, waits for the
//! in-app refresh, and reads the status fields into a
//! [`VehicleStatusRecord`](evscrape_types::VehicleStatusRecord).
//!
//! # Features
//!
//! - **Session bootstrap**: spawn or attach to an Appium server and create a
//!   UiAutomator2 session for the app binary
//! - **Navigation**: credentialed sign-in or demo mode, onboarding dismissal,
//!   one-shot recovery when the OS backgrounds the app
//! - **Extraction**: bounded polling for the refresh, timestamp normalisation
//!   with optional time zone conversion
//! - **Guaranteed teardown**: sessions are ended exactly once on every path
//! - **Testing**: a scripted [`MockDriver`] stands in for a real device
//!
//! # Waiting
//!
//! The server-side implicit wait is disabled. Every wait is an explicit
//! [`poll_until`] with its own cadence and deadline:
//!
//! | Wait | Cadence | Default deadline | Expiry |
//! |------|---------|------------------|--------|
//! | Element lookup | 500 ms | 60 s | [`Error::ElementNotFound`] |
//! | Refresh completion | 1 s | 30 s | [`Error::RefreshTimeout`] |
//! | Server readiness | 250 ms | 10 s | [`Error::ServerUnavailable`] |
//!
//! # Quick Start
//!
//! ```no_run
//! use evscrape_core::{RunOptions, ServerOptions, SessionConfig, bootstrap_and_run};
//! use evscrape_types::NavigationContext;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionConfig::new("/apks/nissan.apk").avd("Medium_Phone_API_35");
//!     let options = RunOptions::new(NavigationContext::Demo);
//!
//!     let record = bootstrap_and_run(&session, &ServerOptions::default(), &options).await?;
//!     print!("{}", record);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod extract;
pub mod guard;
pub mod mock;
pub mod navigation;
pub mod poll;
pub mod runner;
pub mod server;
pub mod timestamp;
pub mod traits;
pub mod webdriver;

pub use error::{Error, ErrorKind, Result};
pub use extract::{DEFAULT_REFRESH_TIMEOUT, ExtractOptions, REFRESH_SENTINEL, StatusExtractor};
pub use guard::SessionGuard;
pub use mock::{MockDriver, MockDriverBuilder, MockEvent};
pub use navigation::Navigator;
pub use poll::{PollConfig, poll_until};
pub use runner::{
    DEFAULT_SCREENSHOT_DELAY, DEFAULT_SCREENSHOT_PATH, RunOptions, ScreenshotOptions,
    bootstrap_and_run, run,
};
pub use server::{AppiumServer, DEFAULT_STARTUP_TIMEOUT, ServerOptions};
pub use timestamp::{
    SourceZone, TimestampOptions, parse_refresh_text, parse_timezone, render_refresh_text,
};
pub use traits::{AppState, ElementId, UiDriver};
pub use webdriver::{DEFAULT_IMPLICIT_WAIT, DEFAULT_PORT, SessionConfig, WebDriverSession};

// Re-export types for convenience
pub use evscrape_types;
pub use evscrape_types::{LocatorTable, NavigationContext, StatusField, VehicleStatusRecord};
