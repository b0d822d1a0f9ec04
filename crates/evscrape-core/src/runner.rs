//! End-to-end run: navigate, recover, extract, tear down.
//!
//! [`run`] drives an existing session; [`bootstrap_and_run`] also brings up
//! the automation server and the session first. Either way the session is
//! ended exactly once, and a diagnostic screenshot is attempted for any
//! failure that happens while a session exists.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use evscrape_types::{LocatorTable, NavigationContext, VehicleStatusRecord};

use crate::error::{Error, Result};
use crate::extract::{DEFAULT_REFRESH_TIMEOUT, ExtractOptions, StatusExtractor};
use crate::guard::SessionGuard;
use crate::navigation::Navigator;
use crate::poll::PollConfig;
use crate::server::{AppiumServer, ServerOptions};
use crate::timestamp::TimestampOptions;
use crate::traits::UiDriver;
use crate::webdriver::{DEFAULT_IMPLICIT_WAIT, SessionConfig, WebDriverSession};

/// File written when no screenshot path is configured.
pub const DEFAULT_SCREENSHOT_PATH: &str = "error_screenshot.png";

/// Pause before the screenshot so an error dialog can finish rendering.
pub const DEFAULT_SCREENSHOT_DELAY: Duration = Duration::from_secs(2);

/// Where and when to capture the failure screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotOptions {
    pub path: PathBuf,
    pub delay: Duration,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SCREENSHOT_PATH),
            delay: DEFAULT_SCREENSHOT_DELAY,
        }
    }
}

/// Everything a run needs besides the session itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub context: NavigationContext,
    pub locators: LocatorTable,
    pub implicit_wait: Duration,
    pub refresh_timeout: Duration,
    pub trigger_refresh: bool,
    pub timestamp: TimestampOptions,
    /// `None` disables the failure screenshot.
    pub screenshot: Option<ScreenshotOptions>,
}

impl RunOptions {
    pub fn new(context: NavigationContext) -> Self {
        Self {
            context,
            locators: LocatorTable::default(),
            implicit_wait: DEFAULT_IMPLICIT_WAIT,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            trigger_refresh: false,
            timestamp: TimestampOptions::default(),
            screenshot: Some(ScreenshotOptions::default()),
        }
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            implicit_wait: self.implicit_wait,
            refresh_timeout: self.refresh_timeout,
            trigger_refresh: self.trigger_refresh,
            timestamp: self.timestamp,
        }
    }
}

async fn drive<D: UiDriver + ?Sized>(driver: &D, options: &RunOptions) -> Result<VehicleStatusRecord> {
    let navigator = Navigator::new(
        driver,
        &options.locators,
        PollConfig::implicit_wait(options.implicit_wait),
    );
    navigator.navigate(&options.context).await?;
    if navigator.recover_if_backgrounded(&options.context).await? {
        info!("Recovered from backgrounding");
    }

    StatusExtractor::new(driver, &options.locators, options.extract_options())
        .extract()
        .await
}

/// Best-effort: failures are logged and never replace the run's error.
async fn capture_screenshot<D: UiDriver + ?Sized>(driver: &D, options: &ScreenshotOptions) {
    sleep(options.delay).await;
    let bytes = match driver.screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not capture screenshot: {}", e);
            return;
        }
    };
    match tokio::fs::write(&options.path, &bytes).await {
        Ok(()) => info!("Screenshot saved to {}", options.path.display()),
        Err(e) => warn!(
            "Could not write screenshot to {}: {}",
            options.path.display(),
            e
        ),
    }
}

/// Drive `driver` to the status screen and read the record.
///
/// Takes ownership of the session and ends it before returning, whatever
/// the outcome.
pub async fn run<D: UiDriver + 'static>(driver: D, options: &RunOptions) -> Result<VehicleStatusRecord> {
    let guard = SessionGuard::new(driver);
    let result = drive(&*guard, options).await;

    if let Err(e) = &result {
        debug!("Run failed: {}", e);
        if let Some(screenshot) = options.screenshot.as_ref().filter(|_| e.wants_screenshot()) {
            capture_screenshot(&*guard, screenshot).await;
        }
    }

    guard.release().await;
    result
}

/// Start the server, create the session, then [`run`].
///
/// A server spawned here is stopped on every path.
pub async fn bootstrap_and_run(
    session: &SessionConfig,
    server: &ServerOptions,
    options: &RunOptions,
) -> Result<VehicleStatusRecord> {
    if !session.app.is_file() {
        return Err(Error::invalid_config(format!(
            "application binary not found: {}",
            session.app.display()
        )));
    }

    let server = AppiumServer::start(server).await?;
    debug!(
        "Automation server at {} (managed: {})",
        server.status_url(),
        server.is_managed()
    );
    let result = match WebDriverSession::create(session).await {
        Ok(driver) => run(driver, options).await,
        Err(e) => Err(e),
    };
    server.stop().await;
    result
}
