//! Reading the vehicle status screen.
//!
//! Field values are only read once the in-app refresh has finished, so a
//! record never carries placeholder values.

use std::time::Duration;

use tracing::{debug, info};

use evscrape_types::{LocatorTable, StatusField, VehicleStatusRecord};

use crate::error::{Error, Result};
use crate::navigation::Navigator;
use crate::poll::{PollConfig, poll_until};
use crate::timestamp::{TimestampOptions, render_refresh_text};
use crate::traits::UiDriver;

/// Text shown in the refresh-status field while a refresh is running.
pub const REFRESH_SENTINEL: &str = "Please wait...";

/// Default deadline for the in-app refresh.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Lookup policy for each field's control.
    pub implicit_wait: Duration,
    /// How long the refresh may stay on [`REFRESH_SENTINEL`].
    pub refresh_timeout: Duration,
    /// Tap the refresh icon before waiting.
    pub trigger_refresh: bool,
    pub timestamp: TimestampOptions,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            implicit_wait: crate::webdriver::DEFAULT_IMPLICIT_WAIT,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            trigger_refresh: false,
            timestamp: TimestampOptions::default(),
        }
    }
}

/// Builds a [`VehicleStatusRecord`] from the status screen.
pub struct StatusExtractor<'a, D: UiDriver + ?Sized> {
    driver: &'a D,
    locators: &'a LocatorTable,
    options: ExtractOptions,
}

impl<'a, D: UiDriver + ?Sized> StatusExtractor<'a, D> {
    pub fn new(driver: &'a D, locators: &'a LocatorTable, options: ExtractOptions) -> Self {
        Self {
            driver,
            locators,
            options,
        }
    }

    fn lookup(&self) -> Navigator<'a, D> {
        Navigator::new(
            self.driver,
            self.locators,
            PollConfig::implicit_wait(self.options.implicit_wait),
        )
    }

    /// Poll the refresh status once per second until it leaves the
    /// sentinel, returning the settled text.
    pub async fn wait_for_refresh(&self) -> Result<String> {
        let element = self.lookup().wait_for(&self.locators.refresh_status).await?;
        let driver = self.driver;
        let element = &element;
        let config = PollConfig::refresh(self.options.refresh_timeout);

        let settled = poll_until(&config, "refresh", || async move {
            let text = driver.element_text(element).await?;
            if text.trim() == REFRESH_SENTINEL {
                Ok(None)
            } else {
                Ok(Some(text))
            }
        })
        .await;

        match settled {
            Ok(text) => {
                info!("Refresh complete: {}", text);
                Ok(text)
            }
            Err(Error::Timeout { duration, .. }) => Err(Error::RefreshTimeout { waited: duration }),
            Err(e) => Err(e),
        }
    }

    /// Read one field's control verbatim.
    pub async fn read_field(&self, field: StatusField) -> Result<String> {
        let locator = self.locators.locator_for(field);
        let element = self.lookup().wait_for(locator).await?;
        let text = self.driver.element_text(&element).await?;
        debug!("{} = {}", field, text);
        Ok(text)
    }

    /// Wait for the refresh, then read every field.
    pub async fn extract(&self) -> Result<VehicleStatusRecord> {
        if self.options.trigger_refresh {
            let icon = self.lookup().wait_for(&self.locators.refresh_icon).await?;
            info!("Requesting a vehicle refresh");
            self.driver.click(&icon).await?;
        }

        let raw = self.wait_for_refresh().await?;
        let last_refresh = render_refresh_text(&raw, &self.options.timestamp)?;

        let mut values = Vec::with_capacity(StatusField::ALL.len());
        values.push((StatusField::LastRefreshDate, last_refresh));
        for field in StatusField::ALL
            .into_iter()
            .filter(|f| *f != StatusField::LastRefreshDate)
        {
            values.push((field, self.read_field(field).await?));
        }

        Ok(VehicleStatusRecord::from_pairs(values)?)
    }
}
