//! Session guard for guaranteed teardown.
//!
//! This module provides RAII-style ownership of an automation session,
//! ensuring the session is ended exactly once whichever way a run exits.

use std::ops::Deref;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::traits::UiDriver;

/// Owns a session and ends it exactly once.
///
/// Prefer [`SessionGuard::release`], which awaits the teardown. If the guard
/// is dropped unreleased (a panic, an early return that skipped release),
/// the quit is spawned on the current tokio runtime instead.
///
/// # Example
///
/// ```ignore
/// use evscrape_core::{SessionGuard, WebDriverSession};
///
/// let session = WebDriverSession::create(&config).await?;
/// let guard = SessionGuard::new(session);
/// let result = do_work(&*guard).await;
/// guard.release().await;
/// ```
pub struct SessionGuard<D: UiDriver + 'static> {
    driver: Option<D>,
}

impl<D: UiDriver + 'static> SessionGuard<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    /// End the session now.
    ///
    /// Teardown failures are logged, not returned: they must never mask the
    /// outcome of the run.
    pub async fn release(mut self) {
        if let Some(driver) = self.driver.take() {
            match driver.quit().await {
                Ok(()) => debug!("Session released"),
                Err(e) => warn!("Failed to end automation session: {}", e),
            }
        }
    }

    /// Get a reference to the session.
    pub fn driver(&self) -> &D {
        // Only `release` and `drop` take the driver, and both consume the guard.
        match &self.driver {
            Some(driver) => driver,
            None => unreachable!("session guard used after release"),
        }
    }
}

impl<D: UiDriver + 'static> Deref for SessionGuard<D> {
    type Target = D;

    fn deref(&self) -> &Self::Target {
        self.driver()
    }
}

impl<D: UiDriver + 'static> Drop for SessionGuard<D> {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            if let Ok(handle) = Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = driver.quit().await {
                        warn!("Failed to end automation session in guard drop: {}", e);
                    }
                });
            } else {
                warn!("No tokio runtime available to end automation session in guard drop");
            }
        }
    }
}
