//! Trait abstraction over a UI-automation session.
//!
//! This module provides the [`UiDriver`] trait that abstracts over a live
//! WebDriver/Appium session and the scripted mock used in tests.

use core::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use evscrape_types::ElementLocator;

use crate::error::Result;

/// Opaque handle to an element found in the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(pub String);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application lifecycle state, as reported by the automation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    NotInstalled,
    NotRunning,
    BackgroundSuspended,
    Background,
    Foreground,
}

impl AppState {
    /// Map the backend's numeric state code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NotInstalled),
            1 => Some(Self::NotRunning),
            2 => Some(Self::BackgroundSuspended),
            3 => Some(Self::Background),
            4 => Some(Self::Foreground),
            _ => None,
        }
    }

    pub fn is_foreground(self) -> bool {
        self == Self::Foreground
    }
}

/// Operations on one live automation session.
///
/// Lookups are single attempts: waiting is the caller's business, through
/// [`crate::poll`]. A miss is reported as an error for which
/// [`crate::Error::is_no_such_element`] is true.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Find a control by resource id.
    async fn find_element(&self, locator: &ElementLocator) -> Result<ElementId>;

    /// Tap a control.
    async fn click(&self, element: &ElementId) -> Result<()>;

    /// Type text into a control.
    async fn send_keys(&self, element: &ElementId, text: &str) -> Result<()>;

    /// Read a control's visible text.
    async fn element_text(&self, element: &ElementId) -> Result<String>;

    /// Query the lifecycle state of an installed app.
    async fn app_state(&self, app_id: &str) -> Result<AppState>;

    /// Bring an app to the foreground.
    async fn activate_app(&self, app_id: &str) -> Result<()>;

    /// Capture the current screen as PNG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the session. Called exactly once per session.
    async fn quit(&self) -> Result<()>;
}

#[async_trait]
impl<T: UiDriver + ?Sized> UiDriver for Arc<T> {
    async fn find_element(&self, locator: &ElementLocator) -> Result<ElementId> {
        (**self).find_element(locator).await
    }

    async fn click(&self, element: &ElementId) -> Result<()> {
        (**self).click(element).await
    }

    async fn send_keys(&self, element: &ElementId, text: &str) -> Result<()> {
        (**self).send_keys(element, text).await
    }

    async fn element_text(&self, element: &ElementId) -> Result<String> {
        (**self).element_text(element).await
    }

    async fn app_state(&self, app_id: &str) -> Result<AppState> {
        (**self).app_state(app_id).await
    }

    async fn activate_app(&self, app_id: &str) -> Result<()> {
        (**self).activate_app(app_id).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        (**self).screenshot().await
    }

    async fn quit(&self) -> Result<()> {
        (**self).quit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_codes() {
        assert_eq!(AppState::from_code(4), Some(AppState::Foreground));
        assert_eq!(AppState::from_code(3), Some(AppState::Background));
        assert_eq!(AppState::from_code(0), Some(AppState::NotInstalled));
        assert_eq!(AppState::from_code(9), None);
        assert!(AppState::Foreground.is_foreground());
        assert!(!AppState::BackgroundSuspended.is_foreground());
    }
}
