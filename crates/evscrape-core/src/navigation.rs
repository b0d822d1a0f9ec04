//! Navigation from the logged-out screen to the vehicle status screen.
//!
//! The path is fixed for one app version:
//!
//! 1. Enter, either by signing in or through demo mode.
//! 2. Dismiss the two onboarding interstitials, skip first.
//! 3. If the OS pushed the app to the background meanwhile, bring it back
//!    and repeat 1 and 2 once.
//!
//! Every lookup waits with the implicit-wait policy; a control that never
//! appears is fatal.

use tracing::{debug, info, warn};

use evscrape_types::{ElementLocator, LocatorTable, NavigationContext};

use crate::error::{Error, Result};
use crate::poll::{PollConfig, poll_until};
use crate::traits::{ElementId, UiDriver};

/// Walks one session through the app's entry screens.
pub struct Navigator<'a, D: UiDriver + ?Sized> {
    driver: &'a D,
    locators: &'a LocatorTable,
    wait: PollConfig,
}

impl<'a, D: UiDriver + ?Sized> Navigator<'a, D> {
    /// `wait` is the lookup policy, usually [`PollConfig::implicit_wait`].
    pub fn new(driver: &'a D, locators: &'a LocatorTable, wait: PollConfig) -> Self {
        Self {
            driver,
            locators,
            wait,
        }
    }

    /// Wait for a control to appear.
    pub async fn wait_for(&self, locator: &ElementLocator) -> Result<ElementId> {
        let driver = self.driver;
        let found = poll_until(&self.wait, "find_element", || async move {
            match driver.find_element(locator).await {
                Ok(element) => Ok(Some(element)),
                Err(e) if e.is_no_such_element() => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await;

        match found {
            Err(Error::Timeout { duration, .. }) => Err(Error::ElementNotFound {
                locator: locator.clone(),
                waited: duration,
            }),
            other => other,
        }
    }

    async fn tap(&self, locator: &ElementLocator) -> Result<()> {
        let element = self.wait_for(locator).await?;
        debug!("Tapping {}", locator);
        self.driver.click(&element).await
    }

    async fn type_into(&self, locator: &ElementLocator, text: &str) -> Result<()> {
        let element = self.wait_for(locator).await?;
        self.driver.send_keys(&element, text).await
    }

    /// Leave the logged-out screen through the context's entry path.
    pub async fn enter(&self, context: &NavigationContext) -> Result<()> {
        let locators = self.locators;
        match context {
            NavigationContext::Credentialed { user_id, password } => {
                info!("Signing in");
                self.tap(&locators.sign_in_entry).await?;
                self.type_into(&locators.username_field, user_id).await?;
                self.type_into(&locators.password_field, password).await?;
                self.tap(&locators.sign_in_submit).await?;
            }
            NavigationContext::Demo => {
                info!("Entering demo mode");
                self.tap(&locators.demo_mode_entry).await?;
            }
        }
        Ok(())
    }

    /// Dismiss the onboarding interstitials, in order.
    pub async fn dismiss_onboarding(&self) -> Result<()> {
        for locator in self.locators.onboarding_sequence() {
            self.tap(locator).await?;
        }
        debug!("Onboarding dismissed");
        Ok(())
    }

    /// Run the full entry sequence.
    pub async fn navigate(&self, context: &NavigationContext) -> Result<()> {
        self.enter(context).await?;
        self.dismiss_onboarding().await
    }

    /// Bring the app back and re-navigate if it is not in the foreground.
    ///
    /// Returns whether recovery ran. Callers invoke this once per session;
    /// it does not retry itself.
    pub async fn recover_if_backgrounded(&self, context: &NavigationContext) -> Result<bool> {
        let app_id = self.locators.app_package.as_str();
        let state = self.driver.app_state(app_id).await?;
        if state.is_foreground() {
            return Ok(false);
        }

        warn!("App is {:?}, bringing it back to the foreground", state);
        self.driver.activate_app(app_id).await?;
        self.navigate(context).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockEvent};
    use crate::traits::AppState;
    use std::time::Duration;

    fn wait() -> PollConfig {
        PollConfig::implicit_wait(Duration::from_secs(60))
    }

    fn credentials() -> NavigationContext {
        NavigationContext::Credentialed {
            user_id: "driver@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_demo_path_never_touches_sign_in() {
        let locators = LocatorTable::default();
        let driver = MockDriver::builder().build();
        let navigator = Navigator::new(&driver, &locators, wait());

        navigator.navigate(&NavigationContext::Demo).await.unwrap();

        assert_eq!(
            driver.clicks(),
            vec![
                locators.demo_mode_entry.to_string(),
                locators.skip_onboarding.to_string(),
                locators.do_not_show_again.to_string(),
            ]
        );
        for locator in [
            &locators.sign_in_entry,
            &locators.username_field,
            &locators.password_field,
            &locators.sign_in_submit,
        ] {
            assert!(!driver.touched(locator), "{} was touched", locator);
        }
        assert!(driver.typed().is_empty());
    }

    #[tokio::test]
    async fn test_credentialed_path_order() {
        let locators = LocatorTable::default();
        let driver = MockDriver::builder().build();
        let navigator = Navigator::new(&driver, &locators, wait());

        navigator.navigate(&credentials()).await.unwrap();

        assert_eq!(
            driver.clicks(),
            vec![
                locators.sign_in_entry.to_string(),
                locators.sign_in_submit.to_string(),
                locators.skip_onboarding.to_string(),
                locators.do_not_show_again.to_string(),
            ]
        );
        assert_eq!(
            driver.typed(),
            vec![
                (locators.username_field.to_string(), "driver@example.com".to_string()),
                (locators.password_field.to_string(), "hunter2".to_string()),
            ]
        );
        assert!(!driver.touched(&locators.demo_mode_entry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_screen_is_waited_for() {
        let locators = LocatorTable::default();
        let driver = MockDriver::builder()
            .appears_after(&locators.skip_onboarding, 5)
            .build();
        let navigator = Navigator::new(&driver, &locators, wait());

        navigator.navigate(&NavigationContext::Demo).await.unwrap();
        assert_eq!(driver.clicks().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_interstitial_is_fatal() {
        let locators = LocatorTable::default();
        let driver = MockDriver::builder()
            .missing(&locators.do_not_show_again)
            .build();
        let navigator = Navigator::new(&driver, &locators, wait());

        let err = navigator.navigate(&NavigationContext::Demo).await.unwrap_err();
        match err {
            Error::ElementNotFound { locator, waited } => {
                assert_eq!(locator, locators.do_not_show_again);
                assert_eq!(waited, Duration::from_secs(60));
            }
            other => panic!("expected ElementNotFound, got {:?}", other),
        }
        // Skip was still tapped before the failure.
        assert_eq!(driver.clicks().len(), 2);
    }

    #[tokio::test]
    async fn test_no_recovery_in_foreground() {
        let locators = LocatorTable::default();
        let driver = MockDriver::builder().build();
        let navigator = Navigator::new(&driver, &locators, wait());

        let recovered = navigator
            .recover_if_backgrounded(&NavigationContext::Demo)
            .await
            .unwrap();
        assert!(!recovered);
        assert_eq!(driver.activations(), 0);
        assert!(driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_recovery_reactivates_and_renavigates() {
        let locators = LocatorTable::default();
        let driver = MockDriver::builder()
            .app_states([AppState::BackgroundSuspended])
            .build();
        let navigator = Navigator::new(&driver, &locators, wait());

        navigator.navigate(&NavigationContext::Demo).await.unwrap();
        let recovered = navigator
            .recover_if_backgrounded(&NavigationContext::Demo)
            .await
            .unwrap();

        assert!(recovered);
        assert_eq!(driver.activations(), 1);
        assert_eq!(driver.clicks().len(), 6);

        let journal = driver.journal();
        let activate = journal
            .iter()
            .position(|e| matches!(e, MockEvent::ActivateApp(_)))
            .unwrap();
        let query = journal
            .iter()
            .position(|e| matches!(e, MockEvent::QueryAppState(_)))
            .unwrap();
        assert!(query < activate);
        assert_eq!(
            journal[activate],
            MockEvent::ActivateApp(locators.app_package.clone())
        );
    }
}
