//! Mock automation session for testing.
//!
//! This module provides a scripted, in-memory [`UiDriver`] so navigation and
//! extraction can be exercised without an emulator or an Appium server.
//!
//! # Features
//!
//! - **Scripted texts**: each control yields a sequence of texts; the last
//!   one repeats, which models a refresh that settles
//! - **Missing or late controls**: never found, or found after N misses
//! - **App lifecycle**: a scripted sequence of app states for recovery tests
//! - **Journal**: every call is recorded for ordering assertions

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use evscrape_types::{ElementLocator, LocatorTable, StatusField};

use crate::error::{Error, Result};
use crate::traits::{AppState, ElementId, UiDriver};

/// One call made against a [`MockDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Find(String),
    Click(String),
    Type(String, String),
    ReadText(String),
    QueryAppState(String),
    ActivateApp(String),
    Screenshot,
    Quit,
}

/// A scripted automation session.
///
/// Element ids handed out by the mock are the locator strings themselves.
///
/// # Example
///
/// ```
/// use evscrape_core::{MockDriver, UiDriver};
/// use evscrape_types::ElementLocator;
///
/// #[tokio::main]
/// async fn main() {
///     let loc = ElementLocator::new("pkg:id/charge");
///     let driver = MockDriver::builder().text(&loc, "UNPLUGGED...").build();
///     let el = driver.find_element(&loc).await.unwrap();
///     assert_eq!(driver.element_text(&el).await.unwrap(), "UNPLUGGED...");
/// }
/// ```
#[derive(Debug)]
pub struct MockDriver {
    texts: Mutex<HashMap<String, VecDeque<String>>>,
    missing: HashSet<String>,
    late: Mutex<HashMap<String, u32>>,
    app_states: Mutex<VecDeque<AppState>>,
    activate_restores_foreground: bool,
    fail_quit: bool,
    journal: Mutex<Vec<MockEvent>>,
    quit_count: AtomicU32,
    screenshot_count: AtomicU32,
}

impl MockDriver {
    pub fn builder() -> MockDriverBuilder {
        MockDriverBuilder::default()
    }

    /// A session showing the app's demo vehicle.
    ///
    /// The refresh status reads `Please wait...` twice, then settles on
    /// `UPDATED MAR 05, 2025, 06:31 AM`.
    pub fn demo_screen(locators: &LocatorTable) -> MockDriverBuilder {
        MockDriver::builder()
            .texts(
                &locators.refresh_status,
                ["Please wait...", "Please wait...", "UPDATED MAR 05, 2025, 06:31 AM"],
            )
            .field(locators, StatusField::BatteryStateOfCharge, "57")
            .field(locators, StatusField::ChargerState, "UNPLUGGED...")
            .field(locators, StatusField::RangeMinimum, "88")
            .field(locators, StatusField::RangeMaximum, "104")
            .field(locators, StatusField::InteriorTemperatureRange, "62-68°F")
            .field(locators, StatusField::LevelTwoChargerEta, "5h:30m")
    }

    fn record(&self, event: MockEvent) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.push(event);
        }
    }

    /// Every call made so far, in order.
    pub fn journal(&self) -> Vec<MockEvent> {
        self.journal.lock().map(|j| j.clone()).unwrap_or_default()
    }

    /// Locators that were clicked, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Click(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// `(locator, text)` pairs typed, in order.
    pub fn typed(&self) -> Vec<(String, String)> {
        self.journal()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Type(id, text) => Some((id, text)),
                _ => None,
            })
            .collect()
    }

    /// Whether any call touched `locator`.
    pub fn touched(&self, locator: &ElementLocator) -> bool {
        self.journal().iter().any(|e| match e {
            MockEvent::Find(id)
            | MockEvent::Click(id)
            | MockEvent::Type(id, _)
            | MockEvent::ReadText(id) => id == locator.as_str(),
            _ => false,
        })
    }

    /// How many times `locator`'s text was read.
    pub fn reads_of(&self, locator: &ElementLocator) -> usize {
        self.journal()
            .iter()
            .filter(|e| matches!(e, MockEvent::ReadText(id) if id == locator.as_str()))
            .count()
    }

    pub fn activations(&self) -> usize {
        self.journal()
            .iter()
            .filter(|e| matches!(e, MockEvent::ActivateApp(_)))
            .count()
    }

    pub fn quit_count(&self) -> u32 {
        self.quit_count.load(Ordering::SeqCst)
    }

    pub fn screenshot_count(&self) -> u32 {
        self.screenshot_count.load(Ordering::SeqCst)
    }

    fn next_app_state(&self) -> AppState {
        let Ok(mut states) = self.app_states.lock() else {
            return AppState::Foreground;
        };
        if states.len() > 1 {
            states.pop_front().unwrap_or(AppState::Foreground)
        } else {
            states.front().copied().unwrap_or(AppState::Foreground)
        }
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    async fn find_element(&self, locator: &ElementLocator) -> Result<ElementId> {
        self.record(MockEvent::Find(locator.as_str().to_string()));

        if self.missing.contains(locator.as_str()) {
            return Err(Error::webdriver("find_element", "no such element", locator.as_str()));
        }
        if let Ok(mut late) = self.late.lock() {
            if let Some(remaining) = late.get_mut(locator.as_str()) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Error::webdriver(
                        "find_element",
                        "no such element",
                        locator.as_str(),
                    ));
                }
            }
        }
        Ok(ElementId(locator.as_str().to_string()))
    }

    async fn click(&self, element: &ElementId) -> Result<()> {
        self.record(MockEvent::Click(element.0.clone()));
        Ok(())
    }

    async fn send_keys(&self, element: &ElementId, text: &str) -> Result<()> {
        self.record(MockEvent::Type(element.0.clone(), text.to_string()));
        Ok(())
    }

    async fn element_text(&self, element: &ElementId) -> Result<String> {
        self.record(MockEvent::ReadText(element.0.clone()));
        let mut texts = self
            .texts
            .lock()
            .map_err(|_| Error::webdriver("element_text", "unknown error", "mock poisoned"))?;
        let queue = texts.entry(element.0.clone()).or_default();
        let text = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(text.unwrap_or_default())
    }

    async fn app_state(&self, app_id: &str) -> Result<AppState> {
        self.record(MockEvent::QueryAppState(app_id.to_string()));
        Ok(self.next_app_state())
    }

    async fn activate_app(&self, app_id: &str) -> Result<()> {
        self.record(MockEvent::ActivateApp(app_id.to_string()));
        if self.activate_restores_foreground {
            if let Ok(mut states) = self.app_states.lock() {
                states.clear();
                states.push_back(AppState::Foreground);
            }
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record(MockEvent::Screenshot);
        self.screenshot_count.fetch_add(1, Ordering::SeqCst);
        // PNG signature, enough for callers that only persist the bytes.
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn quit(&self) -> Result<()> {
        self.record(MockEvent::Quit);
        self.quit_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_quit {
            return Err(Error::webdriver("delete_session", "unknown error", "mock quit failure"));
        }
        Ok(())
    }
}

/// Builder for [`MockDriver`].
#[derive(Debug)]
pub struct MockDriverBuilder {
    texts: HashMap<String, VecDeque<String>>,
    missing: HashSet<String>,
    late: HashMap<String, u32>,
    app_states: VecDeque<AppState>,
    activate_restores_foreground: bool,
    fail_quit: bool,
}

impl Default for MockDriverBuilder {
    fn default() -> Self {
        Self {
            texts: HashMap::new(),
            missing: HashSet::new(),
            late: HashMap::new(),
            app_states: VecDeque::from([AppState::Foreground]),
            activate_restores_foreground: true,
            fail_quit: false,
        }
    }
}

impl MockDriverBuilder {
    /// Fixed text for a control.
    #[must_use]
    pub fn text(self, locator: &ElementLocator, text: &str) -> Self {
        self.texts(locator, [text])
    }

    /// Texts returned by successive reads; the last one repeats.
    #[must_use]
    pub fn texts<I, S>(mut self, locator: &ElementLocator, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.texts.insert(
            locator.as_str().to_string(),
            texts.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Fixed text for a record field's control.
    #[must_use]
    pub fn field(self, locators: &LocatorTable, field: StatusField, text: &str) -> Self {
        let locator = locators.locator_for(field).clone();
        self.text(&locator, text)
    }

    /// The control is never found.
    #[must_use]
    pub fn missing(mut self, locator: &ElementLocator) -> Self {
        self.missing.insert(locator.as_str().to_string());
        self
    }

    /// The control is found only after `misses` failed lookups.
    #[must_use]
    pub fn appears_after(mut self, locator: &ElementLocator, misses: u32) -> Self {
        self.late.insert(locator.as_str().to_string(), misses);
        self
    }

    /// App states returned by successive queries; the last one repeats.
    #[must_use]
    pub fn app_states<I: IntoIterator<Item = AppState>>(mut self, states: I) -> Self {
        self.app_states = states.into_iter().collect();
        self
    }

    /// Whether activating the app makes it report foreground (default true).
    #[must_use]
    pub fn activate_restores_foreground(mut self, restores: bool) -> Self {
        self.activate_restores_foreground = restores;
        self
    }

    /// Make `quit` report a failure (it is still counted).
    #[must_use]
    pub fn fail_quit(mut self, fail: bool) -> Self {
        self.fail_quit = fail;
        self
    }

    pub fn build(self) -> MockDriver {
        MockDriver {
            texts: Mutex::new(self.texts),
            missing: self.missing,
            late: Mutex::new(self.late),
            app_states: Mutex::new(self.app_states),
            activate_restores_foreground: self.activate_restores_foreground,
            fail_quit: self.fail_quit,
            journal: Mutex::new(Vec::new()),
            quit_count: AtomicU32::new(0),
            screenshot_count: AtomicU32::new(0),
        }
    }
}
