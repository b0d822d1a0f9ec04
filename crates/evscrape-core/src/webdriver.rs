//! W3C WebDriver client for an Appium automation backend.
//!
//! This module bootstraps a session against a running Appium server and
//! exposes it through the [`UiDriver`] trait.
//!
//! # Example
//!
//! ```no_run
//! use evscrape_core::webdriver::{SessionConfig, WebDriverSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new("/apks/app.apk").avd("Medium_Phone_API_35");
//! let session = WebDriverSession::create(&config).await?;
//! println!("Session {}", session.session_id());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use evscrape_types::ElementLocator;

use crate::error::{Error, Result};
use crate::traits::{AppState, ElementId, UiDriver};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Pre-W3C element reference key, still sent by some drivers.
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Default Appium server port.
pub const DEFAULT_PORT: u16 = 4723;

/// Default implicit wait applied to every element lookup.
pub const DEFAULT_IMPLICIT_WAIT: Duration = Duration::from_secs(60);

/// Installing and launching the app can take a while on a cold emulator.
const NEW_SESSION_TIMEOUT: Duration = Duration::from_secs(300);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Target device and application for a new session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub platform_name: String,
    pub automation_name: String,
    pub device_name: String,
    /// Emulator to boot, if any.
    pub avd: Option<String>,
    /// Physical device or running emulator serial, if any.
    pub udid: Option<String>,
    /// Application binary to install and launch.
    pub app: PathBuf,
    pub language: String,
    pub locale: String,
    pub host: String,
    pub port: u16,
    /// Path prefix of the WebDriver API (`/wd/hub` on Appium 1).
    pub base_path: String,
}

impl SessionConfig {
    /// Android/UiAutomator2 defaults for `app`, on `localhost:4723`.
    pub fn new(app: impl Into<PathBuf>) -> Self {
        Self {
            platform_name: "Android".to_string(),
            automation_name: "uiautomator2".to_string(),
            device_name: "Android".to_string(),
            avd: None,
            udid: None,
            app: app.into(),
            language: "en".to_string(),
            locale: "US".to_string(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            base_path: String::new(),
        }
    }

    #[must_use]
    pub fn avd(mut self, avd: impl Into<String>) -> Self {
        self.avd = Some(avd.into());
        self
    }

    #[must_use]
    pub fn udid(mut self, udid: impl Into<String>) -> Self {
        self.udid = Some(udid.into());
        self
    }

    #[must_use]
    pub fn endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Base URL of the WebDriver API, without trailing slash.
    pub fn server_url(&self) -> String {
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            format!("http://{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}/{}", self.host, self.port, path)
        }
    }

    /// Capability set sent as `alwaysMatch`.
    pub fn capabilities(&self) -> Value {
        let mut caps = json!({
            "platformName": self.platform_name,
            "appium:automationName": self.automation_name,
            "appium:deviceName": self.device_name,
            "appium:app": self.app.display().to_string(),
            "appium:language": self.language,
            "appium:locale": self.locale,
        });
        if let Some(map) = caps.as_object_mut() {
            if let Some(avd) = &self.avd {
                map.insert("appium:avd".to_string(), json!(avd));
            }
            if let Some(udid) = &self.udid {
                map.insert("appium:udid".to_string(), json!(udid));
            }
        }
        caps
    }
}

/// W3C error reply body.
#[derive(Debug, Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct NewSessionValue {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// A live Appium session.
#[derive(Debug)]
pub struct WebDriverSession {
    client: Client,
    server_url: String,
    session_id: String,
    closed: AtomicBool,
}

impl WebDriverSession {
    /// Create a session for `config`.
    ///
    /// The server-side implicit wait is set to zero: lookups are retried by
    /// the caller with [`crate::poll_until`], see [`DEFAULT_IMPLICIT_WAIT`].
    pub async fn create(config: &SessionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(Error::Http)?;
        Self::create_with_client(config, client).await
    }

    /// Create a session with a custom reqwest Client.
    pub async fn create_with_client(config: &SessionConfig, client: Client) -> Result<Self> {
        let server_url = config.server_url();
        let url = format!("{}/session", server_url);
        let body = json!({
            "capabilities": {
                "alwaysMatch": config.capabilities(),
                "firstMatch": [{}],
            }
        });

        info!("Creating session on {}", server_url);
        debug!("Capabilities: {}", body);

        let response = client
            .post(&url)
            .timeout(NEW_SESSION_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::ServerUnavailable {
                url: server_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = payload
                .get("value")
                .and_then(|v| serde_json::from_value::<ErrorValue>(v.clone()).ok())
                .map(|e| format!("{}: {}", e.error, e.message))
                .unwrap_or_else(|| status.to_string());
            return Err(Error::SessionCreation {
                status: status.as_u16(),
                message,
            });
        }

        let value = payload.get("value").cloned().unwrap_or(Value::Null);
        let NewSessionValue { session_id } =
            serde_json::from_value(value).map_err(|e| Error::SessionCreation {
                status: status.as_u16(),
                message: format!("malformed new-session reply: {}", e),
            })?;

        info!("Session {} created", session_id);
        let session = Self {
            client,
            server_url,
            session_id,
            closed: AtomicBool::new(false),
        };
        let configured: Result<Value> = session
            .command(Method::POST, "timeouts", Some(json!({ "implicit": 0 })), "set_timeouts")
            .await;
        if let Err(e) = configured {
            // The session exists server-side; end it before reporting.
            if let Err(quit_error) = session.quit().await {
                warn!("Failed to end half-created session {}: {}", session.session_id, quit_error);
            }
            return Err(e);
        }
        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    fn session_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/session/{}", self.server_url, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.server_url, self.session_id, path)
        }
    }

    /// Send one command and unwrap the `value` member of the reply.
    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        name: &str,
    ) -> Result<T> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }

        let url = self.session_url(path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(match serde_json::from_value::<ErrorValue>(value) {
                Ok(e) => Error::webdriver(name, e.error, e.message),
                Err(_) => Error::webdriver(name, "unknown error", status.to_string()),
            });
        }

        serde_json::from_value(value)
            .map_err(|e| Error::webdriver(name, "invalid reply", e.to_string()))
    }

    async fn execute(&self, script: &str, args: Value, name: &str) -> Result<Value> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": [args] })),
            name,
        )
        .await
    }
}

fn element_id_from(value: &Value) -> Option<ElementId> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(|id| ElementId(id.to_string()))
}

#[async_trait]
impl UiDriver for WebDriverSession {
    async fn find_element(&self, locator: &ElementLocator) -> Result<ElementId> {
        let value: Value = self
            .command(
                Method::POST,
                "element",
                Some(json!({ "using": "id", "value": locator.as_str() })),
                "find_element",
            )
            .await?;
        element_id_from(&value)
            .ok_or_else(|| Error::webdriver("find_element", "invalid reply", value.to_string()))
    }

    async fn click(&self, element: &ElementId) -> Result<()> {
        let _: Value = self
            .command(
                Method::POST,
                &format!("element/{}/click", element),
                Some(json!({})),
                "click",
            )
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementId, text: &str) -> Result<()> {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        let _: Value = self
            .command(
                Method::POST,
                &format!("element/{}/value", element),
                Some(json!({ "text": text, "value": chars })),
                "send_keys",
            )
            .await?;
        Ok(())
    }

    async fn element_text(&self, element: &ElementId) -> Result<String> {
        self.command(
            Method::GET,
            &format!("element/{}/text", element),
            None,
            "element_text",
        )
        .await
    }

    async fn app_state(&self, app_id: &str) -> Result<AppState> {
        let value = self
            .execute("mobile: queryAppState", json!({ "appId": app_id }), "query_app_state")
            .await?;
        value
            .as_i64()
            .and_then(AppState::from_code)
            .ok_or_else(|| Error::webdriver("query_app_state", "invalid reply", value.to_string()))
    }

    async fn activate_app(&self, app_id: &str) -> Result<()> {
        self.execute("mobile: activateApp", json!({ "appId": app_id }), "activate_app")
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let encoded: String = self
            .command(Method::GET, "screenshot", None, "screenshot")
            .await?;
        BASE64
            .decode(encoded.trim())
            .map_err(|e| Error::webdriver("screenshot", "invalid reply", e.to_string()))
    }

    async fn quit(&self) -> Result<()> {
        let _: Value = self
            .command(Method::DELETE, "", None, "delete_session")
            .await?;
        self.closed.store(true, Ordering::SeqCst);
        info!("Session {} closed", self.session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url() {
        let config = SessionConfig::new("app.apk");
        assert_eq!(config.server_url(), "http://localhost:4723");

        let config = config.endpoint("10.0.2.2", 4800).base_path("/wd/hub/");
        assert_eq!(config.server_url(), "http://10.0.2.2:4800/wd/hub");
    }

    #[test]
    fn test_capabilities() {
        let config = SessionConfig::new("/tmp/app.apk").avd("Medium_Phone_API_35");
        let caps = config.capabilities();
        assert_eq!(caps["platformName"], "Android");
        assert_eq!(caps["appium:automationName"], "uiautomator2");
        assert_eq!(caps["appium:app"], "/tmp/app.apk");
        assert_eq!(caps["appium:avd"], "Medium_Phone_API_35");
        assert_eq!(caps["appium:language"], "en");
        assert_eq!(caps["appium:locale"], "US");
        assert!(caps.get("appium:udid").is_none());
    }

    #[test]
    fn test_element_id_parsing() {
        let w3c = json!({ ELEMENT_KEY: "abc" });
        assert_eq!(element_id_from(&w3c), Some(ElementId("abc".to_string())));

        let legacy = json!({ "ELEMENT": "def" });
        assert_eq!(element_id_from(&legacy), Some(ElementId("def".to_string())));

        assert_eq!(element_id_from(&json!({})), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_backend_error() {
        // Port 9 (discard) is almost never served locally.
        let config = SessionConfig::new("a.apk").endpoint("127.0.0.1", 9);
        let err = WebDriverSession::create(&config).await.unwrap_err();
        assert!(matches!(err, Error::ServerUnavailable { .. }));
        assert!(!err.wants_screenshot());
    }
}
