//! Appium server process management.
//!
//! A run either spawns its own `appium` process or attaches to one that is
//! already listening. In both cases the server must answer `GET /status`
//! before a session is requested.

use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::poll::{PollConfig, poll_until};

/// How long a freshly spawned server gets to start answering.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the automation server lives and whether to launch it.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Path prefix of the WebDriver API.
    pub base_path: String,
    /// Attach to an already running server instead of spawning one.
    pub external: bool,
    /// Executable to spawn.
    pub program: String,
    pub startup_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: crate::webdriver::DEFAULT_PORT,
            base_path: String::new(),
            external: false,
            program: "appium".to_string(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }
}

impl ServerOptions {
    pub fn status_url(&self) -> String {
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            format!("http://{}:{}/status", self.host, self.port)
        } else {
            format!("http://{}:{}/{}/status", self.host, self.port, path)
        }
    }

    /// Arguments passed to the server executable.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--address".to_string(),
            self.host.clone(),
            "-p".to_string(),
            self.port.to_string(),
        ];
        let path = self.base_path.trim_matches('/');
        if !path.is_empty() {
            args.push("--base-path".to_string());
            args.push(format!("/{}", path));
        }
        args
    }
}

/// A running (or attached) automation server.
///
/// A spawned child is killed when this value is dropped; call
/// [`AppiumServer::stop`] to also wait for it to exit.
#[derive(Debug)]
pub struct AppiumServer {
    child: Option<Child>,
    status_url: String,
}

impl AppiumServer {
    /// Spawn or attach to the server and wait until it answers.
    pub async fn start(options: &ServerOptions) -> Result<Self> {
        let status_url = options.status_url();

        let mut child = if options.external {
            info!("Using external automation server at {}", status_url);
            None
        } else {
            info!(
                "Starting {} on {}:{}",
                options.program, options.host, options.port
            );
            let child = Command::new(&options.program)
                .args(options.args())
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| Error::ServerUnavailable {
                    url: status_url.clone(),
                    reason: format!("failed to spawn '{}': {}", options.program, e),
                })?;
            Some(child)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(Error::Http)?;
        let config = PollConfig::server_startup(options.startup_timeout);

        let client = &client;
        let url = &status_url;
        let spawned = &mut child;
        let ready = poll_until(&config, "server_ready", move || {
            let exited = spawned
                .as_mut()
                .and_then(|c| c.try_wait().ok().flatten());
            async move {
                let status_url = url;
                if let Some(status) = exited {
                    return Err(Error::ServerUnavailable {
                        url: status_url.clone(),
                        reason: format!("server exited during startup ({})", status),
                    });
                }
                match client.get(status_url).send().await {
                    Ok(resp) if resp.status().is_success() => Ok(Some(())),
                    Ok(resp) => {
                        debug!("Server not ready: HTTP {}", resp.status());
                        Ok(None)
                    }
                    Err(e) => {
                        debug!("Server not ready: {}", e);
                        Ok(None)
                    }
                }
            }
        })
        .await;

        match ready {
            Ok(()) => {
                info!("Automation server ready");
                Ok(Self { child, status_url })
            }
            Err(Error::Timeout { duration, .. }) => Err(Error::ServerUnavailable {
                url: status_url,
                reason: format!("no answer within {:?}", duration),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    /// Whether this process spawned the server.
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    /// Stop a spawned server and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!("Failed to stop automation server: {}", e);
            } else {
                info!("Automation server stopped");
            }
        }
    }
}
