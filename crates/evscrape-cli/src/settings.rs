//! Turning arguments and the config file into run settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use evscrape_core::{
    DEFAULT_IMPLICIT_WAIT, DEFAULT_PORT, DEFAULT_REFRESH_TIMEOUT, DEFAULT_SCREENSHOT_PATH,
    RunOptions, ScreenshotOptions, ServerOptions, SessionConfig, SourceZone, TimestampOptions,
    parse_timezone,
};
use evscrape_types::{LocatorTable, NavigationContext};

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, resolve, resolve_optional};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_AVD: &str = "Medium_Phone_API_35";

/// Fully resolved settings for one invocation.
#[derive(Debug)]
pub struct Settings {
    pub session: SessionConfig,
    pub server: ServerOptions,
    pub run: RunOptions,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let host = resolve(cli.host.clone(), config.host.clone(), DEFAULT_HOST.to_string());
        let port = resolve(cli.port, config.port, DEFAULT_PORT);

        let mut session = SessionConfig::new(&cli.app).endpoint(host.clone(), port);
        // A device serial means the device is already up; only boot an AVD otherwise.
        match resolve_optional(cli.udid.clone(), config.udid.clone()) {
            Some(udid) => session = session.udid(udid),
            None => {
                session = session.avd(resolve(
                    cli.avd.clone(),
                    config.avd.clone(),
                    DEFAULT_AVD.to_string(),
                ))
            }
        }

        let server = ServerOptions {
            host,
            port,
            external: cli.external_server || config.external_server,
            ..Default::default()
        };

        let (context, fallback) =
            NavigationContext::resolve(cli.user_id.as_deref(), cli.password.as_deref(), cli.demo);
        if let Some(reason) = fallback {
            warn!("{}, entering demo mode", reason);
        }

        let mut run = RunOptions::new(context);
        if let Some(package) = resolve_optional(cli.app_package.as_deref(), config.app_package.as_deref()) {
            run.locators = LocatorTable::for_package(package);
        }
        run.implicit_wait = Duration::from_secs(resolve(
            cli.implicit_wait,
            config.implicit_wait,
            DEFAULT_IMPLICIT_WAIT.as_secs(),
        ));
        run.refresh_timeout = Duration::from_secs(resolve(
            cli.refresh_timeout,
            config.refresh_timeout,
            DEFAULT_REFRESH_TIMEOUT.as_secs(),
        ));
        run.trigger_refresh = cli.trigger_refresh;
        run.timestamp = timestamp_options(cli, config)?;
        run.screenshot = if cli.no_screenshot {
            None
        } else {
            Some(ScreenshotOptions {
                path: resolve(
                    cli.screenshot.clone(),
                    config.screenshot.clone(),
                    PathBuf::from(DEFAULT_SCREENSHOT_PATH),
                ),
                ..Default::default()
            })
        };

        debug!("Resolved settings: {:?}", run);
        Ok(Self {
            session,
            server,
            run,
            format: cli.format,
            output: cli.output.clone(),
        })
    }
}

/// Zone names are checked here, before any device work starts.
fn timestamp_options(cli: &Cli, config: &Config) -> Result<TimestampOptions> {
    let source = match resolve_optional(cli.device_timezone.as_deref(), config.device_timezone.as_deref()) {
        Some(name) => SourceZone::Named(parse_timezone(name).context("Invalid device time zone")?),
        None => SourceZone::Local,
    };
    let target = resolve_optional(cli.timezone.as_deref(), config.timezone.as_deref())
        .map(|name| parse_timezone(name).context("Invalid output time zone"))
        .transpose()?;

    Ok(TimestampOptions { source, target })
}
