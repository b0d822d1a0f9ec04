//! CLI argument definitions using clap.

use std::path::{Path, PathBuf};

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};

/// Output format for the status record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `field-name=value` lines
    #[default]
    Text,
    /// One JSON object with hyphenated keys
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "evscrape")]
#[command(
    author,
    version,
    about = "Read EV status from the vendor companion app through Appium",
    long_about = None
)]
pub struct Cli {
    /// Application binary (APK) to install and launch
    #[arg(env = "NISSAN_CONNECT_APP_APK", value_parser = existing_file)]
    pub app: PathBuf,

    /// Account user ID for sign-in
    #[arg(short, long, env = "NISSAN_CONNECT_USER_ID")]
    pub user_id: Option<String>,

    /// Account password for sign-in
    #[arg(short, long, env = "NISSAN_CONNECT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Use the app's demo mode instead of signing in
    #[arg(
        short,
        long,
        env = "NISSAN_CONNECT_DEMO",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub demo: bool,

    /// Automation server host [default: localhost]
    #[arg(long, env = "APPIUM_SERVER_URL")]
    pub host: Option<String>,

    /// Automation server port [default: 4723]
    #[arg(long, env = "APPIUM_SERVER_PORT")]
    pub port: Option<u16>,

    /// Attach to an already running automation server
    #[arg(long)]
    pub external_server: bool,

    /// Emulator (AVD) to boot [default: Medium_Phone_API_35]
    #[arg(long)]
    pub avd: Option<String>,

    /// Serial of a connected device or running emulator
    #[arg(long)]
    pub udid: Option<String>,

    /// Application package the screen ids live under
    #[arg(long)]
    pub app_package: Option<String>,

    /// Convert the refresh time to this IANA time zone (e.g. America/New_York)
    #[arg(long, env = "EVSCRAPE_TIMEZONE")]
    pub timezone: Option<String>,

    /// Time zone the device shows wall-clock time in [default: host zone]
    #[arg(long)]
    pub device_timezone: Option<String>,

    /// Seconds each element lookup may wait [default: 60]
    #[arg(long)]
    pub implicit_wait: Option<u64>,

    /// Seconds the in-app refresh may take [default: 30]
    #[arg(long)]
    pub refresh_timeout: Option<u64>,

    /// Tap the refresh icon before reading
    #[arg(long)]
    pub trigger_refresh: bool,

    /// Where to save the failure screenshot [default: error_screenshot.png]
    #[arg(long, conflicts_with = "no_screenshot")]
    pub screenshot: Option<PathBuf>,

    /// Do not take a screenshot on failure
    #[arg(long)]
    pub no_screenshot: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file [default: <config dir>/evscrape/config.toml]
    #[arg(long, env = "EVSCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(format!("application binary not found: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_app_is_rejected() {
        let err = Cli::try_parse_from(["evscrape", "/nonexistent/app.apk"]).unwrap_err();
        assert!(err.to_string().contains("application binary not found"));
    }

    #[test]
    fn test_flags_parse() {
        let apk = tempfile::NamedTempFile::new().unwrap();
        let app = apk.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "evscrape",
            app,
            "--demo",
            "--port",
            "4800",
            "--timezone",
            "UTC",
            "--format",
            "json",
            "--no-screenshot",
        ])
        .unwrap();

        assert!(cli.demo);
        assert_eq!(cli.port, Some(4800));
        assert_eq!(cli.timezone.as_deref(), Some("UTC"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_screenshot);
        assert_eq!(cli.app, apk.path());
    }

    #[test]
    fn test_screenshot_flags_conflict() {
        let apk = tempfile::NamedTempFile::new().unwrap();
        let app = apk.path().to_str().unwrap();
        let result = Cli::try_parse_from([
            "evscrape",
            app,
            "--screenshot",
            "shot.png",
            "--no-screenshot",
        ]);
        assert!(result.is_err());
    }
}
