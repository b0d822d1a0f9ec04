//! End-to-end tests against a real Appium server and Android emulator.
//!
//! These tests need `appium` on `PATH`, the UiAutomator2 driver, an AVD and
//! the vendor APK. Run them with:
//! ```
//! EVSCRAPE_APK=/path/to/app.apk cargo test --package evscrape-core --test emulator_tests -- --ignored --nocapture
//! ```
//!
//! Optional environment variables:
//! - `EVSCRAPE_AVD`: emulator to boot (default `Medium_Phone_API_35`)
//! - `EVSCRAPE_USER_ID` / `EVSCRAPE_PASSWORD`: account for the sign-in test

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use evscrape_core::{
    RunOptions, ServerOptions, SessionConfig, TimestampOptions, UiDriver, WebDriverSession,
    bootstrap_and_run, parse_timezone,
};
use evscrape_types::{NavigationContext, StatusField};

/// Get the APK path from the environment.
fn get_apk() -> PathBuf {
    env::var("EVSCRAPE_APK")
        .map(PathBuf::from)
        .expect("EVSCRAPE_APK must point at the vendor APK")
}

fn session_config() -> SessionConfig {
    let avd = env::var("EVSCRAPE_AVD").unwrap_or_else(|_| "Medium_Phone_API_35".to_string());
    SessionConfig::new(get_apk()).avd(avd)
}

#[tokio::test]
#[ignore = "requires an Android emulator and Appium"]
async fn test_demo_mode_end_to_end() {
    let options = RunOptions::new(NavigationContext::Demo);

    let record = bootstrap_and_run(&session_config(), &ServerOptions::default(), &options)
        .await
        .unwrap_or_else(|e| panic!("Demo run failed: {}", e));

    print!("{}", record);
    let battery: u32 = record
        .get(StatusField::BatteryStateOfCharge)
        .trim()
        .parse()
        .expect("battery should be a number");
    assert!(battery <= 100);
    assert!(record.charger_state().starts_with("UNPLUGGED"));
    for field in [StatusField::RangeMinimum, StatusField::RangeMaximum] {
        let range: u32 = record.get(field).trim().parse().expect("range should be a number");
        assert!(range <= 500);
    }
    assert!(record.interior_temperature_range().ends_with("°F"));
    assert!(record.level_two_charger_eta().contains("h:"));
}

#[tokio::test]
#[ignore = "requires an Android emulator and Appium"]
async fn test_demo_mode_with_target_timezone() {
    let mut options = RunOptions::new(NavigationContext::Demo);
    options.timestamp = TimestampOptions::default().target(Some(parse_timezone("UTC").unwrap()));

    let record = bootstrap_and_run(&session_config(), &ServerOptions::default(), &options)
        .await
        .unwrap_or_else(|e| panic!("Demo run failed: {}", e));

    let parts: Vec<&str> = record.last_refresh_date().split(' ').collect();
    assert_eq!(parts.len(), 5, "unexpected date '{}'", record.last_refresh_date());
    assert!(parts[4] == "AM" || parts[4] == "PM");
}

#[tokio::test]
#[ignore = "requires an Android emulator, Appium and an account"]
async fn test_sign_in_end_to_end() {
    let (context, fallback) = NavigationContext::resolve(
        env::var("EVSCRAPE_USER_ID").ok().as_deref(),
        env::var("EVSCRAPE_PASSWORD").ok().as_deref(),
        false,
    );
    if let Some(reason) = fallback {
        println!("Skipping sign-in test: {}", reason);
        return;
    }

    let record = bootstrap_and_run(
        &session_config(),
        &ServerOptions::default(),
        &RunOptions::new(context),
    )
    .await
    .unwrap_or_else(|e| panic!("Sign-in run failed: {}", e));
    println!("{}", record);
}

#[tokio::test]
#[ignore = "requires a running Appium server and emulator"]
async fn test_screenshot_from_live_session() {
    let session = tokio::time::timeout(
        Duration::from_secs(300),
        WebDriverSession::create(&session_config()),
    )
    .await
    .expect("session creation timed out")
    .unwrap_or_else(|e| panic!("Failed to create session: {}", e));

    let png = session.screenshot().await.unwrap();
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    session.quit().await.unwrap();
}
