use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alerthook::{
    config::{self, Settings},
    error::DispatchError,
    models::{Alert, Side},
    services::trade_dispatcher::{Dispatch, TradeDispatcher},
};
use tempfile::TempDir;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("trade.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    path
}

// run through `sh` so the test does not depend on the exec bit
fn settings_for(script: &Path, timeout: Duration) -> Settings {
    let mut settings = config::from_lookup(|_| None);
    settings.trade_script = script.to_path_buf();
    settings.trade_interpreter = Some("sh".to_string());
    settings.trade_timeout = timeout;
    settings
}

fn alert(ticker: &str) -> Alert {
    Alert {
        ticker: ticker.to_string(),
        side: Side::Buy,
        quantity: 2,
    }
}

#[tokio::test]
async fn passes_fields_as_positional_arguments() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), r#"printf '%s|%s|%s|%s' "$#" "$1" "$2" "$3""#);
    let dispatcher = TradeDispatcher::new(&settings_for(&script, Duration::from_secs(10)));

    let report = dispatcher.run(&alert("AAPL")).await.unwrap();

    assert_eq!(report.exit_code, Some(0));
    assert_eq!(report.stdout, "3|AAPL|buy|2");
}

#[tokio::test]
async fn shell_metacharacters_are_not_interpreted() {
    let dir = TempDir::new().unwrap();
    let canary = dir.path().join("pwned");
    let args_file = dir.path().join("args.txt");

    let script = write_script(
        dir.path(),
        &format!(r#"printf '%s\n' "$1" > '{}'"#, args_file.display()),
    );
    let dispatcher = TradeDispatcher::new(&settings_for(&script, Duration::from_secs(10)));

    let ticker = format!("AAPL; touch {}", canary.display());
    dispatcher.run(&alert(&ticker)).await.unwrap();

    let seen = fs::read_to_string(&args_file).unwrap();
    assert_eq!(seen.trim_end(), ticker);
    assert!(!canary.exists());
}

#[tokio::test]
async fn non_zero_exit_is_reported() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "echo 'order rejected' >&2\nexit 3");
    let dispatcher = TradeDispatcher::new(&settings_for(&script, Duration::from_secs(10)));

    let err = dispatcher.run(&alert("AAPL")).await.unwrap_err();

    match err {
        DispatchError::Exited { status, stderr, .. } => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(stderr, "order rejected");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_interpreter_is_a_spawn_error() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&dir.path().join("trade.sh"), Duration::from_secs(10));
    settings.trade_interpreter = Some(dir.path().join("no-such-binary").display().to_string());
    let dispatcher = TradeDispatcher::new(&settings);

    let err = dispatcher.run(&alert("AAPL")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Spawn { .. }), "got {err:?}");
}

#[tokio::test]
async fn slow_script_times_out() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "sleep 5");
    let dispatcher = TradeDispatcher::new(&settings_for(&script, Duration::from_millis(200)));

    let err = dispatcher.run(&alert("AAPL")).await.unwrap_err();
    assert!(matches!(err, DispatchError::TimedOut(_)), "got {err:?}");
}

#[tokio::test]
async fn dispatch_returns_before_the_script_finishes() {
    let dir = TempDir::new().unwrap();
    let done = dir.path().join("done");
    let script = write_script(
        dir.path(),
        &format!("sleep 0.3\ntouch '{}'", done.display()),
    );
    let dispatcher = TradeDispatcher::new(&settings_for(&script, Duration::from_secs(10)));

    dispatcher.dispatch(alert("AAPL"));
    assert!(!done.exists());

    let mut waited = Duration::ZERO;
    while !done.exists() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        waited += Duration::from_millis(50);
    }
    assert!(done.exists());
}
