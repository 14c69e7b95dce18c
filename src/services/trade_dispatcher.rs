use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::time;
use tracing::{Instrument, error, info, info_span};

use crate::{config::Settings, error::DispatchError, models::Alert};

/// Hands a complete alert off for execution. Implementations must return
/// without waiting on the trade itself.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self, alert: Alert);
}

#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Runs the external trade-execution script as
/// `[interpreter] <script> <ticker> <side> <quantity>`.
///
/// Every alert field is passed as its own argv entry; no shell ever sees
/// the values, so a ticker like `AAPL; rm -rf /` is just an odd ticker.
#[derive(Debug, Clone)]
pub struct TradeDispatcher {
    script: PathBuf,
    interpreter: Option<String>,
    timeout: Duration,
}

impl TradeDispatcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            script: settings.trade_script.clone(),
            interpreter: settings.trade_interpreter.clone(),
            timeout: settings.trade_timeout,
        }
    }

    fn program(&self) -> String {
        match &self.interpreter {
            Some(interpreter) => format!("{} {}", interpreter, self.script.display()),
            None => self.script.display().to_string(),
        }
    }

    pub fn command(&self, alert: &Alert) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(&self.script);
                cmd
            }
            None => Command::new(&self.script),
        };

        cmd.arg(&alert.ticker)
            .arg(alert.side.as_str())
            .arg(alert.quantity.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }

    /// Spawns the script and waits for it (bounded by the configured
    /// timeout). The child is killed if the timeout fires.
    pub async fn run(&self, alert: &Alert) -> Result<DispatchReport, DispatchError> {
        let started = Instant::now();

        let child = self
            .command(alert)
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: self.program(),
                source,
            })?;

        let output = match time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(DispatchError::Wait)?,
            Err(_) => return Err(DispatchError::TimedOut(self.timeout)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        if !output.status.success() {
            return Err(DispatchError::Exited {
                status: output.status,
                stdout,
                stderr,
            });
        }

        Ok(DispatchReport {
            exit_code: output.status.code(),
            stdout,
            stderr,
            elapsed: started.elapsed(),
        })
    }
}

impl Dispatch for TradeDispatcher {
    fn dispatch(&self, alert: Alert) {
        let dispatcher = self.clone();
        let span = info_span!(
            "dispatch",
            ticker = %alert.ticker,
            side = %alert.side,
            quantity = alert.quantity
        );

        tokio::spawn(
            async move {
                info!("trade script started");

                match dispatcher.run(&alert).await {
                    Ok(report) => info!(
                        exit_code = ?report.exit_code,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        stdout = %report.stdout,
                        stderr = %report.stderr,
                        "trade script finished"
                    ),
                    Err(DispatchError::Exited { status, stdout, stderr }) => error!(
                        %status,
                        stdout = %stdout,
                        stderr = %stderr,
                        "trade script failed"
                    ),
                    Err(e) => error!(error = %e, "trade dispatch failed"),
                }
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use std::ffi::OsStr;

    fn dispatcher(interpreter: Option<&str>) -> TradeDispatcher {
        TradeDispatcher {
            script: PathBuf::from("execute_trade.py"),
            interpreter: interpreter.map(str::to_string),
            timeout: Duration::from_secs(5),
        }
    }

    fn args_of(cmd: &Command) -> Vec<&OsStr> {
        cmd.as_std().get_args().collect()
    }

    #[test]
    fn builds_argv_with_interpreter() {
        let alert = Alert {
            ticker: "AAPL".to_string(),
            side: Side::Buy,
            quantity: 10,
        };
        let cmd = dispatcher(Some("python3")).command(&alert);

        assert_eq!(cmd.as_std().get_program(), "python3");
        assert_eq!(args_of(&cmd), ["execute_trade.py", "AAPL", "buy", "10"]);
    }

    #[test]
    fn builds_argv_without_interpreter() {
        let alert = Alert {
            ticker: "MGC2508".to_string(),
            side: Side::Other("Short".to_string()),
            quantity: 1,
        };
        let cmd = dispatcher(None).command(&alert);

        assert_eq!(cmd.as_std().get_program(), "execute_trade.py");
        assert_eq!(args_of(&cmd), ["MGC2508", "Short", "1"]);
    }

    #[test]
    fn metacharacters_stay_in_one_argument() {
        let alert = Alert {
            ticker: "AAPL; rm -rf / && echo $(whoami)".to_string(),
            side: Side::Sell,
            quantity: 3,
        };
        let cmd = dispatcher(None).command(&alert);

        assert_eq!(
            args_of(&cmd),
            ["AAPL; rm -rf / && echo $(whoami)", "sell", "3"]
        );
    }
}
