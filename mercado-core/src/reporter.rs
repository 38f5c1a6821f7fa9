use console::{style, Term};
use eyre::WrapErr;
use tokio::sync::broadcast;
use tracing::*;

use crate::runner::{self, CaseStatus, Check};

/// Reporter trait. The trait is based on the "template method" pattern:
/// implement the on_xxx hooks to react to execution events, or override
/// `run` entirely for full control of the event loop.
#[async_trait::async_trait]
pub trait Reporter {
    async fn run(&mut self) -> eyre::Result<()> {
        let mut rx = runner::subscribe()?;

        loop {
            match rx.recv().await {
                Ok(runner::Message::GroupStarted(group)) => {
                    self.on_group_start(group).await?;
                }
                Ok(runner::Message::SetupFailed(group, reason)) => {
                    self.on_setup_failed(group, reason).await?;
                }
                Ok(runner::Message::CaseStarted(group, case)) => {
                    self.on_case_start(group, case).await?;
                }
                Ok(runner::Message::Check(group, case, check)) => {
                    self.on_check(group, case, check).await?;
                }
                Ok(runner::Message::CaseFinished(group, case, status)) => {
                    self.on_case_end(group, case, status).await?;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("runner channel has been closed");
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    debug!("runner channel recv lagged");
                    continue;
                }
            }
        }

        Ok(())
    }

    /// Called when a group starts running.
    async fn on_group_start(&mut self, _group: String) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a group's setup step fails, before its cases are blocked.
    async fn on_setup_failed(&mut self, _group: String, _reason: String) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a case starts.
    async fn on_case_start(&mut self, _group: String, _case: String) -> eyre::Result<()> {
        Ok(())
    }

    /// Called for every evaluated expectation within a step.
    async fn on_check(&mut self, _group: String, _case: String, _check: Check) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a case finishes, including blocked cases.
    async fn on_case_end(
        &mut self,
        _group: String,
        _case: String,
        _status: CaseStatus,
    ) -> eyre::Result<()> {
        Ok(())
    }
}

pub struct NullReporter;

#[async_trait::async_trait]
impl Reporter for NullReporter {}

/// Console reporter printing one line per finished case, with optional dim
/// per-check detail.
pub struct ListReporter {
    terminal: Term,
    capture_checks: bool,
}

impl ListReporter {
    pub fn new(capture_checks: bool) -> ListReporter {
        ListReporter {
            terminal: Term::stdout(),
            capture_checks,
        }
    }
}

#[async_trait::async_trait]
impl Reporter for ListReporter {
    async fn on_setup_failed(&mut self, group: String, reason: String) -> eyre::Result<()> {
        let status = style("✘").red();
        self.terminal
            .write_line(&format!("{status} [{group}] setup: {reason}"))
            .wrap_err("failed to write on terminal")
    }

    async fn on_check(&mut self, _group: String, _case: String, check: Check) -> eyre::Result<()> {
        if self.capture_checks {
            let line = style(format!(" => {}", check.message)).dim();
            self.terminal
                .write_line(&format!("{line}"))
                .wrap_err("failed to write on terminal")?;
        }
        Ok(())
    }

    async fn on_case_end(
        &mut self,
        group: String,
        case: String,
        status: CaseStatus,
    ) -> eyre::Result<()> {
        let line = match status {
            CaseStatus::Passed => {
                format!("{} [{group}] {case}", style("✓").green())
            }
            CaseStatus::Failed(reason) => {
                format!("{} [{group}] {case}: {reason}", style("✘").red())
            }
            CaseStatus::Blocked => {
                format!(
                    "{} [{group}] {case}: blocked by setup failure",
                    style("-").yellow()
                )
            }
        };
        self.terminal
            .write_line(&line)
            .wrap_err("failed to write on terminal")
    }
}
