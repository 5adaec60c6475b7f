//! Run modes: a single audit, follow until healthy, or audit then wait for a
//! stop signal.

use std::future::Future;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::audit::{Auditor, Verdict};
use crate::source::EventSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    /// Re-audit every `interval` until healthy. `max_attempts` counts the
    /// initial audit.
    Follow {
        interval: Duration,
        max_attempts: Option<u32>,
    },
    Background,
}

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Exit {
    Healthy = 0,
    Unhealthy = 1,
    ConfigError = 2,
}

impl From<Verdict> for Exit {
    fn from(verdict: Verdict) -> Self {
        if verdict.is_healthy() {
            Exit::Healthy
        } else {
            Exit::Unhealthy
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

pub async fn run<S, W, F>(
    auditor: &mut Auditor<S, W>,
    mode: RunMode,
    shutdown: F,
) -> io::Result<Exit>
where
    S: EventSource,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let verdict = tokio::select! {
        biased;
        verdict = auditor.audit_once(Utc::now()) => verdict?,
        _ = &mut shutdown => {
            info!("stop signal received before the first audit completed");
            return Ok(Exit::Unhealthy);
        }
    };

    match mode {
        RunMode::Once => Ok(verdict.into()),
        RunMode::Background => {
            if !verdict.is_healthy() {
                return Ok(Exit::Unhealthy);
            }
            let pid = std::process::id();
            info!(pid, "running in the background");
            auditor.reporter().background_notice(pid)?;
            auditor.reporter().flush()?;
            shutdown.await;
            info!("stop signal received, exiting");
            Ok(Exit::Healthy)
        }
        RunMode::Follow {
            interval,
            max_attempts,
        } => {
            let mut verdict = verdict;
            let mut attempts = 1u32;
            while !verdict.is_healthy() {
                if max_attempts.is_some_and(|max| attempts >= max) {
                    warn!(attempts, "giving up, cluster still unhealthy");
                    return Ok(Exit::Unhealthy);
                }
                info!(?interval, attempts, "cluster unhealthy, checking again later");
                verdict = tokio::select! {
                    biased;
                    verdict = async {
                        tokio::time::sleep(interval).await;
                        auditor.audit_once(Utc::now()).await
                    } => verdict?,
                    _ = &mut shutdown => {
                        info!(attempts, "stop signal received while following");
                        return Ok(Exit::Unhealthy);
                    }
                };
                attempts += 1;
            }
            Ok(Exit::Healthy)
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
