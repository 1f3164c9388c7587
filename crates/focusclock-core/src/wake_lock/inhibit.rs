//! Wake lock backed by `systemd-inhibit`.
//!
//! The lock is a child process (`systemd-inhibit ... sleep infinity`) that
//! holds an idle/sleep inhibitor for as long as it lives. Killing the child
//! releases the inhibitor; a child that exits on its own means the lock was
//! taken away. A child that dies within the start-up grace period never held
//! anything (no bus, no permission) and the request is rejected.

use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{WakeLockBackend, WakeLockSentinel};
use crate::error::WakeLockError;

const INHIBIT_PROGRAM: &str = "systemd-inhibit";
const STARTUP_GRACE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct InhibitBackend {
    program: String,
    who: String,
    supported: bool,
    grace: Duration,
}

impl InhibitBackend {
    /// Probe for a working `systemd-inhibit` on the PATH.
    pub fn detect() -> Self {
        Self::with_program(INHIBIT_PROGRAM)
    }

    /// Supported only when a real, short-lived inhibit through `program`
    /// succeeds. Being installed is not enough without a reachable bus.
    pub fn with_program(program: impl Into<String>) -> Self {
        let mut backend = Self {
            program: program.into(),
            who: "focusclock".into(),
            supported: false,
            grace: STARTUP_GRACE,
        };
        backend.supported = backend
            .command(&["true"])
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        debug!(
            program = %backend.program,
            supported = backend.supported,
            "probed inhibitor helper"
        );
        backend
    }

    fn command(&self, held: &[&str]) -> Command {
        let who = format!("--who={}", self.who);
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "--what=idle:sleep",
            "--mode=block",
            who.as_str(),
            "--why=Countdown running",
        ])
        .args(held)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
        cmd
    }
}

impl WakeLockBackend for InhibitBackend {
    fn name(&self) -> &str {
        INHIBIT_PROGRAM
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn acquire(&mut self) -> Result<Box<dyn WakeLockSentinel>, WakeLockError> {
        let mut child = self
            .command(&["sleep", "infinity"])
            .spawn()
            .map_err(|source| WakeLockError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        thread::sleep(self.grace);
        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                return Err(WakeLockError::Rejected(format!(
                    "{} exited right away ({status})",
                    self.program
                )));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(WakeLockError::Rejected(format!(
                    "cannot poll {}: {e}",
                    self.program
                )));
            }
        }

        debug!(pid = child.id(), "inhibitor started");
        Ok(Box::new(InhibitSentinel { child: Some(child) }))
    }
}

struct InhibitSentinel {
    child: Option<Child>,
}

impl WakeLockSentinel for InhibitSentinel {
    fn is_released(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        match child.try_wait() {
            Ok(None) => false,
            Ok(Some(status)) => {
                debug!(%status, "inhibitor exited");
                self.child = None;
                true
            }
            Err(e) => {
                warn!("Failed to poll inhibitor process: {}", e);
                false
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("inhibitor already gone: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Drop for InhibitSentinel {
    fn drop(&mut self) {
        self.release();
    }
}
