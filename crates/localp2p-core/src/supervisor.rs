//! Daemon process supervision
//!
//! Spawns the core binary attached to this terminal, forwards termination
//! requests to it and reports how it exited. A crashed daemon is never
//! restarted.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Shown when the daemon binary cannot be started
pub const BUILD_HINT: &str = "Make sure the core binary is built:\ncd core && go build -o localp2p";

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to start core at {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for core: {0}")]
    Wait(#[source] std::io::Error),
}

/// How the daemon ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonExit {
    /// Exit code; `128 + signo` when killed by a signal on unix
    pub code: i32,
    /// Termination signals forwarded before it exited
    pub signals_forwarded: usize,
}

impl DaemonExit {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Arguments the core binary is started with
pub fn daemon_args(rpc_port: u16) -> Vec<String> {
    vec![format!("--rpc-port={}", rpc_port)]
}

/// A running daemon child process
pub struct DaemonProcess {
    child: Child,
    binary: PathBuf,
}

impl DaemonProcess {
    /// Start `binary` with inherited stdio, in this process's group
    pub fn spawn(binary: &Path, args: &[String]) -> Result<Self, SupervisorError> {
        let child = Command::new(binary)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                path: binary.to_path_buf(),
                source,
            })?;

        info!("Spawned core {} (pid {:?})", binary.display(), child.id());
        Ok(Self {
            child,
            binary: binary.to_path_buf(),
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the daemon to exit.
    ///
    /// Every message on `termination` forwards one graceful-termination
    /// signal to the child; supervision then keeps waiting for the exit.
    pub async fn supervise(
        mut self,
        mut termination: mpsc::Receiver<()>,
    ) -> Result<DaemonExit, SupervisorError> {
        let mut signals_forwarded = 0;
        let mut listening = true;

        loop {
            tokio::select! {
                status = self.child.wait() => {
                    let code = exit_code(status.map_err(SupervisorError::Wait)?);
                    info!("Core {} exited with code {}", self.binary.display(), code);
                    return Ok(DaemonExit { code, signals_forwarded });
                }
                request = termination.recv(), if listening => match request {
                    Some(()) => {
                        self.terminate();
                        signals_forwarded += 1;
                    }
                    None => listening = false,
                },
            }
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // No pid means the child has already been reaped
        let Some(pid) = self.child.id() else { return };
        info!("Forwarding SIGTERM to core (pid {})", pid);
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!("Failed to signal core (pid {}): {}", pid, e);
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        info!("Terminating core (pid {:?})", self.child.id());
        if let Err(e) = self.child.start_kill() {
            warn!("Failed to terminate core: {}", e);
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Termination requests aimed at this process (Ctrl-C, and SIGTERM on unix),
/// one message per signal received.
pub fn termination_requests() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        #[cfg(unix)]
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(e) => {
                warn!("Failed to set up SIGTERM handler: {}", e);
                None
            }
        };

        loop {
            #[cfg(unix)]
            let received = match sigterm.as_mut() {
                Some(sigterm) => tokio::select! {
                    r = tokio::signal::ctrl_c() => r.is_ok(),
                    r = sigterm.recv() => r.is_some(),
                },
                None => tokio::signal::ctrl_c().await.is_ok(),
            };

            #[cfg(not(unix))]
            let received = tokio::signal::ctrl_c().await.is_ok();

            if !received || tx.send(()).await.is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh(script: &str) -> DaemonProcess {
        DaemonProcess::spawn(Path::new("/bin/sh"), &["-c".to_string(), script.to_string()]).unwrap()
    }

    #[test]
    fn test_daemon_args() {
        assert_eq!(daemon_args(9191), vec!["--rpc-port=9191".to_string()]);
    }

    #[tokio::test]
    async fn test_reports_exit_code_without_signal() {
        let (_tx, rx) = mpsc::channel(1);
        let exit = sh("exit 3").supervise(rx).await.unwrap();

        assert_eq!(exit, DaemonExit { code: 3, signals_forwarded: 0 });
        assert!(!exit.success());
    }

    #[tokio::test]
    async fn test_forwards_one_signal_then_reports_exit() {
        let process = sh("trap 'exit 7' TERM; while :; do sleep 0.05; done");
        let (tx, rx) = mpsc::channel(1);

        let supervision = tokio::spawn(process.supervise(rx));
        // Let the shell install its trap
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(()).await.unwrap();

        let exit = supervision.await.unwrap().unwrap();
        assert_eq!(exit, DaemonExit { code: 7, signals_forwarded: 1 });
    }

    #[tokio::test]
    async fn test_forwards_one_signal_per_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("terms");
        let script = format!(
            ": > {log}; trap 'echo term >> {log}' TERM; \
             while [ $(wc -l < {log}) -lt 2 ]; do sleep 0.05; done; \
             exit $(wc -l < {log})",
            log = log.display()
        );
        let process = sh(&script);
        let (tx, rx) = mpsc::channel(2);

        let supervision = tokio::spawn(process.supervise(rx));
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(()).await.unwrap();

        let exit = supervision.await.unwrap().unwrap();
        assert_eq!(exit, DaemonExit { code: 2, signals_forwarded: 2 });
        let seen = std::fs::read_to_string(&log).unwrap();
        assert_eq!(seen.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_signal_death_maps_to_128_plus_signo() {
        let process = sh("exec sleep 30");
        let (tx, rx) = mpsc::channel(1);

        let supervision = tokio::spawn(process.supervise(rx));
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(()).await.unwrap();

        let exit = supervision.await.unwrap().unwrap();
        assert_eq!(exit.code, 128 + 15);
        assert_eq!(exit.signals_forwarded, 1);
    }

    #[tokio::test]
    async fn test_closed_request_channel_still_waits_for_exit() {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        let exit = sh("sleep 0.1; exit 0").supervise(rx).await.unwrap();
        assert!(exit.success());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = DaemonProcess::spawn(Path::new("./definitely/not/here/localp2p"), &[])
            .err()
            .unwrap();
        assert!(matches!(err, SupervisorError::Spawn { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Failed to start core at "), "{}", message);
        assert_eq!(message.matches("Failed to start core").count(), 1);
        assert!(message.contains("definitely/not/here"));
    }
}
