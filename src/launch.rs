//! Identity-agnostic process launch with a hard timeout
//!
//! The sequencer's two-tier retry is expressed over one capability:
//! `launch(program, args, identity, timeout)`. `Identity::Current` spawns
//! the installer directly; `Identity::Credentialed` wraps it in a PowerShell
//! `Start-Process -Credential` invocation so the process runs under the
//! stored administrator identity. Standard output/error are redirected and
//! no console window is created.
//!
//! Timeout expiry force-kills the process; this is the only cancellation
//! mechanism.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Result, SilentPushError};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Poll interval while waiting on a launched installer.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The identity an installer process runs under.
#[derive(Clone)]
pub enum Identity {
    /// The current process identity (unprivileged attempt).
    Current,
    /// The stored administrator identity (privileged retry).
    Credentialed { user: String, password: String },
}

/// Outcome of a completed (non-timed-out) launch.
#[derive(Debug, Clone)]
pub struct ExitOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExitOutcome {
    /// Exit code with signal-termination mapped to a sentinel failure code.
    pub fn code_or_failure(&self) -> i32 {
        self.code.unwrap_or(-1)
    }
}

/// Launch `program` with `args` under `identity`, waiting at most `timeout`.
///
/// Returns `LaunchFailed` when the process cannot start and `TimedOut`
/// (after force-killing the process) when the limit expires. A non-zero
/// exit code is NOT an error here; classification is the caller's job.
pub fn launch(
    program: &Path,
    args: &[String],
    identity: &Identity,
    timeout: Duration,
) -> Result<ExitOutcome> {
    let mut command = build_command(program, args, identity);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| SilentPushError::LaunchFailed {
        path: program.display().to_string(),
        reason: e.to_string(),
    })?;

    let stdout_reader = drain_pipe(child.stdout.take());
    let stderr_reader = drain_pipe(child.stderr.take());

    let status = wait_with_timeout(&mut child, timeout)?;

    Ok(ExitOutcome {
        code: status.code(),
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    })
}

fn build_command(program: &Path, args: &[String], identity: &Identity) -> Command {
    let mut command = match identity {
        Identity::Current => {
            let mut c = Command::new(program);
            c.args(args);
            c
        }
        Identity::Credentialed { user, password } => {
            credentialed_command(program, args, user, password)
        }
    };

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    command
}

/// Build the elevation wrapper for the privileged retry.
///
/// On Windows this is a PowerShell `Start-Process -Credential` invocation
/// whose own exit code is the installer's. Elsewhere the credentialed
/// identity degrades to a direct launch, which keeps the state machine
/// exercisable on development hosts.
#[cfg(windows)]
fn credentialed_command(program: &Path, args: &[String], user: &str, password: &str) -> Command {
    // Start-Process wants the account name without the domain prefix.
    let account = user.rsplit('\\').next().unwrap_or(user);
    let argument_list = args
        .iter()
        .map(|a| format!("'{}'", a.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(",");

    let script = format!(
        "$sec = ConvertTo-SecureString '{password}' -AsPlainText -Force; \
         $cred = New-Object System.Management.Automation.PSCredential('{account}', $sec); \
         $p = Start-Process -FilePath '{program}' {arg_clause} \
         -Credential $cred -WindowStyle Hidden -Wait -PassThru; \
         exit $p.ExitCode",
        password = password.replace('\'', "''"),
        account = account.replace('\'', "''"),
        program = program.display().to_string().replace('\'', "''"),
        arg_clause = if argument_list.is_empty() {
            String::new()
        } else {
            format!("-ArgumentList {argument_list}")
        },
    );

    let mut c = Command::new("powershell.exe");
    c.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
    c
}

#[cfg(not(windows))]
fn credentialed_command(program: &Path, args: &[String], _user: &str, _password: &str) -> Command {
    let mut c = Command::new(program);
    c.args(args);
    c
}

/// Drain a piped stream on its own thread so the child never blocks on a
/// full pipe buffer while we poll for exit.
fn drain_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<std::process::ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SilentPushError::TimedOut {
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use tempfile::TempDir;

        fn fake_installer(dir: &TempDir, name: &str, body: &str) -> PathBuf {
            let path = dir.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_launch_captures_exit_code() {
            let temp = TempDir::new().unwrap();
            let exe = fake_installer(&temp, "ok.sh", "exit 0");

            let outcome =
                launch(&exe, &[], &Identity::Current, Duration::from_secs(10)).unwrap();
            assert_eq!(outcome.code, Some(0));
        }

        #[test]
        fn test_launch_nonzero_exit_is_not_an_error() {
            let temp = TempDir::new().unwrap();
            let exe = fake_installer(&temp, "fail.sh", "exit 7");

            let outcome =
                launch(&exe, &[], &Identity::Current, Duration::from_secs(10)).unwrap();
            assert_eq!(outcome.code, Some(7));
        }

        #[test]
        fn test_launch_captures_output() {
            let temp = TempDir::new().unwrap();
            let exe = fake_installer(&temp, "noisy.sh", "echo out; echo err >&2; exit 0");

            let outcome =
                launch(&exe, &[], &Identity::Current, Duration::from_secs(10)).unwrap();
            assert_eq!(outcome.stdout.trim(), "out");
            assert_eq!(outcome.stderr.trim(), "err");
        }

        #[test]
        fn test_launch_timeout_kills_process() {
            let temp = TempDir::new().unwrap();
            let exe = fake_installer(&temp, "hang.sh", "sleep 30");

            let started = Instant::now();
            let result = launch(&exe, &[], &Identity::Current, Duration::from_secs(1));
            assert!(matches!(
                result.unwrap_err(),
                SilentPushError::TimedOut { seconds: 1 }
            ));
            assert!(started.elapsed() < Duration::from_secs(10));
        }

        #[test]
        fn test_launch_missing_program_fails() {
            let temp = TempDir::new().unwrap();
            let result = launch(
                &temp.path().join("missing.exe"),
                &[],
                &Identity::Current,
                Duration::from_secs(1),
            );
            assert!(matches!(
                result.unwrap_err(),
                SilentPushError::LaunchFailed { .. }
            ));
        }

        #[test]
        fn test_credentialed_identity_degrades_to_direct_launch() {
            let temp = TempDir::new().unwrap();
            let exe = fake_installer(&temp, "ok.sh", "exit 0");

            let identity = Identity::Credentialed {
                user: "HOST\\admin".to_string(),
                password: "secret".to_string(),
            };
            let outcome = launch(&exe, &[], &identity, Duration::from_secs(10)).unwrap();
            assert_eq!(outcome.code, Some(0));
        }
    }

    #[test]
    fn test_code_or_failure_maps_signal_death() {
        let outcome = ExitOutcome {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(outcome.code_or_failure(), -1);
    }
}
