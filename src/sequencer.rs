//! Installation sequencing state machine
//!
//! Processes the selected packages strictly serially. Each job resolves its
//! install strategy (special copy vs. silent installer), stages the
//! installer locally, runs it unprivileged, and on a non-accepted exit code
//! retries exactly once under the administrator identity with a wider
//! acceptance set and an extended timeout. Per-job failures never abort the
//! sequence; every package gets one full pass through the state machine.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::cache::InstallerCache;
use crate::catalog::Package;
use crate::credentials::CredentialRecord;
use crate::error::SilentPushError;
use crate::launch::{self, Identity};
use crate::netshare;
use crate::params;
use crate::reporter::Reporter;
use crate::special::{self, SpecialConfig};

/// Exit codes accepted as success on the unprivileged attempt
/// (success and "success, reboot required" variants).
pub const UNPRIVILEGED_SUCCESS_CODES: &[i32] = &[0, 3010, 1641, 2];

/// Wider acceptance set for the privileged retry, adding
/// already-installed / framework-specific success codes.
pub const PRIVILEGED_SUCCESS_CODES: &[i32] = &[0, 3010, 1641, 2, 1605, 1618, 8192, 9999];

/// Pause between jobs; back-to-back installer launches contend on
/// self-extraction locks.
const JOB_COOLDOWN: Duration = Duration::from_secs(2);

/// Extra time granted to the privileged retry on top of the base timeout.
const PRIVILEGED_TIMEOUT_EXTENSION: Duration = Duration::from_secs(60);

/// Per-job lifecycle states. `Succeeded`, `Failed` and `TimedOut` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Preparing,
    RunningUnprivileged,
    RunningPrivileged,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::TimedOut)
    }
}

/// One package's trip through the state machine.
#[derive(Debug)]
pub struct Job {
    pub package: Package,
    pub state: JobState,
    pub exit_code: Option<i32>,
}

impl Job {
    fn new(package: Package) -> Self {
        Self {
            package,
            state: JobState::Pending,
            exit_code: None,
        }
    }
}

/// Final counts after all jobs reach a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

/// Everything one installation session needs: the credential record, the
/// resolved package list and the collaborating components. There is no
/// session state outside this struct.
pub struct SessionContext<'a> {
    pub credentials: CredentialRecord,
    pub packages: Vec<Package>,
    pub special: SpecialConfig,
    pub cache: InstallerCache,
    pub reporter: &'a dyn Reporter,
    /// Base timeout for the unprivileged attempt.
    pub base_timeout: Duration,
    /// Pause between jobs; overridable so tests need not wait.
    pub cooldown: Duration,
}

impl<'a> SessionContext<'a> {
    pub fn new(
        credentials: CredentialRecord,
        packages: Vec<Package>,
        special: SpecialConfig,
        cache: InstallerCache,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            credentials,
            packages,
            special,
            cache,
            reporter,
            base_timeout: Duration::from_secs(params::DEFAULT_TIMEOUT_SECS),
            cooldown: JOB_COOLDOWN,
        }
    }
}

/// Run every job to a terminal state and return the final tally.
///
/// Always tears down any temporary network mapping before returning.
pub fn run(session: &SessionContext<'_>) -> (Vec<Job>, Tally) {
    let total = session.packages.len();
    let mut jobs: Vec<Job> = session.packages.iter().cloned().map(Job::new).collect();

    for (index, job) in jobs.iter_mut().enumerate() {
        session.reporter.report_progress(index, total);
        session.reporter.report_status(&format!(
            "Preparing {} ({}/{})",
            job.package.name,
            index + 1,
            total
        ));

        let message = run_job(session, job);
        debug_assert!(job.state.is_terminal());

        session.reporter.report_job_result(
            &job.package.name,
            job.state == JobState::Succeeded,
            job.exit_code,
            &message,
        );

        if index + 1 < total {
            thread::sleep(session.cooldown);
        }
    }

    netshare::unmap_temp_drive();
    session.reporter.report_progress(total, total);

    let succeeded = jobs
        .iter()
        .filter(|j| j.state == JobState::Succeeded)
        .count();
    let tally = Tally {
        succeeded,
        failed: total - succeeded,
        total,
    };
    (jobs, tally)
}

/// Drive one job to a terminal state; returns the message to report.
/// Every error is absorbed here - nothing propagates past the job boundary.
fn run_job(session: &SessionContext<'_>, job: &mut Job) -> String {
    job.state = JobState::Preparing;

    // Strategy resolution: a package with a special configuration never
    // runs the standard installer flow.
    if let Some(outcome) =
        special::try_special_install(&session.special, &job.package.name, session.reporter)
    {
        job.state = if outcome.success {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        return outcome.message;
    }

    let installer = localize_best_effort(session, &job.package.path);
    if !installer.exists() {
        job.state = JobState::Failed;
        return SilentPushError::NotFound {
            path: installer.display().to_string(),
        }
        .to_string();
    }

    let command_line = params::resolve(&installer);
    let args = &command_line[1..];

    session.reporter.report_status(&format!(
        "Installing {} silently",
        job.package.name
    ));

    job.state = JobState::RunningUnprivileged;
    let first = match launch::launch(&installer, args, &Identity::Current, session.base_timeout) {
        Ok(outcome) => outcome,
        Err(e @ SilentPushError::TimedOut { .. }) => {
            // A hung unprivileged install will hang privileged too;
            // no retry.
            job.state = JobState::TimedOut;
            return e.to_string();
        }
        Err(e) => {
            job.state = JobState::Failed;
            return e.to_string();
        }
    };

    let first_code = first.code_or_failure();
    job.exit_code = Some(first_code);
    if UNPRIVILEGED_SUCCESS_CODES.contains(&first_code) {
        job.state = JobState::Succeeded;
        return format!("installed (exit code {})", first_code);
    }

    session.reporter.report_status(&format!(
        "Exit code {} on unprivileged attempt, retrying as administrator",
        first_code
    ));

    job.state = JobState::RunningPrivileged;
    let identity = privileged_identity(&session.credentials);
    let retry_timeout = session.base_timeout + PRIVILEGED_TIMEOUT_EXTENSION;

    match launch::launch(&installer, args, &identity, retry_timeout) {
        Ok(outcome) => {
            let code = outcome.code_or_failure();
            job.exit_code = Some(code);
            if PRIVILEGED_SUCCESS_CODES.contains(&code) {
                job.state = JobState::Succeeded;
                format!("installed with administrator identity (exit code {})", code)
            } else {
                job.state = JobState::Failed;
                SilentPushError::NonZeroExit { code }.to_string()
            }
        }
        Err(e @ SilentPushError::TimedOut { .. }) => {
            job.state = JobState::TimedOut;
            e.to_string()
        }
        Err(e) => {
            job.state = JobState::Failed;
            e.to_string()
        }
    }
}

/// Stage the installer locally, degrading to the original path when
/// staging fails (the existence check downstream decides the job's fate).
fn localize_best_effort(session: &SessionContext<'_>, source: &str) -> PathBuf {
    match session
        .cache
        .localize(source, session.credentials.domain.as_ref(), session.reporter)
    {
        Ok(path) => path,
        Err(e) => {
            session.reporter.report_status(&e.to_string());
            PathBuf::from(source)
        }
    }
}

/// Identity for the privileged retry. An already-elevated session keeps
/// the current identity; otherwise the stored admin credential is used.
fn privileged_identity(credentials: &CredentialRecord) -> Identity {
    match &credentials.admin.password {
        None => Identity::Current,
        Some(password) => Identity::Credentialed {
            user: credentials.admin.user.clone(),
            password: password.clone(),
        },
    }
}
