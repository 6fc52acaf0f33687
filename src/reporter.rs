//! Progress/status presentation contract
//!
//! The sequencer never talks to the terminal directly; it emits progress,
//! status lines and per-job results through the `Reporter` trait. The
//! console implementation renders an indicatif bar on the driving thread;
//! the channel implementation carries events out of the worker thread with
//! fire-and-forget sends, so the worker never blocks on presentation.

use std::sync::mpsc::Sender;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Presentation contract consumed by the installation core.
pub trait Reporter: Send {
    /// Completed/total job counts for the progress display.
    fn report_progress(&self, completed: usize, total: usize);

    /// A running status line (preparing, installing, retrying...).
    fn report_status(&self, message: &str);

    /// Terminal result of one job.
    fn report_job_result(
        &self,
        package_name: &str,
        succeeded: bool,
        exit_code: Option<i32>,
        message: &str,
    );
}

/// Events crossing from the worker thread to the presentation thread.
#[derive(Debug, Clone)]
pub enum ReportEvent {
    Progress {
        completed: usize,
        total: usize,
    },
    Status(String),
    JobResult {
        package_name: String,
        succeeded: bool,
        exit_code: Option<i32>,
        message: String,
    },
}

/// Reporter that forwards every event over an mpsc channel.
///
/// Sends are fire-and-forget: a disconnected receiver is ignored rather
/// than propagated, per the soft-failure presentation contract.
pub struct ChannelReporter {
    sender: Sender<ReportEvent>,
}

impl ChannelReporter {
    pub fn new(sender: Sender<ReportEvent>) -> Self {
        Self { sender }
    }
}

impl Reporter for ChannelReporter {
    fn report_progress(&self, completed: usize, total: usize) {
        let _ = self.sender.send(ReportEvent::Progress { completed, total });
    }

    fn report_status(&self, message: &str) {
        let _ = self.sender.send(ReportEvent::Status(message.to_string()));
    }

    fn report_job_result(
        &self,
        package_name: &str,
        succeeded: bool,
        exit_code: Option<i32>,
        message: &str,
    ) {
        let _ = self.sender.send(ReportEvent::JobResult {
            package_name: package_name.to_string(),
            succeeded,
            exit_code,
            message: message.to_string(),
        });
    }
}

/// Interactive console presentation with a progress bar.
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    /// Create a console reporter sized to the total job count.
    pub fn new(total_jobs: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total_jobs);
        bar.set_style(style);

        Self { bar }
    }

    /// Render one event received from the worker channel.
    pub fn render(&self, event: &ReportEvent) {
        match event {
            ReportEvent::Progress { completed, .. } => {
                self.bar.set_position(*completed as u64);
            }
            ReportEvent::Status(message) => {
                self.bar.set_message(message.clone());
            }
            ReportEvent::JobResult {
                package_name,
                succeeded,
                exit_code,
                message,
            } => {
                self.report_job_result(package_name, *succeeded, *exit_code, message);
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl Reporter for ConsoleReporter {
    fn report_progress(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }

    fn report_status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn report_job_result(
        &self,
        package_name: &str,
        succeeded: bool,
        exit_code: Option<i32>,
        message: &str,
    ) {
        let (marker, name_style) = if succeeded {
            (Style::new().green().apply_to("ok"), Style::new().bold())
        } else {
            (Style::new().red().apply_to("failed"), Style::new().bold().red())
        };
        let code = exit_code.map_or("-".to_string(), |c| c.to_string());
        self.bar.println(format!(
            "{} {} (exit {}) {}",
            marker,
            name_style.apply_to(package_name),
            code,
            Style::new().dim().apply_to(message)
        ));
    }
}

/// No-op reporter for tests and quiet runs.
#[derive(Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report_progress(&self, _completed: usize, _total: usize) {}

    fn report_status(&self, _message: &str) {}

    fn report_job_result(
        &self,
        _package_name: &str,
        _succeeded: bool,
        _exit_code: Option<i32>,
        _message: &str,
    ) {
    }
}
