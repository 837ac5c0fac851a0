//! Reporting a finished session to a human.

use crate::error::{Error, Result};
use crate::models::ProcessedEvent;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{error, info};

pub const SUCCESS_MESSAGE: &str = "Data processed successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Destructive,
}

pub trait Notifier {
    fn notify(&self, severity: Severity, message: &str, title: Option<&str>);
}

/// Sends notifications to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, message: &str, title: Option<&str>) {
        let title = title.unwrap_or_default();
        match severity {
            Severity::Success => info!(title, "{}", message),
            Severity::Destructive => error!(title, "{}", message),
        }
    }
}

/// The "processing..." flag a control shows while a session runs.
#[derive(Debug, Clone, Default)]
pub struct ProcessingIndicator(Arc<AtomicBool>);

impl ProcessingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Option<IndicatorGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| IndicatorGuard(self))
    }
}

/// Clears the indicator however the session ends, panics included.
struct IndicatorGuard<'a>(&'a ProcessingIndicator);

impl Drop for IndicatorGuard<'_> {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

/// Runs `process` while the indicator is raised and reports the outcome
/// exactly once. Refuses to start while another session holds the
/// indicator.
pub fn process_and_notify<F>(
    indicator: &ProcessingIndicator,
    notifier: &dyn Notifier,
    process: F,
) -> Result<Vec<ProcessedEvent>>
where
    F: FnOnce() -> Result<Vec<ProcessedEvent>>,
{
    let _guard = indicator.begin().ok_or(Error::Busy)?;
    let outcome = process();
    match &outcome {
        Ok(_) => notifier.notify(Severity::Success, SUCCESS_MESSAGE, Some("Success")),
        Err(e) => notifier.notify(Severity::Destructive, &e.to_string(), Some("Error")),
    }
    outcome
}
