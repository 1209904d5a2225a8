use crate::error::AppError;
use std::time::Duration;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const APP_NAME: &str = "TeacherTask";

/// Desktop delivery of feedback messages.
pub trait Notifier {
    /// Shows `message` for roughly `duration`, replacing any notification
    /// this notifier showed before.
    fn notify(&self, message: &str, duration: Duration) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str, _duration: Duration) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Box<dyn Notifier> {
    if std::env::var("TEACHERTASK_DISABLE_NOTIFICATIONS").is_ok() {
        return Box::new(NoopNotifier);
    }

    match platform_notifier() {
        Ok(notifier) => notifier,
        Err(err) => {
            log::debug!("desktop notifications unavailable: {err}");
            Box::new(NoopNotifier)
        }
    }
}

/// Delivers a message, logging instead of failing when delivery breaks.
pub fn deliver(notifier: &dyn Notifier, message: &str, duration: Duration) {
    if let Err(err) = notifier.notify(message, duration) {
        log::warn!("notification failed: {err}");
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
