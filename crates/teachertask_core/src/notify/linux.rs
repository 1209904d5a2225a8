use crate::error::AppError;
use crate::notify::{APP_NAME, Notifier};
use notify_rust::{Notification, Timeout};
use std::time::Duration;

// Reusing one id makes the daemon replace the previous bubble.
const FEEDBACK_NOTIFICATION_ID: u32 = 0x7445_4143;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, message: &str, duration: Duration) -> Result<(), AppError> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);

        let mut notification = Notification::new();
        notification.summary(APP_NAME);
        notification.body(message);
        notification.id(FEEDBACK_NOTIFICATION_ID);
        notification.timeout(Timeout::Milliseconds(millis));

        notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        Ok(())
    }
}
