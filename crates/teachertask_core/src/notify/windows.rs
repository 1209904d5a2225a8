use crate::error::AppError;
use crate::notify::{APP_NAME, Notifier};
use std::time::Duration;
use tauri_winrt_notification::{Duration as ToastDuration, Toast};

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, message: &str, _duration: Duration) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(message)
            .duration(ToastDuration::Short)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
