use std::time::Duration;

use anyhow::Result;
use tracing::{error, warn};

use crate::core::error::ScanLayoutError;

/// Runs `op` up to `max_attempts` times (at least once), sleeping `delay`
/// between failed attempts. `op` receives the 1-based attempt number.
pub fn with_retries<T, F>(max_attempts: u32, delay: Duration, mut op: F) -> Result<T, ScanLayoutError>
where
    F: FnMut(u32) -> Result<T>,
{
    let attempts = max_attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                last = format!("{err:#}");
                warn!(attempt, attempts, error = %last, "attempt failed");
                if attempt < attempts && !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }
    }

    error!(attempts, "maximum retry attempts exceeded");
    Err(ScanLayoutError::RetriesExhausted { attempts, last })
}
