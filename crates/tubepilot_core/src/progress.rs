use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Byte-level progress of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
    /// `round(loaded * 100 / total)`, never above 100.
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_per_second: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<u64>,
}

impl UploadProgress {
    /// Returns `None` when the total is unknown or zero; no tick is reported then.
    pub fn measure(loaded: u64, total: u64, elapsed: Duration) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let percentage = percentage(loaded, total);
        let elapsed_ms = elapsed.as_millis();
        let bytes_per_second = if elapsed_ms == 0 || loaded == 0 {
            None
        } else {
            u64::try_from(u128::from(loaded) * 1000 / elapsed_ms).ok()
        };
        let eta_seconds = bytes_per_second
            .filter(|rate| *rate > 0)
            .map(|rate| total.saturating_sub(loaded).div_ceil(rate));

        Some(Self {
            loaded,
            total,
            percentage,
            bytes_per_second,
            eta_seconds,
        })
    }
}

fn percentage(loaded: u64, total: u64) -> u8 {
    let loaded = u128::from(loaded.min(total));
    let total = u128::from(total);
    // Round half up in integer arithmetic.
    let pct = (loaded * 200 + total) / (total * 2);
    u8::try_from(pct.min(100)).unwrap_or(100)
}
