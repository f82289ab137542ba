//! Limits and defaults shared by the gateway, the tasks, and the CLI.
use std::time::Duration;

/// Ceiling applied to every gateway call.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);
/// Defaults for the caller-level retry policy. Tasks never retry on their own.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

pub const DEFAULT_SCHEDULE: &str = "0 9 * * *";
pub const DEFAULT_MAX_VIDEOS_PER_DAY: u32 = 10;

/// Preset schedules offered to users, as `(expression, label)`.
pub const DEFAULT_SCHEDULES: &[(&str, &str)] = &[
    ("0 9 * * *", "Daily at 9:00 AM"),
    ("0 14 * * *", "Daily at 2:00 PM"),
    ("0 18 * * *", "Daily at 6:00 PM"),
    ("0 */2 * * *", "Every 2 hours"),
    ("0 */4 * * *", "Every 4 hours"),
    ("0 9 * * 1", "Weekly on Monday at 9:00 AM"),
];

/// Quota units one video upload consumes on the remote side.
pub const UPLOAD_QUOTA_COST: u64 = 1600;

pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Accepted upload extensions and the MIME type sent for each.
pub const VIDEO_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("avi", "video/avi"),
    ("mov", "video/mov"),
    ("wmv", "video/wmv"),
    ("flv", "video/flv"),
    ("webm", "video/webm"),
    ("mkv", "video/mkv"),
];

pub const DEFAULT_LOG_PAGE_SIZE: u32 = 100;

pub const TITLE_MIN_LENGTH: usize = 1;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 5000;
pub const TAGS_MAX_COUNT: usize = 15;
pub const TAG_MAX_LENGTH: usize = 30;

/// Looks up the MIME type for a file extension, case-insensitively.
pub fn video_mime_for_extension(extension: &str) -> Option<&'static str> {
    VIDEO_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
}
