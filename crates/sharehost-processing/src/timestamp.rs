//! Human readable creation timestamps.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// `dd.mm.yyyy, HH:MM:SS`, e.g. `01.03.2024, 14:05:09`.
const DISPLAY_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

pub fn format_timestamp(time: DateTime<Utc>, timezone: Tz) -> String {
    time.with_timezone(&timezone)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Creation time of a file, falling back to modification time on
/// filesystems without birth time, then to now.
pub async fn file_created_at(path: &Path) -> DateTime<Utc> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(_) => return Utc::now(),
    };

    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| DateTime::<Utc>::from(SystemTime::now()))
}
