use chrono::{DateTime, Utc};

/// Epoch seconds with microsecond precision.
pub fn time_secs() -> f64 {
    let time: DateTime<chrono::Utc> = Utc::now();
    time.timestamp_micros() as f64 / 1_000_000.0
}
