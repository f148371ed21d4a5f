/// View functions
///
/// Each submodule renders one piece of state into an `Element` that
/// produces `crate::Message`s. No state lives here.

pub mod file_list;
pub mod filter_panel;
pub mod toasts;
pub mod upload_panel;

use chrono::{DateTime, Local, Utc};
use iced::Color;

pub const MUTED: Color = Color {
    r: 0.42,
    g: 0.45,
    b: 0.50,
    a: 1.0,
};
pub const SUCCESS: Color = Color {
    r: 0.18,
    g: 0.49,
    b: 0.20,
    a: 1.0,
};
pub const WARNING: Color = Color {
    r: 0.90,
    g: 0.32,
    b: 0.0,
    a: 1.0,
};
pub const DANGER: Color = Color {
    r: 0.78,
    g: 0.16,
    b: 0.16,
    a: 1.0,
};

/// `1536` -> `1.50 KB`
pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// `2097152` -> `2.00 MB`
pub fn format_megabytes(bytes: f64) -> String {
    format!("{:.2} MB", bytes / 1024.0 / 1024.0)
}

/// Upload time in the user's timezone
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
