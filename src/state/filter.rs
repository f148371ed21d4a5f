/// Filter state for the file listing
///
/// `FilterState` is the full query sent to the API and the key the listing
/// cache is indexed by. `FilterPanel` owns the form behind five of its
/// fields; the sixth, `search`, is owned by the list view's debounced search
/// box. Every edit produces a new value rather than mutating a shared one.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Query keys, in the order they are sent
pub const FILTER_KEYS: [&str; 6] = [
    "file_type",
    "size_min",
    "size_max",
    "uploaded_after",
    "uploaded_before",
    "search",
];

/// Every listing constraint. Empty string means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FilterState {
    pub file_type: String,
    pub size_min: String,
    pub size_max: String,
    pub uploaded_after: String,
    pub uploaded_before: String,
    pub search: String,
}

impl FilterState {
    /// All six keys with their values, empty ones included
    pub fn query_pairs(&self) -> [(&'static str, &str); 6] {
        [
            (FILTER_KEYS[0], self.file_type.as_str()),
            (FILTER_KEYS[1], self.size_min.as_str()),
            (FILTER_KEYS[2], self.size_max.as_str()),
            (FILTER_KEYS[3], self.uploaded_after.as_str()),
            (FILTER_KEYS[4], self.uploaded_before.as_str()),
            (FILTER_KEYS[5], self.search.as_str()),
        ]
    }

    /// True when any key holds a value
    pub fn is_active(&self) -> bool {
        self.query_pairs().iter().any(|(_, v)| !v.is_empty())
    }

    /// Copy with the panel-owned fields replaced and `search` kept
    pub fn with_fields(&self, fields: &FilterFields) -> Self {
        Self {
            file_type: fields.file_type.clone(),
            size_min: fields.size_min.clone(),
            size_max: fields.size_max.clone(),
            uploaded_after: fields.uploaded_after.clone(),
            uploaded_before: fields.uploaded_before.clone(),
            search: self.search.clone(),
        }
    }

    /// Copy with `search` replaced
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self.clone()
        }
    }
}

/// What the filter panel reports: its complete mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterFields {
    pub file_type: String,
    pub size_min: String,
    pub size_max: String,
    pub uploaded_after: String,
    pub uploaded_before: String,
}

/// File type choices offered by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileTypeOption {
    #[default]
    All,
    Pdf,
    Jpeg,
    Png,
    Text,
}

impl FileTypeOption {
    pub const ALL: [FileTypeOption; 5] = [
        FileTypeOption::All,
        FileTypeOption::Pdf,
        FileTypeOption::Jpeg,
        FileTypeOption::Png,
        FileTypeOption::Text,
    ];

    /// Value sent as `file_type`
    pub fn mime(self) -> &'static str {
        match self {
            FileTypeOption::All => "",
            FileTypeOption::Pdf => "application/pdf",
            FileTypeOption::Jpeg => "image/jpeg",
            FileTypeOption::Png => "image/png",
            FileTypeOption::Text => "text/plain",
        }
    }
}

impl fmt::Display for FileTypeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileTypeOption::All => "All Types",
            FileTypeOption::Pdf => "PDF",
            FileTypeOption::Jpeg => "JPEG",
            FileTypeOption::Png => "PNG",
            FileTypeOption::Text => "Text",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    UploadedAfter,
    UploadedBefore,
}

/// Turn a calendar date (`YYYY-MM-DD`) into a UTC midnight timestamp.
/// Empty or unparseable input yields an empty string.
pub fn to_utc_midnight(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(day) => format!("{}T00:00:00Z", day.format("%Y-%m-%d")),
        Err(_) => String::new(),
    }
}

/// The filter form
///
/// Holds what the user typed; `fields()` is what gets reported. Every edit
/// method returns the complete report so the caller can forward it.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    file_type: FileTypeOption,
    size_min: String,
    size_max: String,
    after_input: String,
    before_input: String,
}

impl FilterPanel {
    /// Create the panel along with its initial (all-empty) report
    pub fn mount() -> (Self, FilterFields) {
        let panel = Self::default();
        let fields = panel.fields();
        (panel, fields)
    }

    /// The complete mapping as reported upward
    pub fn fields(&self) -> FilterFields {
        FilterFields {
            file_type: self.file_type.mime().to_string(),
            size_min: self.size_min.clone(),
            size_max: self.size_max.clone(),
            uploaded_after: to_utc_midnight(&self.after_input),
            uploaded_before: to_utc_midnight(&self.before_input),
        }
    }

    pub fn select_file_type(&mut self, option: FileTypeOption) -> FilterFields {
        self.file_type = option;
        self.fields()
    }

    /// Edit a size bound. Input containing anything but digits is ignored
    /// and yields no report.
    pub fn edit_size(&mut self, field: SizeField, value: String) -> Option<FilterFields> {
        if !value.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match field {
            SizeField::Min => self.size_min = value,
            SizeField::Max => self.size_max = value,
        }
        Some(self.fields())
    }

    pub fn edit_date(&mut self, field: DateField, value: String) -> FilterFields {
        match field {
            DateField::UploadedAfter => self.after_input = value,
            DateField::UploadedBefore => self.before_input = value,
        }
        self.fields()
    }

    /// Reset every field
    pub fn clear(&mut self) -> FilterFields {
        *self = Self::default();
        self.fields()
    }

    pub fn file_type(&self) -> FileTypeOption {
        self.file_type
    }

    pub fn size(&self, field: SizeField) -> &str {
        match field {
            SizeField::Min => &self.size_min,
            SizeField::Max => &self.size_max,
        }
    }

    /// Raw text of a date input
    pub fn date_input(&self, field: DateField) -> &str {
        match field {
            DateField::UploadedAfter => &self.after_input,
            DateField::UploadedBefore => &self.before_input,
        }
    }

    /// True when the text typed into a date input is neither empty nor a date
    pub fn date_is_incomplete(&self, field: DateField) -> bool {
        let input = self.date_input(field).trim();
        !input.is_empty() && to_utc_midnight(input).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_reports_empty_defaults() {
        let (panel, fields) = FilterPanel::mount();
        assert_eq!(fields, FilterFields::default());
        assert_eq!(panel.file_type(), FileTypeOption::All);
    }

    #[test]
    fn test_date_becomes_utc_midnight() {
        let (mut panel, _) = FilterPanel::mount();

        let fields = panel.edit_date(DateField::UploadedAfter, "2024-01-15".into());
        assert_eq!(fields.uploaded_after, "2024-01-15T00:00:00Z");
        assert_eq!(fields.uploaded_before, "");

        let fields = panel.edit_date(DateField::UploadedBefore, "2024-02-29".into());
        assert_eq!(fields.uploaded_before, "2024-02-29T00:00:00Z");
    }

    #[test]
    fn test_clearing_date_reports_empty() {
        let (mut panel, _) = FilterPanel::mount();
        panel.edit_date(DateField::UploadedAfter, "2024-01-15".into());

        let fields = panel.edit_date(DateField::UploadedAfter, String::new());
        assert_eq!(fields.uploaded_after, "");
    }

    #[test]
    fn test_partial_date_reports_empty_but_keeps_input() {
        let (mut panel, _) = FilterPanel::mount();

        let fields = panel.edit_date(DateField::UploadedAfter, "2024-0".into());
        assert_eq!(fields.uploaded_after, "");
        assert_eq!(panel.date_input(DateField::UploadedAfter), "2024-0");
        assert!(panel.date_is_incomplete(DateField::UploadedAfter));

        assert_eq!(to_utc_midnight("2023-02-30"), "");
    }

    #[test]
    fn test_other_fields_are_not_transformed() {
        let (mut panel, _) = FilterPanel::mount();

        let fields = panel.select_file_type(FileTypeOption::Png);
        assert_eq!(fields.file_type, "image/png");

        let fields = panel.edit_size(SizeField::Min, "100".into()).unwrap();
        assert_eq!(fields.size_min, "100");
        assert_eq!(fields.file_type, "image/png");

        let fields = panel.edit_size(SizeField::Max, "2048".into()).unwrap();
        assert_eq!(fields.size_max, "2048");
    }

    #[test]
    fn test_non_numeric_size_is_ignored() {
        let (mut panel, _) = FilterPanel::mount();
        panel.edit_size(SizeField::Min, "12".into());

        assert!(panel.edit_size(SizeField::Min, "12a".into()).is_none());
        assert_eq!(panel.size(SizeField::Min), "12");

        let fields = panel.edit_size(SizeField::Min, String::new()).unwrap();
        assert_eq!(fields.size_min, "");
    }

    #[test]
    fn test_clear_resets_everything() {
        let (mut panel, _) = FilterPanel::mount();
        panel.select_file_type(FileTypeOption::Pdf);
        panel.edit_date(DateField::UploadedBefore, "2024-01-01".into());

        assert_eq!(panel.clear(), FilterFields::default());
        assert_eq!(panel.date_input(DateField::UploadedBefore), "");
    }

    #[test]
    fn test_filter_state_merging() {
        let state = FilterState::default().with_search("cat");
        let fields = FilterFields {
            file_type: "text/plain".into(),
            ..FilterFields::default()
        };

        let merged = state.with_fields(&fields);
        assert_eq!(merged.search, "cat");
        assert_eq!(merged.file_type, "text/plain");
        // The original is untouched
        assert_eq!(state.file_type, "");
    }

    #[test]
    fn test_filter_state_keys_always_present() {
        let state = FilterState::default();
        let pairs = state.query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, FILTER_KEYS);
        assert!(!FilterState::default().is_active());
        assert!(FilterState::default().with_search("x").is_active());
    }

    #[test]
    fn test_file_type_labels() {
        let labels: Vec<String> = FileTypeOption::ALL.iter().map(|o| o.to_string()).collect();
        assert_eq!(labels, ["All Types", "PDF", "JPEG", "PNG", "Text"]);
    }
}
