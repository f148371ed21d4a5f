use iced::widget::{column, container, horizontal_space, row, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod state;
mod tasks;
mod ui;

use api::{ApiClient, ApiError, FileApi, FileRecord, StorageStats, UploadOutcome};
use config::AppConfig;
use state::filter::{DateField, FileTypeOption, FilterFields, FilterPanel, SizeField};
use state::listing::{FileListView, ListTicket};
use state::notify::{Notification, Notifications};
use state::search::{self, DebounceTicket};
use state::upload::{SelectedFile, SubmitAction, UploadPanel};

/// Main application state
struct FileVault {
    /// The storage API, shared with running tasks
    api: Arc<dyn FileApi>,
    filter_panel: FilterPanel,
    list: FileListView,
    upload: UploadPanel,
    notifications: Notifications,
    /// Last storage statistics, if the server provided them
    stats: Option<StorageStats>,
    /// Non-duplicate uploads completed this session
    completed_uploads: usize,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Show or hide the filter panel
    ToggleFilters,
    FileTypeSelected(FileTypeOption),
    SizeChanged(SizeField, String),
    DateChanged(DateField, String),
    ClearFilters,
    /// Keystroke in the search box
    SearchChanged(String),
    /// A search debounce delay elapsed
    SearchSettled(DebounceTicket),
    /// A listing fetch finished, for the filter set it was issued with
    FilesLoaded(ListTicket, Result<Vec<FileRecord>, ApiError>),
    Refresh,
    DeleteRequested(String),
    DeleteFinished(String, Result<(), ApiError>),
    DownloadRequested(String),
    DownloadFinished(Result<PathBuf, ApiError>),
    /// User clicked "Choose a file"
    PickFile,
    /// Picker closed: nothing chosen, a file, or an unreadable path
    FilePicked(Option<Result<SelectedFile, String>>),
    UploadRequested,
    UploadFinished(Result<UploadOutcome, ApiError>),
    StatsLoaded(Result<StorageStats, ApiError>),
    DismissToast(u64),
    /// Periodic tick used to expire toasts
    Tick(Instant),
}

impl FileVault {
    /// Create the application and kick off the initial fetches
    fn new(api: Arc<dyn FileApi>) -> (Self, Task<Message>) {
        // The filter panel reports its defaults once on mount
        let (filter_panel, fields) = FilterPanel::mount();

        let mut app = FileVault {
            api,
            filter_panel,
            list: FileListView::new(),
            upload: UploadPanel::new(),
            notifications: Notifications::new(),
            stats: None,
            completed_uploads: 0,
        };

        let fetch = app.apply_filters(fields);
        let stats = app.refresh_stats();
        (app, Task::batch([fetch, stats]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ToggleFilters => {
                self.list.toggle_filters();
                Task::none()
            }
            Message::FileTypeSelected(option) => {
                let fields = self.filter_panel.select_file_type(option);
                self.apply_filters(fields)
            }
            Message::SizeChanged(field, value) => match self.filter_panel.edit_size(field, value) {
                Some(fields) => self.apply_filters(fields),
                None => Task::none(),
            },
            Message::DateChanged(field, value) => {
                let fields = self.filter_panel.edit_date(field, value);
                self.apply_filters(fields)
            }
            Message::ClearFilters => {
                let fields = self.filter_panel.clear();
                self.apply_filters(fields)
            }
            Message::SearchChanged(value) => {
                let ticket = self.list.edit_search(value);
                Task::perform(
                    search::settle_after(self.list.debounce_delay(), ticket),
                    Message::SearchSettled,
                )
            }
            Message::SearchSettled(ticket) => {
                let fetch = self.list.settle_search(ticket);
                self.fetch(fetch)
            }
            Message::FilesLoaded(ticket, result) => {
                let follow_up = self.list.files_loaded(ticket, result);
                self.fetch(follow_up)
            }
            Message::Refresh => {
                let fetch = self.list.invalidate();
                Task::batch([self.fetch(fetch), self.refresh_stats()])
            }
            Message::DeleteRequested(id) => {
                if !self.list.begin_delete(&id) {
                    return Task::none();
                }
                Task::perform(tasks::delete(self.api.clone(), id), |(id, result)| {
                    Message::DeleteFinished(id, result)
                })
            }
            Message::DeleteFinished(id, result) => {
                let deleted = result.is_ok();
                let (notification, refetch) = self.list.delete_finished(&id, result);
                self.notify(notification);

                let fetch = self.fetch(refetch);
                if deleted {
                    Task::batch([fetch, self.refresh_stats()])
                } else {
                    fetch
                }
            }
            Message::DownloadRequested(id) => match self.list.begin_download(&id) {
                Some((url, filename)) => Task::perform(
                    tasks::download(self.api.clone(), url, filename),
                    Message::DownloadFinished,
                ),
                None => Task::none(),
            },
            Message::DownloadFinished(result) => {
                let notification = self.list.download_finished(result);
                self.notify(notification);
                Task::none()
            }
            Message::PickFile => {
                if self.upload.is_uploading() {
                    return Task::none();
                }
                Task::perform(tasks::pick_file(), Message::FilePicked)
            }
            Message::FilePicked(None) => Task::none(),
            Message::FilePicked(Some(Ok(file))) => {
                if let Err(notification) = self.upload.select(file) {
                    self.notify(notification);
                }
                Task::none()
            }
            Message::FilePicked(Some(Err(reason))) => {
                self.notify(Notification::error(reason));
                Task::none()
            }
            Message::UploadRequested => match self.upload.submit() {
                SubmitAction::Start(file) => {
                    Task::perform(tasks::upload(self.api.clone(), file), Message::UploadFinished)
                }
                SubmitAction::Rejected(notification) => {
                    self.notify(notification);
                    Task::none()
                }
                SubmitAction::Busy => Task::none(),
            },
            Message::UploadFinished(result) => {
                let resolution = self.upload.finish(result);
                self.notify(resolution.notification);

                let mut follow_up = Vec::new();
                if resolution.invalidate {
                    let fetch = self.list.invalidate();
                    follow_up.push(self.fetch(fetch));
                }
                if resolution.notify_success {
                    follow_up.push(self.on_upload_success());
                }
                Task::batch(follow_up)
            }
            Message::StatsLoaded(Ok(stats)) => {
                self.stats = Some(stats);
                Task::none()
            }
            Message::StatsLoaded(Err(err)) => {
                tracing::warn!(error = %err, "storage stats unavailable");
                Task::none()
            }
            Message::DismissToast(id) => {
                self.notifications.dismiss(id);
                Task::none()
            }
            Message::Tick(now) => {
                self.notifications.expire(now);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("File Vault").size(28),
            horizontal_space(),
            text(self.stats_line()).size(14).color(ui::MUTED),
        ]
        .align_y(Alignment::Center);

        let body = row![
            container(ui::upload_panel::view(&self.upload))
                .width(Length::Fixed(320.0))
                .padding(16)
                .style(container::rounded_box),
            container(ui::file_list::view(&self.list, &self.filter_panel))
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(16)
                .style(container::rounded_box),
        ]
        .spacing(16)
        .height(Length::Fill);

        column![header, body, ui::toasts::view(&self.notifications)]
            .spacing(16)
            .padding(24)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }

    /// Tick once a second while toasts are on screen
    fn subscription(&self) -> Subscription<Message> {
        if self.notifications.is_empty() {
            Subscription::none()
        } else {
            iced::time::every(Duration::from_secs(1)).map(Message::Tick)
        }
    }

    /// Merge a filter panel report into the listing query
    fn apply_filters(&mut self, fields: FilterFields) -> Task<Message> {
        let fetch = self.list.apply_filters(&fields);
        self.fetch(fetch)
    }

    fn fetch(&self, ticket: Option<ListTicket>) -> Task<Message> {
        match ticket {
            Some(ticket) => Task::perform(
                tasks::fetch_files(self.api.clone(), ticket),
                |(ticket, result)| Message::FilesLoaded(ticket, result),
            ),
            None => Task::none(),
        }
    }

    fn refresh_stats(&self) -> Task<Message> {
        Task::perform(tasks::storage_stats(self.api.clone()), Message::StatsLoaded)
    }

    /// Runs after every non-duplicate upload
    fn on_upload_success(&mut self) -> Task<Message> {
        self.completed_uploads += 1;
        self.refresh_stats()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification, Instant::now());
    }

    fn stats_line(&self) -> String {
        let mut line = match &self.stats {
            Some(stats) => format!(
                "{} used · {} unique files · {} saved by deduplication",
                ui::format_megabytes(stats.total_used as f64),
                stats.unique_files,
                ui::format_megabytes(stats.saved_space)
            ),
            None => "Storage stats unavailable".to_string(),
        };
        if self.completed_uploads > 0 {
            line.push_str(&format!(" · {} uploaded this session", self.completed_uploads));
        }
        line
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, errors) = AppConfig::from_env();
    for err in &errors {
        tracing::warn!(error = %err, "ignoring invalid setting, using its default");
    }

    // Without an HTTP client there is nothing this app can do
    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "failed to build HTTP client");
            std::process::exit(1);
        }
    };
    tracing::info!(
        api = client.base_url(),
        downloads = %config.download_dir.display(),
        "File Vault starting"
    );
    let api: Arc<dyn FileApi> = Arc::new(client);

    iced::application("File Vault", FileVault::update, FileVault::view)
        .theme(FileVault::theme)
        .subscription(FileVault::subscription)
        .centered()
        .run_with(move || FileVault::new(api))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockFileApi, UploadStatus};
    use crate::state::cache::FetchTicket;
    use crate::state::filter::FilterState;
    use crate::state::listing::{ListStatus, GET_STARTED_HINT, NO_MATCHES_HINT};
    use crate::state::notify::Level;
    use crate::state::upload::MAX_UPLOAD_BYTES;

    /// The app with its mount-time fetch answered by `records`
    fn app_with(records: Vec<FileRecord>) -> FileVault {
        let (mut app, _) = FileVault::new(Arc::new(MockFileApi::new()));
        let initial = FetchTicket {
            key: FilterState::default(),
            epoch: 0,
        };
        let _ = app.update(Message::FilesLoaded(initial, Ok(records)));
        app
    }

    fn record(id: &str, name: &str) -> FileRecord {
        FileRecord {
            id: id.into(),
            original_filename: name.into(),
            file_type: "image/jpeg".into(),
            size: 1024,
            uploaded_at: "2023-01-01T00:00:00Z".parse().unwrap(),
            file: format!("http://test.com/{}", id),
            checksum: None,
            is_duplicate: None,
            original_file: None,
        }
    }

    fn selected(name: &str, size: u64) -> SelectedFile {
        SelectedFile {
            path: PathBuf::from(format!("/tmp/{}", name)),
            name: name.into(),
            size,
        }
    }

    fn outcome(status: UploadStatus, message: &str) -> UploadOutcome {
        UploadOutcome {
            status,
            message: message.into(),
            file: None,
            existing_file: None,
            original_filename: None,
            saved_bytes: None,
        }
    }

    #[test]
    fn test_mount_fetches_with_default_filters() {
        let (app, _) = FileVault::new(Arc::new(MockFileApi::new()));
        assert_eq!(app.list.filters(), &FilterState::default());
        assert!(app.list.is_fetching());
        assert_eq!(app.list.status(), ListStatus::Loading);
    }

    #[test]
    fn test_successful_upload_flow() {
        let mut app = app_with(vec![]);
        let _ = app.update(Message::FilePicked(Some(Ok(selected("test.jpg", 4)))));
        let _ = app.update(Message::UploadRequested);
        assert!(app.upload.is_uploading());

        let _ = app.update(Message::UploadFinished(Ok(outcome(UploadStatus::Success, "Uploaded"))));

        assert!(app.upload.selected().is_none());
        let last = app.notifications.last().unwrap();
        assert_eq!(last.level, Level::Success);
        assert_eq!(last.text, "Uploaded");
        // The listing was invalidated and is being fetched again
        assert!(app.list.is_fetching());
        assert_eq!(app.completed_uploads, 1);
    }

    #[test]
    fn test_duplicate_upload_flow() {
        let mut app = app_with(vec![]);
        let _ = app.update(Message::FilePicked(Some(Ok(selected("copy.png", 4)))));
        let _ = app.update(Message::UploadRequested);

        let mut dup = outcome(UploadStatus::Duplicate, "Duplicate found");
        dup.file = Some(record("9", "a.png"));
        dup.saved_bytes = Some(2097152);
        let _ = app.update(Message::UploadFinished(Ok(dup)));

        let last = app.notifications.last().unwrap();
        assert_eq!(last.level, Level::Warning);
        assert!(last.text.contains("a.png"));
        assert!(last.text.contains("2.00 MB"));
        assert_eq!(app.completed_uploads, 0);
        assert!(app.upload.selected().is_none());
    }

    #[test]
    fn test_failed_upload_keeps_selection() {
        let mut app = app_with(vec![]);
        let _ = app.update(Message::FilePicked(Some(Ok(selected("test.jpg", 4)))));
        let _ = app.update(Message::UploadRequested);
        let _ = app.update(Message::UploadFinished(Err(ApiError::Server {
            status: 500,
            message: "Server error: disk full".into(),
        })));

        assert_eq!(app.upload.selected().unwrap().name, "test.jpg");
        assert_eq!(app.notifications.last().unwrap().text, "Server error: disk full");
        assert!(!app.list.is_fetching());
    }

    #[test]
    fn test_oversized_pick_and_empty_submit_are_rejected() {
        let mut app = app_with(vec![]);
        let _ = app.update(Message::FilePicked(Some(Ok(selected("big.iso", MAX_UPLOAD_BYTES + 1)))));
        assert!(app.upload.selected().is_none());
        assert_eq!(app.notifications.last().unwrap().text, "File size exceeds 10MB limit");

        let _ = app.update(Message::UploadRequested);
        assert!(!app.upload.is_uploading());
        assert_eq!(app.notifications.last().unwrap().text, "Please select a file first");
    }

    #[test]
    fn test_list_fetch_error() {
        let (mut app, _) = FileVault::new(Arc::new(MockFileApi::new()));
        let initial = FetchTicket {
            key: FilterState::default(),
            epoch: 0,
        };
        let _ = app.update(Message::FilesLoaded(
            initial,
            Err(ApiError::Transport("Network Error".into())),
        ));

        assert_eq!(
            app.list.status(),
            ListStatus::Failed("Error loading files: Network Error".into())
        );
    }

    #[test]
    fn test_undecodable_listing_is_an_error_not_an_empty_list() {
        let (mut app, _) = FileVault::new(Arc::new(MockFileApi::new()));
        let initial = FetchTicket {
            key: FilterState::default(),
            epoch: 0,
        };
        let _ = app.update(Message::FilesLoaded(
            initial,
            Err(ApiError::Decode("file record 1: invalid type: null, expected a string".into())),
        ));

        assert_eq!(
            app.list.status(),
            ListStatus::Failed(
                "Error loading files: file record 1: invalid type: null, expected a string".into()
            )
        );
    }

    #[test]
    fn test_empty_states() {
        let mut app = app_with(vec![]);
        assert_eq!(app.list.status(), ListStatus::Empty { hint: GET_STARTED_HINT });

        // Typing alone already counts as narrowing the listing
        let _ = app.update(Message::SearchChanged("report".into()));
        assert_eq!(app.list.status(), ListStatus::Empty { hint: NO_MATCHES_HINT });
    }

    #[test]
    fn test_filter_edits_reach_the_fetch_key() {
        let mut app = app_with(vec![]);
        let _ = app.update(Message::DateChanged(DateField::UploadedAfter, "2024-01-15".into()));
        let _ = app.update(Message::FileTypeSelected(FileTypeOption::Pdf));

        let filters = app.list.filters();
        assert_eq!(filters.uploaded_after, "2024-01-15T00:00:00Z");
        assert_eq!(filters.file_type, "application/pdf");
        assert!(app.list.is_fetching());

        let _ = app.update(Message::ClearFilters);
        assert_eq!(app.list.filters(), &FilterState::default());
    }

    #[test]
    fn test_failed_delete_keeps_rows() {
        let mut app = app_with(vec![record("1", "a.jpg"), record("2", "b.jpg")]);
        let _ = app.update(Message::DeleteRequested("1".into()));
        assert!(app.list.is_deleting("1"));

        let _ = app.update(Message::DeleteFinished(
            "1".into(),
            Err(ApiError::Transport("Network Error".into())),
        ));

        assert_eq!(app.notifications.last().unwrap().level, Level::Error);
        assert_eq!(app.list.rows().len(), 2);
        assert!(!app.list.is_fetching());
    }

    #[test]
    fn test_successful_delete_refetches() {
        let mut app = app_with(vec![record("1", "a.jpg")]);
        let _ = app.update(Message::DeleteRequested("1".into()));
        let _ = app.update(Message::DeleteFinished("1".into(), Ok(())));

        assert_eq!(app.notifications.last().unwrap().text, "File deleted successfully");
        assert!(app.list.is_fetching());
    }

    #[test]
    fn test_download_result_is_reported() {
        let mut app = app_with(vec![record("1", "a.jpg")]);
        let _ = app.update(Message::DownloadRequested("1".into()));
        assert!(app.list.is_downloading());

        let _ = app.update(Message::DownloadFinished(Ok(PathBuf::from("/home/me/Downloads/a.jpg"))));
        assert!(!app.list.is_downloading());
        assert!(app.notifications.last().unwrap().text.contains("a.jpg"));
    }

    #[test]
    fn test_toasts_expire_on_tick() {
        let mut app = app_with(vec![]);
        let _ = app.update(Message::UploadRequested);
        assert!(!app.notifications.is_empty());

        let _ = app.update(Message::Tick(Instant::now() + Duration::from_secs(10)));
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_stats_line() {
        let mut app = app_with(vec![]);
        assert_eq!(app.stats_line(), "Storage stats unavailable");

        let _ = app.update(Message::StatsLoaded(Ok(StorageStats {
            total_used: 3 * 1024 * 1024,
            unique_files: 2,
            saved_space: 1048576.0,
        })));
        assert_eq!(
            app.stats_line(),
            "3.00 MB used · 2 unique files · 1.00 MB saved by deduplication"
        );
    }
}
