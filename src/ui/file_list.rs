use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use super::{filter_panel, format_kilobytes, format_timestamp, DANGER, MUTED};
use crate::api::FileRecord;
use crate::state::filter::FilterPanel;
use crate::state::listing::{FileListView, ListStatus, NO_FILES_TITLE};
use crate::Message;

/// Header with search and filter toggle, optional filter panel, then the rows
pub fn view<'a>(list: &'a FileListView, filters: &'a FilterPanel) -> Element<'a, Message> {
    let filter_label = if list.show_filters() { "Hide filters" } else { "Filters" };
    let header = row![
        text("Uploaded Files").size(22),
        horizontal_space(),
        text_input("Search files...", list.search_input())
            .on_input(Message::SearchChanged)
            .padding(8)
            .width(Length::Fixed(240.0)),
        button(text(filter_label)).style(button::secondary).on_press(Message::ToggleFilters),
        button(text("Refresh"))
            .style(button::secondary)
            .on_press_maybe((!list.is_fetching()).then_some(Message::Refresh)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut content = column![header].spacing(16);

    if list.show_filters() {
        content = content.push(
            container(filter_panel::view(filters))
                .padding(12)
                .style(container::rounded_box),
        );
    }

    content = content.push(body(list));
    content.into()
}

fn body(list: &FileListView) -> Element<Message> {
    match list.status() {
        ListStatus::Loading => text("Loading files...").into(),
        ListStatus::Failed(message) => text(message).color(DANGER).into(),
        ListStatus::Empty { hint } => container(
            column![text(NO_FILES_TITLE).size(16), text(hint).size(14).color(MUTED)]
                .spacing(4)
                .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(48)
        .into(),
        ListStatus::Rows(records) => {
            let rows = Column::with_children(records.iter().map(|r| file_row(r, list)))
                .spacing(12);
            scrollable(rows).height(Length::Fill).into()
        }
    }
}

fn file_row<'a>(record: &FileRecord, list: &FileListView) -> Element<'a, Message> {
    let details = column![
        text(record.original_filename.clone()).size(16),
        text(format!("{} • {}", record.file_type, format_kilobytes(record.size)))
            .size(13)
            .color(MUTED),
        text(format!("Uploaded {}", format_timestamp(&record.uploaded_at)))
            .size(13)
            .color(MUTED),
    ]
    .spacing(2);

    let download = button(text("Download"))
        .style(button::primary)
        .on_press_maybe((!list.is_downloading()).then(|| Message::DownloadRequested(record.id.clone())));
    let delete = button(text("Delete"))
        .style(button::danger)
        .on_press_maybe((!list.is_deleting(&record.id)).then(|| Message::DeleteRequested(record.id.clone())));

    container(
        row![details, horizontal_space(), download, delete]
            .spacing(8)
            .align_y(Alignment::Center),
    )
    .padding(8)
    .into()
}
