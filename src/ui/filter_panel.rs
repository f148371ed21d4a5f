use iced::widget::{button, column, pick_list, row, text, text_input};
use iced::{Alignment, Element, Length};

use super::{DANGER, MUTED};
use crate::state::filter::{DateField, FileTypeOption, FilterPanel, SizeField};
use crate::Message;

/// The filter form: type, size range, upload date range
pub fn view(panel: &FilterPanel) -> Element<Message> {
    let file_type = labeled(
        "File Type",
        pick_list(FileTypeOption::ALL, Some(panel.file_type()), Message::FileTypeSelected)
            .width(Length::Fill)
            .into(),
    );

    let size_min = labeled("Min Size (bytes)", size_input(panel, SizeField::Min, "Min size"));
    let size_max = labeled("Max Size (bytes)", size_input(panel, SizeField::Max, "Max size"));
    let after = labeled("Uploaded After", date_input(panel, DateField::UploadedAfter));
    let before = labeled("Uploaded Before", date_input(panel, DateField::UploadedBefore));

    column![
        row![file_type, size_min, size_max].spacing(12),
        row![after, before].spacing(12),
        row![button(text("Clear filters")).style(button::secondary).on_press(Message::ClearFilters)]
            .align_y(Alignment::Center),
    ]
    .spacing(12)
    .into()
}

fn labeled<'a>(label: &'a str, control: Element<'a, Message>) -> Element<'a, Message> {
    column![text(label).size(13).color(MUTED), control]
        .spacing(4)
        .width(Length::Fill)
        .into()
}

fn size_input<'a>(panel: &'a FilterPanel, field: SizeField, placeholder: &'a str) -> Element<'a, Message> {
    text_input(placeholder, panel.size(field))
        .on_input(move |value| Message::SizeChanged(field, value))
        .padding(8)
        .into()
}

fn date_input(panel: &FilterPanel, field: DateField) -> Element<Message> {
    let input = text_input("YYYY-MM-DD", panel.date_input(field))
        .on_input(move |value| Message::DateChanged(field, value))
        .padding(8);

    if panel.date_is_incomplete(field) {
        column![input, text("Not a date yet, ignored").size(12).color(DANGER)]
            .spacing(2)
            .into()
    } else {
        input.into()
    }
}
