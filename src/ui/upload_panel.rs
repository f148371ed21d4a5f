use iced::widget::{button, column, container, text};
use iced::{Alignment, Element, Length};

use super::{format_kilobytes, DANGER, MUTED};
use crate::state::upload::UploadPanel;
use crate::Message;

pub fn view(panel: &UploadPanel) -> Element<Message> {
    let uploading = panel.is_uploading();

    let picker = container(
        column![
            button(text("Choose a file"))
                .style(button::secondary)
                .on_press_maybe((!uploading).then_some(Message::PickFile)),
            text("Any file up to 10MB").size(12).color(MUTED),
        ]
        .spacing(6)
        .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .center_x(Length::Fill)
    .padding(24)
    .style(container::rounded_box);

    let mut content = column![text("Upload File").size(22), picker].spacing(16);

    if let Some(file) = panel.selected() {
        content = content.push(
            text(format!("Selected: {} ({})", file.name, format_kilobytes(file.size)))
                .size(14)
                .color(MUTED),
        );
    }

    if let Some(error) = panel.last_error() {
        content = content.push(text(format!("Last attempt failed: {}", error)).size(13).color(DANGER));
    }

    let label = if uploading { "Uploading..." } else { "Upload" };
    let submit = button(text(label))
        .width(Length::Fill)
        .style(button::primary)
        .on_press_maybe((!uploading).then_some(Message::UploadRequested));

    content.push(submit).into()
}
