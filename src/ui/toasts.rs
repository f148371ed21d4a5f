use iced::widget::{button, container, row, text, Column};
use iced::{Alignment, Element, Length};

use super::{DANGER, SUCCESS, WARNING};
use crate::state::notify::{Level, Notifications, Toast};
use crate::Message;

/// Live notifications, newest last
pub fn view(notifications: &Notifications) -> Element<Message> {
    Column::with_children(notifications.iter().map(toast))
        .spacing(6)
        .width(Length::Fill)
        .into()
}

fn toast(item: &Toast) -> Element<Message> {
    let (marker, color) = match item.notification.level {
        Level::Success => ("✓", SUCCESS),
        Level::Warning => ("⚠", WARNING),
        Level::Error => ("✕", DANGER),
    };

    container(
        row![
            text(marker).color(color),
            text(item.notification.text.as_str()).color(color).width(Length::Fill),
            button(text("Dismiss").size(12))
                .style(button::text)
                .on_press(Message::DismissToast(item.id)),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .padding(8)
    .style(container::rounded_box)
    .into()
}

