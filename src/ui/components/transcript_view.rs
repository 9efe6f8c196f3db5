use eframe::egui;

use crate::common::Message;
use crate::messaging::{MessagingSession, ScrollSync, TranscriptStatus};

const OWN_BUBBLE: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);

pub fn render(ui: &mut egui::Ui, session: &MessagingSession, scroll: &mut ScrollSync) {
    let transcript = session.transcript();
    scroll.observe(transcript.revision());
    let scroll_to_bottom = scroll.take_pending_scroll();

    match transcript.status() {
        TranscriptStatus::Idle => {
            ui.label("Select a conversation or search for a user to start messaging.");
            return;
        }
        TranscriptStatus::LoadFailed(err) => {
            ui.colored_label(egui::Color32::RED, err.to_string());
            // Sends confirmed after the failure still show below it.
            if transcript.messages().is_empty() {
                return;
            }
        }
        TranscriptStatus::Loading if transcript.messages().is_empty() => {
            ui.label("Loading messages...");
            return;
        }
        TranscriptStatus::Loading | TranscriptStatus::Loaded => {}
    }

    if transcript.messages().is_empty() {
        ui.label(egui::RichText::new("No messages yet. Start a conversation!").weak());
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("transcript")
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            let last = transcript.messages().len() - 1;
            for (index, message) in transcript.messages().iter().enumerate() {
                let response = bubble(ui, message, session.is_from_active_user(message));
                if scroll_to_bottom && index == last {
                    response.scroll_to_me(Some(egui::Align::BOTTOM));
                }
            }
        });
}

fn bubble(ui: &mut egui::Ui, message: &Message, from_active_user: bool) -> egui::Response {
    let (layout, fill, text_color) = if from_active_user {
        (
            egui::Layout::right_to_left(egui::Align::TOP),
            OWN_BUBBLE,
            egui::Color32::WHITE,
        )
    } else {
        (
            egui::Layout::left_to_right(egui::Align::TOP),
            ui.visuals().faint_bg_color,
            ui.visuals().text_color(),
        )
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::new()
            .fill(fill)
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.7);
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&message.content).color(text_color));
                    ui.label(
                        egui::RichText::new(message.timestamp.format("%Y-%m-%d %H:%M").to_string())
                            .small()
                            .color(text_color.gamma_multiply(0.7)),
                    );
                });
            });
    })
    .response
}
