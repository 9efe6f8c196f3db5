use eframe::egui;

use crate::error::MessagingError;

/// Returns the trimmed text when the user submits. The text stays in the
/// field until the server confirms the send.
pub fn render(
    ui: &mut egui::Ui,
    composer: &mut String,
    enabled: bool,
    sending: usize,
    error: Option<&MessagingError>,
) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(composer).hint_text("Type your message..."),
        );
        if ui.add_enabled(enabled, egui::Button::new("Send")).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if let Some(err) = error {
        ui.colored_label(egui::Color32::RED, err.to_string());
    } else if sending > 0 {
        ui.label(egui::RichText::new(format!("Sending {sending}...")).weak());
    }

    let content = composer.trim();
    if send && enabled && !content.is_empty() {
        return Some(content.to_string());
    }

    None
}
