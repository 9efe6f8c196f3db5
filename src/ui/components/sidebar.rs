use eframe::egui;

use crate::messaging::MessagingSession;

#[derive(Default)]
pub struct SidebarActions {
    pub guest_name: Option<String>,
    pub search: Option<String>,
    pub select: Option<String>,
    pub sign_out: bool,
}

pub fn render(
    ui: &mut egui::Ui,
    session: &mut MessagingSession,
    guest_input: &mut String,
) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.heading("Conversations");
    ui.separator();

    // Who we are
    if session.is_authenticated() {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Signed in as {}",
                session.active_username().unwrap_or_default()
            ));
            if ui.button("Sign out").clicked() {
                actions.sign_out = true;
            }
        });
    } else {
        ui.label("Guest name:");
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(guest_input);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Use").clicked() || submitted {
                actions.guest_name = Some(guest_input.trim().to_string());
            }
        });
        match session.active_username() {
            Some(name) => ui.label(egui::RichText::new(format!("Messaging as {name}")).weak()),
            None => ui.label(egui::RichText::new("Enter a name or sign in to start").weak()),
        };
    }

    ui.separator();

    // Find someone to talk to
    let can_search = session.can_search();
    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            can_search,
            egui::TextEdit::singleline(&mut session.search_input).hint_text("Search username..."),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.add_enabled(can_search, egui::Button::new("Search")).clicked() || submitted {
            let candidate = session.search_input.trim().to_string();
            if !candidate.is_empty() {
                actions.search = Some(candidate);
            }
        }
    });
    if session.is_searching() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(egui::RichText::new("Looking up user...").weak());
        });
    } else if let Some(err) = session.search_error() {
        ui.colored_label(egui::Color32::RED, err.to_string());
    }

    ui.separator();

    if session.directory().is_empty() {
        ui.label("No conversations yet");
        return actions;
    }

    egui::ScrollArea::vertical()
        .id_salt("conversation_directory")
        .show(ui, |ui| {
            for partner in session.directory().partners() {
                let selected = session.selected_partner() == Some(partner.as_str());
                if ui.selectable_label(selected, partner.as_str()).clicked() {
                    actions.select = Some(partner.clone());
                }
            }
        });

    actions
}
