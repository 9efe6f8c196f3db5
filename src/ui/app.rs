use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::{mpsc, watch};

use crate::common::ApiEvent;
use crate::messaging::{MessagingSession, ScrollSync};
use crate::storage::{AuthSession, IdentityProvider};

use super::components::{
    composer, transcript_view,
    sidebar::{self, SidebarActions},
};

/// Polling interval for worker results while the window is idle.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct MessagesApp {
    session: MessagingSession,
    scroll: ScrollSync,
    guest_input: String,
    event_receiver: mpsc::Receiver<ApiEvent>,
    identity_provider: Arc<IdentityProvider>,
    identity_updates: watch::Receiver<Option<AuthSession>>,
}

impl MessagesApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        session: MessagingSession,
        event_receiver: mpsc::Receiver<ApiEvent>,
        identity_provider: Arc<IdentityProvider>,
    ) -> Self {
        let identity_updates = identity_provider.subscribe();
        let guest_input = session.guest_username().to_string();
        Self {
            session,
            scroll: ScrollSync::new(),
            guest_input,
            event_receiver,
            identity_provider,
            identity_updates,
        }
    }

    fn handle_api_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.session.apply_event(event);
        }
    }

    fn handle_identity_changes(&mut self) {
        match self.identity_updates.has_changed() {
            Ok(true) => {
                let identity = self
                    .identity_updates
                    .borrow_and_update()
                    .as_ref()
                    .map(AuthSession::identity);
                self.session.set_identity(identity);
            }
            Ok(false) => {}
            Err(err) => log::warn!("Identity provider went away: {err}"),
        }
    }

    fn apply_sidebar_actions(&mut self, actions: SidebarActions) {
        if let Some(name) = actions.guest_name {
            self.session.set_guest_username(&name);
        }
        if let Some(candidate) = actions.search {
            self.session.search_partner(&candidate);
        }
        if let Some(partner) = actions.select {
            self.session.select_partner(&partner);
        }
        if actions.sign_out {
            if let Err(err) = self.identity_provider.sign_out() {
                log::error!("Failed to sign out: {err}");
            }
        }
    }
}

impl eframe::App for MessagesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_identity_changes();
        self.handle_api_events();

        egui::SidePanel::left("conversation_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                let actions = sidebar::render(ui, &mut self.session, &mut self.guest_input);
                self.apply_sidebar_actions(actions);
            });

        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(4.0);
            let enabled = self.session.can_send();
            let sending = self.session.sends_in_flight();
            let error = self.session.send_error().cloned();
            if let Some(content) = composer::render(
                ui,
                &mut self.session.composer,
                enabled,
                sending,
                error.as_ref(),
            ) {
                self.session.send_message(&content);
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.session.selected_partner().unwrap_or("Messages"));
                if self.session.selected_partner().is_some() && ui.button("Refresh").clicked() {
                    self.session.refresh();
                }
            });
            ui.separator();
            transcript_view::render(ui, &self.session, &mut self.scroll);
        });

        ctx.request_repaint_after(EVENT_POLL_INTERVAL);
    }
}
