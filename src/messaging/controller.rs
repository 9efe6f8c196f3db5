use tokio::sync::mpsc;

use crate::common::{
    ApiCommand, ApiEvent, Conversation, Identity, LookupTicket, Message, SendTicket,
};
use crate::error::MessagingError;

use super::directory::ConversationDirectory;
use super::identity::IdentityResolver;
use super::transcript::{TranscriptStatus, TranscriptStore};

const SERVICE_UNAVAILABLE: &str = "Messaging service is unavailable";

/// View state of the messages screen and the operations the UI may invoke.
///
/// Nothing here awaits: requests go out as tagged [`ApiCommand`]s and their
/// results come back through [`MessagingSession::apply_event`], which commits
/// only results whose tag still matches what is on screen.
pub struct MessagingSession {
    identity: IdentityResolver,
    directory: ConversationDirectory,
    transcript: TranscriptStore,
    selected_partner: Option<String>,
    pub search_input: String,
    pub composer: String,
    search_error: Option<MessagingError>,
    send_error: Option<MessagingError>,
    /// Latest lookup only; a newer search supersedes it.
    pending_lookup: Option<LookupTicket>,
    next_lookup_seq: u64,
    /// Sends awaiting their server confirmation, by seq.
    pending_sends: Vec<u64>,
    next_send_seq: u64,
    command_sender: mpsc::Sender<ApiCommand>,
}

impl MessagingSession {
    pub fn new(identity: Option<Identity>, command_sender: mpsc::Sender<ApiCommand>) -> Self {
        Self {
            identity: IdentityResolver::new(identity),
            directory: ConversationDirectory::default(),
            transcript: TranscriptStore::new(),
            selected_partner: None,
            search_input: String::new(),
            composer: String::new(),
            search_error: None,
            send_error: None,
            pending_lookup: None,
            next_lookup_seq: 0,
            pending_sends: Vec::new(),
            next_send_seq: 0,
            command_sender,
        }
    }

    // ========== State ==========

    pub fn active_username(&self) -> Option<&str> {
        self.identity.active_username()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }

    pub fn guest_username(&self) -> &str {
        self.identity.guest_username()
    }

    pub fn directory(&self) -> &ConversationDirectory {
        &self.directory
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn selected_partner(&self) -> Option<&str> {
        self.selected_partner.as_deref()
    }

    pub fn search_error(&self) -> Option<&MessagingError> {
        self.search_error.as_ref()
    }

    pub fn send_error(&self) -> Option<&MessagingError> {
        self.send_error.as_ref()
    }

    pub fn load_error(&self) -> Option<&MessagingError> {
        match self.transcript.status() {
            TranscriptStatus::LoadFailed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_from_active_user(&self, message: &Message) -> bool {
        self.active_username()
            .is_some_and(|active| message.is_from(active))
    }

    pub fn can_search(&self) -> bool {
        self.active_username().is_some()
    }

    pub fn can_send(&self) -> bool {
        self.active_username().is_some() && self.selected_partner.is_some()
    }

    pub fn is_searching(&self) -> bool {
        self.pending_lookup.is_some()
    }

    pub fn sends_in_flight(&self) -> usize {
        self.pending_sends.len()
    }

    // ========== Operations ==========

    /// Look `candidate` up and open a conversation with them if they exist.
    /// Supersedes any lookup still in flight.
    pub fn search_partner(&mut self, candidate: &str) {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return;
        }
        let Some(active) = self.active_username().map(str::to_string) else {
            return;
        };
        if candidate == active {
            self.search_error = Some(MessagingError::SelfMessage);
            return;
        }

        self.search_error = None;
        self.next_lookup_seq += 1;
        let ticket = LookupTicket {
            seq: self.next_lookup_seq,
            requested_by: active,
            candidate: candidate.to_string(),
        };
        self.pending_lookup = Some(ticket.clone());

        if !self.dispatch(ApiCommand::CheckUser(ticket)) {
            self.pending_lookup = None;
            self.search_error = Some(MessagingError::Lookup(SERVICE_UNAVAILABLE.to_string()));
        }
    }

    /// Switch to a partner already listed in the directory.
    pub fn select_partner(&mut self, partner: &str) {
        if !self.directory.contains(partner) {
            log::warn!("Ignoring selection of unknown partner {partner}");
            return;
        }
        if self.selected_partner.as_deref() == Some(partner) {
            return;
        }
        self.selected_partner = Some(partner.to_string());
        self.send_error = None;
        self.start_load();
    }

    pub fn send_message(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() || !self.can_send() {
            return;
        }
        let (Some(active), Some(partner)) = (self.active_username(), self.selected_partner())
        else {
            return;
        };
        let conversation = Conversation::new(active, partner);

        self.next_send_seq += 1;
        let ticket = SendTicket {
            seq: self.next_send_seq,
            conversation,
            content: content.to_string(),
        };
        let seq = ticket.seq;
        self.send_error = None;
        self.pending_sends.push(seq);

        if !self.dispatch(ApiCommand::SendMessage(ticket)) {
            self.pending_sends.retain(|pending| *pending != seq);
            self.send_error = Some(MessagingError::Send(SERVICE_UNAVAILABLE.to_string()));
        }
    }

    /// Re-fetch the displayed conversation.
    pub fn refresh(&mut self) {
        if self.selected_partner.is_some() {
            self.start_load();
        }
    }

    pub fn set_guest_username(&mut self, name: &str) {
        let before = self.active_username().map(str::to_string);
        self.identity.set_guest_username(name);
        self.on_active_user_changed(before);
    }

    pub fn set_identity(&mut self, identity: Option<Identity>) {
        let before = self.active_username().map(str::to_string);
        self.identity.set_identity(identity);
        self.on_active_user_changed(before);
    }

    // ========== Results ==========

    pub fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::UserChecked { ticket, result } => {
                if self.pending_lookup.as_ref() != Some(&ticket) {
                    log::debug!("Discarding superseded lookup for {}", ticket.candidate);
                    return;
                }
                self.pending_lookup = None;
                if self.active_username() != Some(ticket.requested_by.as_str()) {
                    log::debug!(
                        "Discarding lookup for {} issued as {}",
                        ticket.candidate,
                        ticket.requested_by
                    );
                    return;
                }

                match result {
                    Ok(true) => {
                        self.search_error = None;
                        self.open_found_partner(ticket.candidate);
                    }
                    Ok(false) => {
                        self.search_error = Some(MessagingError::UserNotFound(ticket.candidate));
                    }
                    Err(err) => {
                        log::warn!("User lookup for {} failed: {err}", ticket.candidate);
                        self.search_error = Some(MessagingError::Lookup(err.to_string()));
                    }
                }
            }
            ApiEvent::HistoryLoaded { ticket, result } => {
                let loaded = result.is_ok();
                let result = result.map_err(|err| {
                    log::warn!(
                        "Loading history with {} failed: {err}",
                        ticket.conversation.partner
                    );
                    MessagingError::Load(err.to_string())
                });

                if !self.transcript.commit_load(&ticket, result) {
                    log::debug!(
                        "Discarding stale history for {} (generation {})",
                        ticket.conversation.partner,
                        ticket.generation
                    );
                    return;
                }
                if loaded {
                    self.remember_partner(&ticket.conversation.partner);
                }
            }
            ApiEvent::MessageSent { ticket, result } => {
                let Some(index) = self.pending_sends.iter().position(|seq| *seq == ticket.seq)
                else {
                    log::warn!("Ignoring result for unknown send #{}", ticket.seq);
                    return;
                };
                self.pending_sends.remove(index);

                match result {
                    Ok(message) => {
                        self.send_error = None;
                        if !self.transcript.append_confirmed(&ticket.conversation, message) {
                            log::debug!(
                                "Sent message to {} is not on screen; it arrives with the next load",
                                ticket.conversation.partner
                            );
                        }
                        if self.composer.trim() == ticket.content {
                            self.composer.clear();
                        }
                    }
                    Err(err) => {
                        log::warn!("Sending to {} failed: {err}", ticket.conversation.partner);
                        self.send_error = Some(MessagingError::Send(err.to_string()));
                    }
                }
            }
        }
    }

    // ========== Internals ==========

    fn open_found_partner(&mut self, partner: String) {
        if self.search_input.trim() == partner {
            self.search_input.clear();
        }
        self.remember_partner(&partner);
        if self.selected_partner.as_deref() != Some(partner.as_str()) {
            self.send_error = None;
        }
        self.selected_partner = Some(partner);
        self.start_load();
    }

    fn remember_partner(&mut self, partner: &str) {
        if self.directory.insert(partner) {
            log::debug!("Added {partner} to the conversation directory");
        }
    }

    fn start_load(&mut self) {
        let (Some(active), Some(partner)) = (self.active_username(), self.selected_partner())
        else {
            self.transcript.reset();
            return;
        };

        let conversation = Conversation::new(active, partner);
        let ticket = self.transcript.begin_load(conversation);
        if !self.dispatch(ApiCommand::LoadHistory(ticket.clone())) {
            self.transcript.commit_load(
                &ticket,
                Err(MessagingError::Load(SERVICE_UNAVAILABLE.to_string())),
            );
        }
    }

    fn on_active_user_changed(&mut self, before: Option<String>) {
        if before.as_deref() == self.active_username() {
            return;
        }
        log::info!(
            "Active user changed from {:?} to {:?}",
            before,
            self.active_username()
        );

        if self.selected_partner.is_some() && self.selected_partner() == self.active_username() {
            self.selected_partner = None;
        }
        self.start_load();
    }

    fn dispatch(&self, command: ApiCommand) -> bool {
        match self.command_sender.try_send(command) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to hand command to API worker: {err}");
                false
            }
        }
    }
}
