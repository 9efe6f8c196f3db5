use crate::common::{Conversation, LoadTicket, Message};
use crate::error::MessagingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptStatus {
    /// No partner selected.
    Idle,
    Loading,
    Loaded,
    LoadFailed(MessagingError),
}

/// Messages of the conversation currently on screen.
///
/// A load replaces the list wholesale; a confirmed send appends to it. Every
/// history fetch is tagged with a generation and only the newest one may
/// commit, so a slow response for a previous partner never overwrites the
/// current one.
#[derive(Debug)]
pub struct TranscriptStore {
    conversation: Option<Conversation>,
    messages: Vec<Message>,
    status: TranscriptStatus,
    generation: u64,
    /// Bumped on every change to `messages`; the view scrolls when it moves.
    revision: u64,
    /// Sends confirmed while a load for the same conversation was in flight.
    confirmed_during_load: Vec<Message>,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self {
            conversation: None,
            messages: Vec::new(),
            status: TranscriptStatus::Idle,
            generation: 0,
            revision: 0,
            confirmed_during_load: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn status(&self) -> &TranscriptStatus {
        &self.status
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Start loading `conversation`. Switching conversations clears the list
    /// right away; refreshing the same one keeps it visible until the reply.
    pub fn begin_load(&mut self, conversation: Conversation) -> LoadTicket {
        self.generation += 1;
        if self.conversation.as_ref() != Some(&conversation) && !self.messages.is_empty() {
            self.messages.clear();
            self.revision += 1;
        }
        self.confirmed_during_load.clear();
        self.conversation = Some(conversation.clone());
        self.status = TranscriptStatus::Loading;

        LoadTicket {
            generation: self.generation,
            conversation,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
            && self.conversation.as_ref() == Some(&ticket.conversation)
    }

    /// Apply a finished load. Returns `false`, changing nothing, if `ticket` is stale.
    pub fn commit_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Message>, MessagingError>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        match result {
            Ok(mut history) => {
                for confirmed in self.confirmed_during_load.drain(..) {
                    if !history.iter().any(|message| message.id == confirmed.id) {
                        history.push(confirmed);
                    }
                }
                self.messages = history;
                self.status = TranscriptStatus::Loaded;
            }
            Err(err) => {
                self.messages.clear();
                self.confirmed_during_load.clear();
                self.status = TranscriptStatus::LoadFailed(err);
            }
        }
        self.revision += 1;
        true
    }

    /// Append a server-confirmed message sent within `conversation`.
    ///
    /// Returns `false` when that conversation is not the one displayed (its
    /// next load brings the message in from the server instead). A failed
    /// load keeps its status; the message shows beneath the error.
    pub fn append_confirmed(&mut self, conversation: &Conversation, message: Message) -> bool {
        if self.conversation.as_ref() != Some(conversation) {
            return false;
        }
        if self.messages.iter().any(|known| known.id == message.id) {
            return false;
        }

        match self.status {
            TranscriptStatus::Loaded | TranscriptStatus::LoadFailed(_) => {
                self.messages.push(message);
            }
            TranscriptStatus::Loading => {
                self.confirmed_during_load.push(message.clone());
                self.messages.push(message);
            }
            TranscriptStatus::Idle => return false,
        }
        self.revision += 1;
        true
    }

    /// Back to `Idle`. Any load still in flight becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.conversation = None;
        self.confirmed_during_load.clear();
        self.status = TranscriptStatus::Idle;
        if !self.messages.is_empty() {
            self.messages.clear();
            self.revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn message(id: i64, from: &str, to: &str) -> Message {
        Message {
            id,
            from_username: from.to_string(),
            to_username: to.to_string(),
            content: format!("message {id}"),
            timestamp: NaiveDateTime::parse_from_str("2025-03-01 09:30:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    fn ids(store: &TranscriptStore) -> Vec<i64> {
        store.messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn starts_idle() {
        let mut store = TranscriptStore::new();
        assert_eq!(store.status(), &TranscriptStatus::Idle);
        assert!(store.messages().is_empty());
        let bob = Conversation::new("alice", "bob");
        assert!(!store.append_confirmed(&bob, message(1, "alice", "bob")));
    }

    #[test]
    fn load_replaces_in_server_order() {
        let mut store = TranscriptStore::new();
        let ticket = store.begin_load(Conversation::new("alice", "bob"));
        assert_eq!(store.status(), &TranscriptStatus::Loading);

        let history = vec![message(3, "bob", "alice"), message(1, "alice", "bob")];
        assert!(store.commit_load(&ticket, Ok(history)));
        assert_eq!(store.status(), &TranscriptStatus::Loaded);
        assert_eq!(ids(&store), vec![3, 1]);

        let refresh = store.begin_load(Conversation::new("alice", "bob"));
        assert_eq!(ids(&store), vec![3, 1]);
        assert!(store.commit_load(&refresh, Ok(vec![message(4, "bob", "alice")])));
        assert_eq!(ids(&store), vec![4]);
    }

    #[test]
    fn stale_load_is_discarded() {
        let mut store = TranscriptStore::new();
        let for_anna = store.begin_load(Conversation::new("alice", "anna"));
        let for_ben = store.begin_load(Conversation::new("alice", "ben"));

        assert!(store.commit_load(&for_ben, Ok(vec![message(2, "ben", "alice")])));
        let revision = store.revision();
        assert!(!store.commit_load(&for_anna, Ok(vec![message(1, "anna", "alice")])));
        assert_eq!(ids(&store), vec![2]);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn failed_load_clears_messages() {
        let mut store = TranscriptStore::new();
        let ticket = store.begin_load(Conversation::new("alice", "bob"));
        store.commit_load(&ticket, Ok(vec![message(1, "alice", "bob")]));

        let refresh = store.begin_load(Conversation::new("alice", "bob"));
        let err = MessagingError::Load("Failed to fetch messages".to_string());
        assert!(store.commit_load(&refresh, Err(err.clone())));
        assert!(store.messages().is_empty());
        assert_eq!(store.status(), &TranscriptStatus::LoadFailed(err));
    }

    #[test]
    fn switching_conversation_clears_immediately() {
        let mut store = TranscriptStore::new();
        let ticket = store.begin_load(Conversation::new("alice", "bob"));
        store.commit_load(&ticket, Ok(vec![message(1, "alice", "bob")]));

        store.begin_load(Conversation::new("alice", "carol"));
        assert!(store.messages().is_empty());
    }

    #[test]
    fn confirmed_send_goes_only_to_its_conversation() {
        let mut store = TranscriptStore::new();
        let bob = Conversation::new("alice", "bob");
        let ticket = store.begin_load(bob.clone());
        store.commit_load(&ticket, Ok(Vec::new()));

        let carol = Conversation::new("alice", "carol");
        assert!(!store.append_confirmed(&carol, message(5, "alice", "carol")));
        assert!(store.messages().is_empty());

        assert!(store.append_confirmed(&bob, message(6, "alice", "bob")));
        assert!(!store.append_confirmed(&bob, message(6, "alice", "bob")));
        assert_eq!(ids(&store), vec![6]);
    }

    #[test]
    fn send_confirmed_mid_load_survives_the_load() {
        let mut store = TranscriptStore::new();
        let bob = Conversation::new("alice", "bob");
        let ticket = store.begin_load(bob.clone());
        assert!(store.append_confirmed(&bob, message(7, "alice", "bob")));

        store.commit_load(&ticket, Ok(vec![message(2, "bob", "alice")]));
        assert_eq!(ids(&store), vec![2, 7]);
    }

    #[test]
    fn send_confirmed_mid_load_is_not_duplicated() {
        let mut store = TranscriptStore::new();
        let bob = Conversation::new("alice", "bob");
        let ticket = store.begin_load(bob.clone());
        store.append_confirmed(&bob, message(7, "alice", "bob"));

        store.commit_load(
            &ticket,
            Ok(vec![message(2, "bob", "alice"), message(7, "alice", "bob")]),
        );
        assert_eq!(ids(&store), vec![2, 7]);
    }

    #[test]
    fn send_confirmed_after_failed_load_is_kept_under_the_error() {
        let mut store = TranscriptStore::new();
        let bob = Conversation::new("alice", "bob");
        let ticket = store.begin_load(bob.clone());
        let err = MessagingError::Load("Failed to fetch messages".to_string());
        store.commit_load(&ticket, Err(err.clone()));
        let revision = store.revision();

        assert!(store.append_confirmed(&bob, message(3, "alice", "bob")));
        assert_eq!(ids(&store), vec![3]);
        assert_eq!(store.status(), &TranscriptStatus::LoadFailed(err));
        assert_eq!(store.revision(), revision + 1);
    }

    #[test]
    fn failed_load_drops_sends_confirmed_mid_load() {
        let mut store = TranscriptStore::new();
        let bob = Conversation::new("alice", "bob");
        let ticket = store.begin_load(bob.clone());
        store.append_confirmed(&bob, message(7, "alice", "bob"));

        let err = MessagingError::Load("Failed to fetch messages".to_string());
        store.commit_load(&ticket, Err(err));
        assert!(store.messages().is_empty());

        let retry = store.begin_load(bob);
        store.commit_load(&retry, Ok(vec![message(2, "bob", "alice")]));
        assert_eq!(ids(&store), vec![2]);
    }

    #[test]
    fn reset_invalidates_in_flight_load() {
        let mut store = TranscriptStore::new();
        let ticket = store.begin_load(Conversation::new("alice", "bob"));
        store.reset();
        assert!(!store.commit_load(&ticket, Ok(vec![message(1, "alice", "bob")])));
        assert_eq!(store.status(), &TranscriptStatus::Idle);
    }
}
