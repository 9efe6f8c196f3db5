use std::sync::Arc;

use tokio::sync::mpsc;

use crate::common::{ApiCommand, ApiEvent};

use super::api::MessagingApi;

/// Background side of the view: turns commands into HTTP calls and reports results.
///
/// Each command runs in its own task so a slow history fetch never holds up a
/// send; results may therefore arrive in any order and the view decides, by
/// ticket, which ones still apply.
pub struct ApiWorker<A> {
    api: Arc<A>,
    event_sender: mpsc::Sender<ApiEvent>,
    command_receiver: mpsc::Receiver<ApiCommand>,
}

impl<A: MessagingApi + 'static> ApiWorker<A> {
    pub fn new(
        api: Arc<A>,
        event_sender: mpsc::Sender<ApiEvent>,
        command_receiver: mpsc::Receiver<ApiCommand>,
    ) -> Self {
        Self {
            api,
            event_sender,
            command_receiver,
        }
    }

    pub async fn run(mut self) {
        log::info!("API worker started");

        while let Some(command) = self.command_receiver.recv().await {
            let api = Arc::clone(&self.api);
            let event_sender = self.event_sender.clone();
            tokio::spawn(async move {
                let event = execute(api.as_ref(), command).await;
                if let Err(err) = event_sender.send(event).await {
                    log::warn!("Failed to deliver API result to view: {err}");
                }
            });
        }

        log::info!("Command channel closed; API worker stopped");
    }
}

async fn execute<A: MessagingApi + ?Sized>(api: &A, command: ApiCommand) -> ApiEvent {
    match command {
        ApiCommand::CheckUser(ticket) => {
            log::debug!("Checking whether {} exists", ticket.candidate);
            let result = api.check_user_exists(&ticket.candidate).await;
            ApiEvent::UserChecked { ticket, result }
        }
        ApiCommand::LoadHistory(ticket) => {
            let conversation = &ticket.conversation;
            log::debug!(
                "Loading history {} <-> {} (generation {})",
                conversation.user,
                conversation.partner,
                ticket.generation
            );
            let result = api
                .messages_between(&conversation.user, &conversation.partner)
                .await;
            ApiEvent::HistoryLoaded { ticket, result }
        }
        ApiCommand::SendMessage(ticket) => {
            let conversation = &ticket.conversation;
            log::debug!(
                "Sending message {} -> {}",
                conversation.user,
                conversation.partner
            );
            let result = api
                .send_message(&conversation.user, &conversation.partner, &ticket.content)
                .await;
            ApiEvent::MessageSent { ticket, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use tokio::sync::oneshot;

    use super::*;
    use crate::common::{Conversation, LoadTicket, Message};
    use crate::error::ApiError;

    /// History responses are held back until the test releases them by partner name.
    #[derive(Default)]
    struct GatedApi {
        gates: Mutex<HashMap<String, oneshot::Receiver<Vec<Message>>>>,
    }

    impl GatedApi {
        fn gate(&self, partner: &str) -> oneshot::Sender<Vec<Message>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(partner.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl MessagingApi for GatedApi {
        async fn check_user_exists(&self, _username: &str) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn messages_between(
            &self,
            _user_a: &str,
            user_b: &str,
        ) -> Result<Vec<Message>, ApiError> {
            let gate = self.gates.lock().unwrap().remove(user_b);
            match gate {
                Some(rx) => Ok(rx.await.unwrap_or_default()),
                None => Ok(Vec::new()),
            }
        }

        async fn send_message(
            &self,
            from: &str,
            to: &str,
            content: &str,
        ) -> Result<Message, ApiError> {
            Ok(message(1, from, to, content))
        }
    }

    fn message(id: i64, from: &str, to: &str, content: &str) -> Message {
        Message {
            id,
            from_username: from.to_string(),
            to_username: to.to_string(),
            content: content.to_string(),
            timestamp: NaiveDateTime::parse_from_str("2025-03-01 10:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    fn load(generation: u64, partner: &str) -> ApiCommand {
        ApiCommand::LoadHistory(LoadTicket {
            generation,
            conversation: Conversation::new("alice", partner),
        })
    }

    #[tokio::test]
    async fn results_arrive_in_resolution_order() {
        let api = Arc::new(GatedApi::default());
        let release_a = api.gate("anna");
        let release_b = api.gate("ben");

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        tokio::spawn(ApiWorker::new(Arc::clone(&api), event_tx, cmd_rx).run());

        cmd_tx.send(load(1, "anna")).await.unwrap();
        cmd_tx.send(load(2, "ben")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        release_b.send(vec![message(5, "ben", "alice", "b")]).unwrap();
        let first = tokio::time::timeout(Duration::from_secs(1), event_rx.recv())
            .await
            .unwrap()
            .unwrap();
        release_a.send(vec![message(4, "anna", "alice", "a")]).unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), event_rx.recv())
            .await
            .unwrap()
            .unwrap();

        match (first, second) {
            (
                ApiEvent::HistoryLoaded { ticket: first, .. },
                ApiEvent::HistoryLoaded { ticket: second, .. },
            ) => {
                assert_eq!(first.generation, 2);
                assert_eq!(second.generation, 1);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[tokio::test]
    async fn worker_stops_when_commands_close() {
        let api = Arc::new(GatedApi::default());
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let (event_tx, _event_rx) = mpsc::channel(1);
        let handle = tokio::spawn(ApiWorker::new(api, event_tx, cmd_rx).run());

        drop(cmd_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
