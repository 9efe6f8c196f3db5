use super::types::Conversation;

/// Tag for a user-existence check issued from the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    /// Active username at the time the search was submitted.
    pub requested_by: String,
    pub candidate: String,
}

/// Tag for a history fetch. Only the ticket with the latest generation may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub conversation: Conversation,
}

/// Tag for an outgoing message, remembering which conversation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    pub seq: u64,
    pub conversation: Conversation,
    pub content: String,
}

/// Requests the view hands to the API worker.
#[derive(Debug, Clone)]
pub enum ApiCommand {
    CheckUser(LookupTicket),
    LoadHistory(LoadTicket),
    SendMessage(SendTicket),
}
