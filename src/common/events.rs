use crate::error::ApiError;

use super::commands::{LoadTicket, LookupTicket, SendTicket};
use super::types::Message;

/// Results the API worker sends back to the view, carrying the tag they were issued with.
#[derive(Debug)]
pub enum ApiEvent {
    UserChecked {
        ticket: LookupTicket,
        result: Result<bool, ApiError>,
    },
    HistoryLoaded {
        ticket: LoadTicket,
        result: Result<Vec<Message>, ApiError>,
    },
    MessageSent {
        ticket: SendTicket,
        result: Result<Message, ApiError>,
    },
}
