pub mod commands;
pub mod events;
pub mod types;

pub use commands::{ApiCommand, LoadTicket, LookupTicket, SendTicket};
pub use events::ApiEvent;
pub use types::{Conversation, Identity, Message, Post, PostOwner};
