pub mod controller;
pub mod directory;
pub mod identity;
pub mod scroll;
pub mod transcript;

pub use controller::MessagingSession;
pub use scroll::ScrollSync;
pub use transcript::TranscriptStatus;
