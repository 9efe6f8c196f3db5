pub mod api;
pub mod worker;

pub use api::{ApiClient, MessagingApi, Registration};
pub use worker::ApiWorker;
