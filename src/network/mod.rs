pub mod api;
pub mod decoder;
pub mod worker;

pub use api::{ApiClient, ChatBackend};
pub use worker::ChatWorker;
