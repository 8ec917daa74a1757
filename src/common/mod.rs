pub mod commands;
pub mod events;
pub mod types;

pub use commands::WidgetCommand;
pub use events::WidgetEvent;
pub use types::{CacheEntry, ChatMessage, Role, Theme};
