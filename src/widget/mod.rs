pub mod controller;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ChatWidget, WidgetError, WidgetOptions};
pub use view::{ChannelView, ChatView};
