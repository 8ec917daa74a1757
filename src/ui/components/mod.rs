pub mod chat_area;
pub mod confirm_dialog;
pub mod input_bar;
pub mod notice;
pub mod rich_text;
pub mod toolbar;
