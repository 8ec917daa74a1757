/// Commands the UI sends to the chat worker.
#[derive(Debug, Clone)]
pub enum WidgetCommand {
    SendMessage(String),
    /// `confirmed` is the answer to the yes/no prompt shown before clearing.
    ClearChat {
        confirmed: bool,
    },
    /// - role: key sent to the server as `ai_role`
    /// - label: display name used in the switch announcement
    ChangeRole {
        role: String,
        label: String,
    },
    ToggleTheme,
}
