//! Chat titles
//!
//! Two sources can title a chat in the same turn: the opening message and a
//! successful verification. The verification title always wins.

/// Title given to a chat before anything is said
pub const NEW_CHAT_TITLE: &str = "New Chat";

const INITIAL_TITLE_CHARS: usize = 30;

/// Title from the opening message: its first 30 characters plus `...`
pub fn initial_title(first_message: &str) -> String {
    let head: String = first_message.trim().chars().take(INITIAL_TITLE_CHARS).collect();
    format!("{head}...")
}

/// Title set once a loan is approved
pub fn approval_title(display_name: &str) -> String {
    format!("Loan Approved for {display_name}")
}

/// Decide the single title write for a turn, if any.
///
/// `first_message` is only `Some` when the chat had no stored turns before
/// this one.
pub fn resolve_title(title_hint: Option<&str>, first_message: Option<&str>) -> Option<String> {
    title_hint
        .map(str::to_string)
        .or_else(|| first_message.map(initial_title))
}
