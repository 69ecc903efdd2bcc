//! The fixed quick-reply keyboard and its command aliases.

use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// Build the quick-reply keyboard attached to /start and /help replies.
pub fn main_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new("🏠 Start"),
            KeyboardButton::new("➕ Add Expense"),
            KeyboardButton::new("📋 Get Expenses"),
        ],
        vec![KeyboardButton::new("❓ Help")],
    ])
}

/// Translate the keyboard's icon labels to canonical commands. This is a
/// lookup on the first word only, not a parser; anything else passes
/// through trimmed.
pub fn canonical_command(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.split_whitespace().next() {
        Some("🏠") => "/start",
        Some("➕") => "/addexpense",
        Some("📋") => "/getexpenses",
        Some("❓") => "/help",
        _ => trimmed,
    }
}
