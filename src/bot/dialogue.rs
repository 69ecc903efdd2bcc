//! Dialogue controller - the per-user conversation state machine.
//!
//! Interprets one inbound message against the user's current state, talks
//! to storage, and produces the replies for the turn together with the next
//! state. The controller never touches the transport, so every flow can be
//! driven in tests without Telegram.
//!
//! Error policy: malformed input re-prompts in place with the state
//! unchanged; a category lookup miss outside the expense fallback path and
//! any storage failure report an error message and return the user to
//! `Idle`.

use std::sync::Arc;

use chrono::Local;
use tracing::warn;

use crate::bot::keyboard;
use crate::bot::limits::{self, LimitCheck};
use crate::bot::messages;
use crate::bot::state::ConversationState;
use crate::bot::storage::Storage;

/// One outbound message. `keyboard` attaches the fixed quick-reply
/// keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: false,
        }
    }

    fn with_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: true,
        }
    }
}

/// Everything one inbound message produced.
#[derive(Debug)]
pub struct Turn {
    pub replies: Vec<Reply>,
    pub next: ConversationState,
}

impl Turn {
    fn reply(text: impl Into<String>, next: ConversationState) -> Self {
        Self {
            replies: vec![Reply::text(text)],
            next,
        }
    }
}

/// The dialogue controller.
pub struct Dialogue {
    storage: Arc<Storage>,
}

impl Dialogue {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Process one inbound message for `user_id` in the given state.
    pub fn handle(&self, user_id: i64, text: &str, state: ConversationState) -> Turn {
        match state {
            ConversationState::Idle => self.dispatch_command(user_id, text),
            ConversationState::AwaitingExpenseCategory => self.expense_category(user_id, text),
            ConversationState::AwaitingExpenseAmount { category_id } => {
                self.expense_amount(user_id, text, category_id)
            }
            ConversationState::AwaitingExpenseNote {
                category_id,
                amount,
            } => self.expense_note(user_id, text, category_id, amount),
            ConversationState::AwaitingNewCategoryName => Turn::reply(
                messages::PROMPT_NEW_CATEGORY_LIMIT,
                ConversationState::AwaitingNewCategoryLimit {
                    name: text.to_string(),
                },
            ),
            ConversationState::AwaitingNewCategoryLimit { name } => {
                self.new_category_limit(user_id, text, name)
            }
            ConversationState::AwaitingLimitTargetCategory => self.limit_target(user_id, text),
            ConversationState::AwaitingLimitValue { category_id } => {
                self.limit_value(text, category_id)
            }
            ConversationState::AwaitingDeleteConfirmation => {
                self.delete_confirmation(user_id, text)
            }
        }
    }

    fn dispatch_command(&self, user_id: i64, text: &str) -> Turn {
        let command = keyboard::canonical_command(text);
        if command.starts_with("/start") {
            Turn {
                replies: vec![Reply::with_keyboard(messages::START_MESSAGE)],
                next: ConversationState::Idle,
            }
        } else if command.starts_with("/addexpense") {
            Turn::reply(
                messages::PROMPT_EXPENSE_CATEGORY,
                ConversationState::AwaitingExpenseCategory,
            )
        } else if command.starts_with("/addcategory") {
            Turn::reply(
                messages::PROMPT_NEW_CATEGORY_NAME,
                ConversationState::AwaitingNewCategoryName,
            )
        } else if command.starts_with("/setlimit") {
            Turn::reply(
                messages::PROMPT_LIMIT_TARGET,
                ConversationState::AwaitingLimitTargetCategory,
            )
        } else if command.starts_with("/getcategories") {
            self.list_categories(user_id)
        } else if command.starts_with("/getexpenses") {
            self.list_expenses(user_id)
        } else if command.starts_with("/deletelastexpense") {
            Turn::reply(
                messages::DELETE_CONFIRM_PROMPT,
                ConversationState::AwaitingDeleteConfirmation,
            )
        } else if command.starts_with("/help") {
            Turn {
                replies: vec![Reply::with_keyboard(messages::HELP_MESSAGE)],
                next: ConversationState::Idle,
            }
        } else {
            Turn::reply(messages::UNKNOWN_COMMAND, ConversationState::Idle)
        }
    }

    fn list_categories(&self, user_id: i64) -> Turn {
        let categories = match self.storage.user_categories(user_id) {
            Ok(categories) => categories,
            Err(e) => {
                warn!("Failed to list categories for user {user_id}: {e}");
                return Turn::reply(messages::FAILED_TO_LIST_CATEGORIES, ConversationState::Idle);
            }
        };

        // A user with no categories of their own still sees the shared
        // default.
        let categories = if categories.is_empty() {
            match self.storage.default_category() {
                Ok(Some(default)) => vec![default],
                Ok(None) => {
                    warn!("Default category is missing");
                    return Turn::reply(
                        messages::FAILED_TO_LIST_CATEGORIES,
                        ConversationState::Idle,
                    );
                }
                Err(e) => {
                    warn!("Failed to load default category: {e}");
                    return Turn::reply(
                        messages::FAILED_TO_LIST_CATEGORIES,
                        ConversationState::Idle,
                    );
                }
            }
        } else {
            categories
        };

        Turn::reply(messages::category_list(&categories), ConversationState::Idle)
    }

    fn list_expenses(&self, user_id: i64) -> Turn {
        match self.storage.user_expenses(user_id) {
            Ok(expenses) if expenses.is_empty() => {
                Turn::reply(messages::NO_EXPENSES, ConversationState::Idle)
            }
            Ok(expenses) => Turn::reply(messages::expense_list(&expenses), ConversationState::Idle),
            Err(e) => {
                warn!("Failed to list expenses for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_LIST_EXPENSES, ConversationState::Idle)
            }
        }
    }

    fn expense_category(&self, user_id: i64, text: &str) -> Turn {
        match self.storage.find_category(user_id, text) {
            Ok(Some(category)) => Turn::reply(
                messages::PROMPT_EXPENSE_AMOUNT,
                ConversationState::AwaitingExpenseAmount {
                    category_id: category.id,
                },
            ),
            // Unknown name falls back to the shared default category.
            Ok(None) => match self.storage.default_category() {
                Ok(Some(default)) => Turn {
                    replies: vec![
                        Reply::text(messages::DEFAULT_CATEGORY_FALLBACK),
                        Reply::text(messages::PROMPT_EXPENSE_AMOUNT),
                    ],
                    next: ConversationState::AwaitingExpenseAmount {
                        category_id: default.id,
                    },
                },
                Ok(None) => {
                    warn!("Default category is missing");
                    Turn::reply(messages::FAILED_TO_ADD_EXPENSE, ConversationState::Idle)
                }
                Err(e) => {
                    warn!("Failed to load default category: {e}");
                    Turn::reply(messages::FAILED_TO_ADD_EXPENSE, ConversationState::Idle)
                }
            },
            Err(e) => {
                warn!("Failed to resolve category for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_ADD_EXPENSE, ConversationState::Idle)
            }
        }
    }

    fn expense_amount(&self, user_id: i64, text: &str, category_id: i64) -> Turn {
        let Some(amount) = parse_amount(text) else {
            return Turn::reply(
                messages::INVALID_AMOUNT,
                ConversationState::AwaitingExpenseAmount { category_id },
            );
        };

        match limits::check(&self.storage, user_id, category_id, amount) {
            Ok(LimitCheck::Within) => Turn::reply(
                messages::PROMPT_EXPENSE_NOTE,
                ConversationState::AwaitingExpenseNote {
                    category_id,
                    amount,
                },
            ),
            Ok(LimitCheck::Exceeded { category }) => Turn::reply(
                messages::limit_exceeded(&category, amount),
                ConversationState::Idle,
            ),
            // Cannot verify the limit: reject the expense.
            Err(e) => {
                warn!("Limit check failed for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_ADD_EXPENSE, ConversationState::Idle)
            }
        }
    }

    fn expense_note(&self, user_id: i64, text: &str, category_id: i64, amount: f64) -> Turn {
        let date = Local::now().format("%Y-%m-%d").to_string();
        match self
            .storage
            .add_expense(user_id, category_id, amount, &date, text)
        {
            Ok(()) => Turn::reply(messages::EXPENSE_ADDED, ConversationState::Idle),
            Err(e) => {
                warn!("Failed to add expense for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_ADD_EXPENSE, ConversationState::Idle)
            }
        }
    }

    fn new_category_limit(&self, user_id: i64, text: &str, name: String) -> Turn {
        let Some(limit) = parse_limit(text) else {
            return Turn::reply(
                messages::INVALID_LIMIT,
                ConversationState::AwaitingNewCategoryLimit { name },
            );
        };

        match self.storage.create_category(user_id, &name, limit) {
            Ok(()) => Turn::reply(messages::CATEGORY_ADDED, ConversationState::Idle),
            Err(e) => {
                warn!("Failed to create category '{name}' for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_ADD_CATEGORY, ConversationState::Idle)
            }
        }
    }

    fn limit_target(&self, user_id: i64, text: &str) -> Turn {
        match self.storage.find_category(user_id, text) {
            Ok(Some(category)) => Turn::reply(
                messages::PROMPT_LIMIT_VALUE,
                ConversationState::AwaitingLimitValue {
                    category_id: category.id,
                },
            ),
            Ok(None) => Turn::reply(messages::CATEGORY_NOT_FOUND, ConversationState::Idle),
            Err(e) => {
                warn!("Failed to resolve category for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_SET_LIMIT, ConversationState::Idle)
            }
        }
    }

    fn limit_value(&self, text: &str, category_id: i64) -> Turn {
        let Some(limit) = parse_limit(text) else {
            return Turn::reply(
                messages::INVALID_LIMIT,
                ConversationState::AwaitingLimitValue { category_id },
            );
        };

        match self.storage.set_category_limit(category_id, limit) {
            Ok(()) => Turn::reply(messages::LIMIT_SET, ConversationState::Idle),
            Err(e) => {
                warn!("Failed to set limit on category {category_id}: {e}");
                Turn::reply(messages::FAILED_TO_SET_LIMIT, ConversationState::Idle)
            }
        }
    }

    fn delete_confirmation(&self, user_id: i64, text: &str) -> Turn {
        if text.to_lowercase() != messages::AFFIRMATIVE {
            return Turn::reply(messages::DELETE_CANCELLED, ConversationState::Idle);
        }

        match self.storage.remove_last_expense(user_id) {
            Ok(true) => Turn::reply(messages::LAST_EXPENSE_DELETED, ConversationState::Idle),
            Ok(false) => Turn::reply(messages::NOTHING_TO_DELETE, ConversationState::Idle),
            Err(e) => {
                warn!("Failed to delete last expense for user {user_id}: {e}");
                Turn::reply(messages::FAILED_TO_DELETE, ConversationState::Idle)
            }
        }
    }
}

/// Parse an expense amount. Any finite decimal is accepted; the sign is
/// deliberately not checked here, only the limit sum is compared.
fn parse_amount(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a category limit: finite and non-negative.
fn parse_limit(text: &str) -> Option<f64> {
    parse_amount(text).filter(|v| *v >= 0.0)
}
