//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles commands and free-text dialogue input
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: Runs the viewing-request flow and the durable write

use teloxide::prelude::*;
use tracing::error;

use crate::dialogue::{BotDialogue, ConversationState};
use crate::errors::BotError;
use crate::localization::t_lang;

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

/// Conversation-step error boundary
///
/// Validation and service errors keep the current state so the user can
/// retry the step; anything unexpected apologizes, shows the main menu and
/// resets the session so it cannot get stuck.
pub(crate) async fn report_step_error(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    error: &anyhow::Error,
    language_code: Option<&str>,
) {
    error!(user_id = %chat_id, error = %error, "Conversation step failed");

    let (message_key, reset) = match error.downcast_ref::<BotError>() {
        Some(known) => (known.user_message_key(), false),
        None => ("error-generic", true),
    };

    let mut request = bot.send_message(chat_id, t_lang(message_key, language_code));
    if reset {
        request = request.reply_markup(ui_builder::main_menu_keyboard(language_code));
    }
    if let Err(send_error) = request.await {
        error!(user_id = %chat_id, error = %send_error, "Failed to report step error");
    }

    if reset {
        if let Err(e) = dialogue.update(ConversationState::Idle).await {
            error!(user_id = %chat_id, error = %e, "Failed to reset dialogue after error");
        }
    }
}
