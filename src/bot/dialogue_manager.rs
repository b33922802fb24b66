//! Dialogue Manager module for the viewing-request flow
//!
//! Collects name, phone and comments after an "interested" press, shows the
//! summary, and performs the durable write plus the best-effort admin
//! notification once the user confirms.

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::config::BotConfig;
use crate::db;
use crate::dialogue::{BotDialogue, ConversationState};
use crate::listing_model::{Listing, RequestRecord};
use crate::sheets::SheetsService;
use crate::validators::{validate_comment, validate_name, validate_phone};

use super::ui_builder::{
    cancel_keyboard, confirm_request_keyboard, format_admin_request_notification,
    format_request_summary, main_menu_keyboard,
};

/// Inputs that abort the request flow from any text step
fn is_cancel_word(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "cancel" | "stop" | "back" | "отмена"
    )
}

async fn cancel_request_flow(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: BotDialogue,
    language_code: Option<&str>,
) -> Result<()> {
    bot.send_message(chat_id, t_lang("request-cancelled", language_code))
        .reply_markup(main_menu_keyboard(language_code))
        .await?;
    dialogue.update(ConversationState::Idle).await?;
    Ok(())
}

/// Handle the name step of the request flow
pub async fn handle_name_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    listing: Listing,
    name_input: &str,
    language_code: Option<&str>,
) -> Result<()> {
    if is_cancel_word(name_input) {
        return cancel_request_flow(bot, msg.chat.id, dialogue, language_code).await;
    }

    match validate_name(name_input) {
        Ok(name) => {
            bot.send_message(
                msg.chat.id,
                t_args_lang("request-phone-prompt", &[("name", &name)], language_code),
            )
            .reply_markup(cancel_keyboard(language_code))
            .await?;
            dialogue
                .update(ConversationState::AwaitingPhone { listing, name })
                .await?;
        }
        Err(key) => {
            // Keep the dialogue active so the user can try again
            bot.send_message(msg.chat.id, t_lang(key, language_code))
                .reply_markup(cancel_keyboard(language_code))
                .await?;
        }
    }

    Ok(())
}

/// Handle the phone step of the request flow
pub async fn handle_phone_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    listing: Listing,
    name: String,
    phone_input: &str,
    language_code: Option<&str>,
) -> Result<()> {
    if is_cancel_word(phone_input) {
        return cancel_request_flow(bot, msg.chat.id, dialogue, language_code).await;
    }

    match validate_phone(phone_input) {
        Ok(phone) => {
            bot.send_message(msg.chat.id, t_lang("request-comments-prompt", language_code))
                .reply_markup(cancel_keyboard(language_code))
                .await?;
            dialogue
                .update(ConversationState::AwaitingComments {
                    listing,
                    name,
                    phone,
                })
                .await?;
        }
        Err(key) => {
            bot.send_message(msg.chat.id, t_lang(key, language_code))
                .reply_markup(cancel_keyboard(language_code))
                .await?;
        }
    }

    Ok(())
}

/// Handle the comments step and show the confirmation summary
pub async fn handle_comments_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    listing: Listing,
    name: String,
    phone: String,
    comment_input: &str,
    language_code: Option<&str>,
) -> Result<()> {
    if is_cancel_word(comment_input) {
        return cancel_request_flow(bot, msg.chat.id, dialogue, language_code).await;
    }

    // "-" and /skip leave the comment blank
    let raw = match comment_input.trim() {
        "-" | "/skip" => "",
        other => other,
    };

    let comments = match validate_comment(raw) {
        Ok(comments) => comments,
        Err(key) => {
            bot.send_message(msg.chat.id, t_lang(key, language_code))
                .reply_markup(cancel_keyboard(language_code))
                .await?;
            return Ok(());
        }
    };

    let record = RequestRecord {
        submitted_at: Utc::now(),
        user_id: msg.chat.id.0,
        username: msg
            .from
            .as_ref()
            .and_then(|user| user.username.clone())
            .unwrap_or_else(|| "no_username".to_string()),
        name,
        phone,
        listing_id: listing.id.clone(),
        comments,
    };

    let summary = format_request_summary(&record, &listing, language_code);
    bot.send_message(msg.chat.id, summary)
        .reply_markup(confirm_request_keyboard(language_code))
        .await?;
    dialogue
        .update(ConversationState::ConfirmingRequest { listing, record })
        .await?;

    Ok(())
}

/// Perform the durable write after the confirm button
///
/// A failed append keeps the `ConfirmingRequest` state so the user can press
/// confirm again; the admin notification is a spawned side effect that can
/// never affect the user-facing outcome.
#[allow(clippy::too_many_arguments)]
pub async fn submit_request(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: BotDialogue,
    sheets: Arc<SheetsService>,
    conn: Arc<Mutex<Connection>>,
    config: Arc<BotConfig>,
    listing: Listing,
    record: RequestRecord,
    language_code: Option<&str>,
) -> Result<()> {
    if let Err(e) = sheets.save_request(&record).await {
        error!(user_id = %chat_id, error = %e, "Failed to append request record");
        bot.send_message(chat_id, t_lang("request-save-failed", language_code))
            .reply_markup(confirm_request_keyboard(language_code))
            .await?;
        return Ok(());
    }

    info!(user_id = %chat_id, listing_id = %record.listing_id, "Request record appended");

    {
        let conn = conn.lock().await;
        if let Err(e) = db::log_action(
            &conn,
            record.user_id,
            Some(&record.username),
            &format!("submitted request for listing {}", record.listing_id),
        ) {
            warn!(error = %e, "Failed to log request submission");
        }
    }

    bot.send_message(chat_id, t_lang("request-saved", language_code))
        .reply_markup(main_menu_keyboard(language_code))
        .await?;
    dialogue.update(ConversationState::Idle).await?;

    notify_admin(
        bot,
        config.notification_chat(),
        format_admin_request_notification(&record, &listing),
    );

    Ok(())
}

/// Fire-and-forget admin notification with its own error channel
pub fn notify_admin(bot: &Bot, admin_chat: Option<i64>, text: String) {
    let Some(admin_chat) = admin_chat else {
        warn!("No admin chat configured, dropping notification");
        return;
    };
    let bot = bot.clone();
    tokio::spawn(async move {
        if let Err(e) = bot.send_message(ChatId(admin_chat), text).await {
            error!(admin_chat, error = %e, "Failed to notify admin");
        }
    });
}
