//! Message Handler module for processing incoming Telegram messages
//!
//! Commands and free-text input land here. Which handler a text message
//! reaches depends entirely on the dialogue state: the request flow consumes
//! name/phone/comments, the calculators consume numbers, and the filter
//! steps re-prompt because they only accept buttons.

use anyhow::Result;
use rusqlite::Connection;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::calc::{investment_quote, mortgage_quote};
use crate::config::BotConfig;
use crate::db;
use crate::dialogue::{BotDialogue, ConversationState};
use crate::validators::{parse_non_negative_number, parse_positive_number};

use super::dialogue_manager::{
    handle_comments_input, handle_name_input, handle_phone_input,
};
use super::report_step_error;
use super::ui_builder::{
    admin_keyboard, budget_keyboard, calculators_keyboard, cancel_keyboard,
    confirm_request_keyboard, deal_type_keyboard, district_keyboard, format_price,
    main_menu_keyboard, property_type_keyboard, rooms_keyboard,
};

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    config: Arc<BotConfig>,
    conn: Arc<Mutex<Connection>>,
    dialogue: BotDialogue,
) -> Result<()> {
    // Extract user's language code from Telegram
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.clone());
    let lang = language_code.as_deref();

    if let Err(e) = handle_message(&bot, &msg, &config, &conn, dialogue.clone(), lang).await {
        report_step_error(&bot, msg.chat.id, &dialogue, &e, lang).await;
    }
    Ok(())
}

async fn handle_message(
    bot: &Bot,
    msg: &Message,
    config: &Arc<BotConfig>,
    conn: &Arc<Mutex<Connection>>,
    dialogue: BotDialogue,
    lang: Option<&str>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Received non-text message");
        bot.send_message(msg.chat.id, t_lang("unknown-message", lang))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message");

    // Commands work regardless of dialogue state
    match text.trim() {
        "/start" => return handle_start(bot, msg, conn, dialogue, lang).await,
        "/help" => {
            bot.send_message(msg.chat.id, t_lang("help-body", lang))
                .reply_markup(main_menu_keyboard(lang))
                .await?;
            return Ok(());
        }
        "/cancel" => return handle_cancel(bot, msg, dialogue, lang).await,
        "/search" => {
            {
                let conn = conn.lock().await;
                if let Err(e) = db::log_action(
                    &conn,
                    msg.chat.id.0,
                    msg.from.as_ref().and_then(|u| u.username.as_deref()),
                    "started search",
                ) {
                    warn!(error = %e, "Failed to log search start");
                }
            }
            bot.send_message(msg.chat.id, t_lang("search-property-type", lang))
                .reply_markup(property_type_keyboard(lang))
                .await?;
            dialogue
                .update(ConversationState::AwaitingPropertyType)
                .await?;
            return Ok(());
        }
        "/calculators" => {
            bot.send_message(msg.chat.id, t_lang("calc-choose", lang))
                .reply_markup(calculators_keyboard(lang))
                .await?;
            dialogue
                .update(ConversationState::ChoosingCalculator)
                .await?;
            return Ok(());
        }
        "/admin" => return handle_admin_command(bot, msg, config, conn, lang).await,
        _ => {}
    }

    // Free text: dispatch on the current dialogue state
    let state = dialogue.get().await?.unwrap_or_default();
    match state {
        ConversationState::AwaitingName { listing } => {
            handle_name_input(bot, msg, dialogue, listing, text, lang).await
        }
        ConversationState::AwaitingPhone { listing, name } => {
            handle_phone_input(bot, msg, dialogue, listing, name, text, lang).await
        }
        ConversationState::AwaitingComments {
            listing,
            name,
            phone,
        } => handle_comments_input(bot, msg, dialogue, listing, name, phone, text, lang).await,

        ConversationState::MortgageAmount => match parse_positive_number(text) {
            Ok(amount) => {
                bot.send_message(msg.chat.id, t_lang("calc-rate-prompt", lang))
                    .reply_markup(cancel_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::MortgageRate { amount })
                    .await?;
                Ok(())
            }
            Err(key) => reprompt_number(bot, msg.chat.id, key, lang).await,
        },
        ConversationState::MortgageRate { amount } => match parse_non_negative_number(text) {
            Ok(annual_rate) => {
                bot.send_message(msg.chat.id, t_lang("calc-term-prompt", lang))
                    .reply_markup(cancel_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::MortgageTerm { amount, annual_rate })
                    .await?;
                Ok(())
            }
            Err(key) => reprompt_number(bot, msg.chat.id, key, lang).await,
        },
        ConversationState::MortgageTerm { amount, annual_rate } => {
            let Ok(years) = text.trim().parse::<u32>() else {
                return reprompt_number(bot, msg.chat.id, "number-invalid", lang).await;
            };
            match mortgage_quote(amount, annual_rate, years) {
                Ok(quote) => {
                    let result = t_args_lang(
                        "calc-mortgage-result",
                        &[
                            ("monthly", &format_price(quote.monthly_payment)),
                            ("total", &format_price(quote.total_paid)),
                            ("interest", &format_price(quote.total_interest)),
                            ("months", &quote.months.to_string()),
                        ],
                        lang,
                    );
                    bot.send_message(msg.chat.id, result)
                        .reply_markup(main_menu_keyboard(lang))
                        .await?;
                    dialogue.update(ConversationState::Idle).await?;
                }
                Err(_) => {
                    bot.send_message(msg.chat.id, t_lang("calc-term-invalid", lang))
                        .reply_markup(cancel_keyboard(lang))
                        .await?;
                }
            }
            Ok(())
        }

        ConversationState::InvestmentCost => match parse_positive_number(text) {
            Ok(cost) => {
                bot.send_message(msg.chat.id, t_lang("calc-invest-rent-prompt", lang))
                    .reply_markup(cancel_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::InvestmentRent { cost })
                    .await?;
                Ok(())
            }
            Err(key) => reprompt_number(bot, msg.chat.id, key, lang).await,
        },
        ConversationState::InvestmentRent { cost } => match parse_positive_number(text) {
            Ok(rent) => {
                bot.send_message(msg.chat.id, t_lang("calc-invest-expenses-prompt", lang))
                    .reply_markup(cancel_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::InvestmentExpenses { cost, rent })
                    .await?;
                Ok(())
            }
            Err(key) => reprompt_number(bot, msg.chat.id, key, lang).await,
        },
        ConversationState::InvestmentExpenses { cost, rent } => {
            let expenses = match parse_non_negative_number(text) {
                Ok(expenses) => expenses,
                Err(key) => return reprompt_number(bot, msg.chat.id, key, lang).await,
            };
            match investment_quote(cost, rent, expenses) {
                Ok(quote) => {
                    let result = t_args_lang(
                        "calc-invest-result",
                        &[
                            ("yield", &format!("{:.1}", quote.annual_yield_pct)),
                            ("payback", &format!("{:.1}", quote.payback_years)),
                        ],
                        lang,
                    );
                    bot.send_message(msg.chat.id, result)
                        .reply_markup(main_menu_keyboard(lang))
                        .await?;
                    dialogue.update(ConversationState::Idle).await?;
                }
                Err(_) => {
                    bot.send_message(msg.chat.id, t_lang("calc-invest-nonpositive", lang))
                        .reply_markup(cancel_keyboard(lang))
                        .await?;
                }
            }
            Ok(())
        }

        state if state.expects_button() => {
            // Invalid free text during a button step re-prompts without
            // changing state
            reprompt_step(bot, msg.chat.id, &state, lang).await
        }
        ConversationState::Viewing { .. } => {
            bot.send_message(msg.chat.id, t_lang("viewing-use-buttons", lang))
                .await?;
            Ok(())
        }
        _ => {
            bot.send_message(msg.chat.id, t_lang("unknown-message", lang))
                .reply_markup(main_menu_keyboard(lang))
                .await?;
            Ok(())
        }
    }
}

async fn handle_start(
    bot: &Bot,
    msg: &Message,
    conn: &Arc<Mutex<Connection>>,
    dialogue: BotDialogue,
    lang: Option<&str>,
) -> Result<()> {
    dialogue.update(ConversationState::Idle).await?;

    let user_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_default();
    {
        let conn = conn.lock().await;
        if let Err(e) = db::log_action(
            &conn,
            msg.chat.id.0,
            msg.from.as_ref().and_then(|u| u.username.as_deref()),
            "started the bot",
        ) {
            warn!(error = %e, "Failed to log bot start");
        }
    }

    let welcome = format!(
        "👋 {}\n\n{}",
        t_args_lang("welcome-title", &[("name", &user_name)], lang),
        t_lang("welcome-body", lang)
    );
    bot.send_message(msg.chat.id, welcome)
        .reply_markup(main_menu_keyboard(lang))
        .await?;
    Ok(())
}

async fn handle_cancel(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    lang: Option<&str>,
) -> Result<()> {
    let state = dialogue.get().await?.unwrap_or_default();
    if matches!(state, ConversationState::Idle) {
        bot.send_message(msg.chat.id, t_lang("cancel-nothing", lang))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
        return Ok(());
    }

    dialogue.update(ConversationState::Idle).await?;
    bot.send_message(msg.chat.id, t_lang("cancelled", lang))
        .reply_markup(main_menu_keyboard(lang))
        .await?;
    Ok(())
}

async fn handle_admin_command(
    bot: &Bot,
    msg: &Message,
    config: &Arc<BotConfig>,
    conn: &Arc<Mutex<Connection>>,
    lang: Option<&str>,
) -> Result<()> {
    let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or_default();
    if !config.is_admin(user_id) {
        bot.send_message(msg.chat.id, t_lang("admin-denied", lang))
            .await?;
        return Ok(());
    }

    {
        let conn = conn.lock().await;
        if let Err(e) = db::log_action(
            &conn,
            user_id,
            msg.from.as_ref().and_then(|u| u.username.as_deref()),
            "opened admin panel",
        ) {
            warn!(error = %e, "Failed to log admin panel open");
        }
    }

    bot.send_message(msg.chat.id, t_lang("admin-panel-title", lang))
        .reply_markup(admin_keyboard(lang))
        .await?;
    Ok(())
}

async fn reprompt_number(
    bot: &Bot,
    chat_id: ChatId,
    key: &str,
    lang: Option<&str>,
) -> Result<()> {
    bot.send_message(chat_id, t_lang(key, lang))
        .reply_markup(cancel_keyboard(lang))
        .await?;
    Ok(())
}

/// Re-show the prompt and keyboard of the filter step the user is on
async fn reprompt_step(
    bot: &Bot,
    chat_id: ChatId,
    state: &ConversationState,
    lang: Option<&str>,
) -> Result<()> {
    let (prompt_key, keyboard) = match state {
        ConversationState::AwaitingPropertyType => {
            ("search-property-type", property_type_keyboard(lang))
        }
        ConversationState::AwaitingDealType { .. } => ("search-deal-type", deal_type_keyboard(lang)),
        ConversationState::AwaitingDistrict { .. } => ("search-district", district_keyboard(lang)),
        ConversationState::AwaitingBudget { .. } => ("search-budget", budget_keyboard(lang)),
        ConversationState::AwaitingRooms { .. } => ("search-rooms", rooms_keyboard(lang)),
        ConversationState::ChoosingCalculator => ("calc-choose", calculators_keyboard(lang)),
        ConversationState::ConfirmingRequest { .. } => {
            ("request-confirm-hint", confirm_request_keyboard(lang))
        }
        _ => ("menu-prompt", main_menu_keyboard(lang)),
    };
    let text = format!(
        "{}\n\n{}",
        t_lang("reprompt-use-buttons", lang),
        t_lang(prompt_key, lang)
    );
    bot.send_message(chat_id, text).reply_markup(keyboard).await?;
    Ok(())
}
