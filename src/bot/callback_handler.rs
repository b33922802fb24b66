//! Callback Handler module for processing inline keyboard callback queries
//!
//! Every conversation step driven by a button lands here: the filter
//! collection sequence, listing/photo pagination, the request confirmation,
//! the calculators menu and the admin panel. Errors never escape a single
//! step; the boundary in [`callback_handler`] reports them and keeps the
//! session usable.

use anyhow::Result;
use rusqlite::Connection;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::config::BotConfig;
use crate::cursor::{Move, ViewCursor};
use crate::db;
use crate::dialogue::{BotDialogue, ConversationState};
use crate::filter::{filter_listings, FilterCriteria, RoomsFilter};
use crate::listing_model::Listing;
use crate::sheets::{request_stats, SheetsService};

use super::dialogue_manager::{notify_admin, submit_request};
use super::report_step_error;
use super::ui_builder::{
    admin_clear_confirm_keyboard, admin_keyboard, budget_keyboard, calculators_keyboard,
    cancel_keyboard, deal_type_keyboard, district_keyboard, format_actions_list,
    format_admin_interest_notification, format_listing_card, format_photo_caption,
    listing_keyboard, main_menu_keyboard, property_type_keyboard, rooms_keyboard,
};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    config: Arc<BotConfig>,
    sheets: Arc<SheetsService>,
    conn: Arc<Mutex<Connection>>,
    dialogue: BotDialogue,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query");

    let language_code = q.from.language_code.clone();
    let lang = language_code.as_deref();

    let toast = match handle_callback(&bot, &q, &config, &sheets, &conn, dialogue.clone(), lang)
        .await
    {
        Ok(toast) => toast,
        Err(e) => {
            if let Some(msg) = &q.message {
                report_step_error(&bot, msg.chat().id, &dialogue, &e, lang).await;
            } else {
                error!(user_id = %q.from.id, error = %e, "Callback step failed without a chat");
            }
            None
        }
    };

    // Answer the callback query to remove the loading state
    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(text) = toast {
        answer = answer.text(text);
    }
    if let Err(e) = answer.await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    Ok(())
}

/// Dispatch one callback; the returned string becomes the query toast
async fn handle_callback(
    bot: &Bot,
    q: &teloxide::types::CallbackQuery,
    config: &Arc<BotConfig>,
    sheets: &Arc<SheetsService>,
    conn: &Arc<Mutex<Connection>>,
    dialogue: BotDialogue,
    lang: Option<&str>,
) -> Result<Option<String>> {
    let data = q.data.as_deref().unwrap_or("");
    let Some(msg) = &q.message else {
        debug!(user_id = %q.from.id, "Callback without an accessible message, ignoring");
        return Ok(None);
    };
    let chat_id = msg.chat().id;
    let state = dialogue.get().await?.unwrap_or_default();

    // Flow-independent menu actions
    match data {
        "search" => {
            {
                let conn = conn.lock().await;
                if let Err(e) = db::log_action(
                    &conn,
                    q.from.id.0 as i64,
                    q.from.username.as_deref(),
                    "started search",
                ) {
                    warn!(error = %e, "Failed to log search start");
                }
            }
            bot.edit_message_text(chat_id, msg.id(), t_lang("search-property-type", lang))
                .reply_markup(property_type_keyboard(lang))
                .await?;
            dialogue
                .update(ConversationState::AwaitingPropertyType)
                .await?;
            return Ok(None);
        }
        "cancel" => {
            bot.send_message(chat_id, t_lang("cancelled", lang))
                .reply_markup(main_menu_keyboard(lang))
                .await?;
            dialogue.update(ConversationState::Idle).await?;
            return Ok(None);
        }
        "main_menu" => {
            bot.send_message(chat_id, t_lang("menu-prompt", lang))
                .reply_markup(main_menu_keyboard(lang))
                .await?;
            dialogue.update(ConversationState::Idle).await?;
            return Ok(None);
        }
        "contacts" => {
            bot.send_message(chat_id, t_lang("contacts-body", lang))
                .reply_markup(main_menu_keyboard(lang))
                .await?;
            return Ok(None);
        }
        "calculators" => {
            bot.edit_message_text(chat_id, msg.id(), t_lang("calc-choose", lang))
                .reply_markup(calculators_keyboard(lang))
                .await?;
            dialogue
                .update(ConversationState::ChoosingCalculator)
                .await?;
            return Ok(None);
        }
        _ => {}
    }

    if let Some(toast) = handle_admin_callback(bot, q, config, sheets, conn, data, lang).await? {
        return Ok(toast);
    }

    // State-bound actions; a tag arriving in the wrong state is stale and ignored
    match state {
        ConversationState::AwaitingPropertyType => {
            if let Some(value) = data.strip_prefix("property_type_") {
                bot.edit_message_text(chat_id, msg.id(), t_lang("search-deal-type", lang))
                    .reply_markup(deal_type_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::AwaitingDealType {
                        property_type: value.to_string(),
                    })
                    .await?;
            }
        }
        ConversationState::AwaitingDealType { property_type } => {
            if let Some(value) = data.strip_prefix("deal_type_") {
                bot.edit_message_text(chat_id, msg.id(), t_lang("search-district", lang))
                    .reply_markup(district_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::AwaitingDistrict {
                        property_type,
                        deal_type: value.to_string(),
                    })
                    .await?;
            }
        }
        ConversationState::AwaitingDistrict {
            property_type,
            deal_type,
        } => {
            if let Some(value) = data.strip_prefix("district_") {
                bot.edit_message_text(chat_id, msg.id(), t_lang("search-budget", lang))
                    .reply_markup(budget_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::AwaitingBudget {
                        property_type,
                        deal_type,
                        district: value.to_string(),
                    })
                    .await?;
            }
        }
        ConversationState::AwaitingBudget {
            property_type,
            deal_type,
            district,
        } => {
            if let Some(value) = data.strip_prefix("budget_") {
                let Ok(budget_max) = value.parse::<f64>() else {
                    warn!(user_id = %q.from.id, value, "Unparseable budget tag");
                    return Ok(None);
                };
                bot.edit_message_text(chat_id, msg.id(), t_lang("search-rooms", lang))
                    .reply_markup(rooms_keyboard(lang))
                    .await?;
                dialogue
                    .update(ConversationState::AwaitingRooms {
                        property_type,
                        deal_type,
                        district,
                        budget_max,
                    })
                    .await?;
            }
        }
        ConversationState::AwaitingRooms {
            property_type,
            deal_type,
            district,
            budget_max,
        } => {
            if let Some(value) = data.strip_prefix("rooms_") {
                let rooms = if value == "any" {
                    RoomsFilter::Any
                } else {
                    let Ok(count) = value.parse::<u32>() else {
                        warn!(user_id = %q.from.id, value, "Unparseable rooms tag");
                        return Ok(None);
                    };
                    RoomsFilter::Exactly(count)
                };
                let criteria = FilterCriteria {
                    property_type,
                    deal_type,
                    district,
                    budget_max,
                    rooms,
                };
                perform_search(bot, chat_id, sheets, dialogue, criteria, lang).await?;
            }
        }
        ConversationState::Viewing {
            criteria,
            listings,
            cursor,
        } => {
            return handle_viewing_callback(
                bot, q, conn, config, dialogue, data, chat_id, criteria, listings, cursor, lang,
            )
            .await;
        }
        ConversationState::ConfirmingRequest { listing, record } => {
            if data == "confirm_request" {
                submit_request(
                    bot,
                    chat_id,
                    dialogue,
                    Arc::clone(sheets),
                    Arc::clone(conn),
                    Arc::clone(config),
                    listing,
                    record,
                    lang,
                )
                .await?;
            }
        }
        ConversationState::ChoosingCalculator => match data {
            "calc_mortgage" => {
                bot.edit_message_text(chat_id, msg.id(), t_lang("calc-amount-prompt", lang))
                    .reply_markup(cancel_keyboard(lang))
                    .await?;
                dialogue.update(ConversationState::MortgageAmount).await?;
            }
            "calc_investment" => {
                bot.edit_message_text(chat_id, msg.id(), t_lang("calc-invest-cost-prompt", lang))
                    .reply_markup(cancel_keyboard(lang))
                    .await?;
                dialogue.update(ConversationState::InvestmentCost).await?;
            }
            _ => {}
        },
        _ => {
            debug!(user_id = %q.from.id, data, "Stale callback for current state, ignoring");
        }
    }

    Ok(None)
}

/// Run the listing filter and either start the viewing session or finish
/// with the terminal no-results message
pub async fn perform_search(
    bot: &Bot,
    chat_id: ChatId,
    sheets: &Arc<SheetsService>,
    dialogue: BotDialogue,
    criteria: FilterCriteria,
    lang: Option<&str>,
) -> Result<()> {
    let listings = sheets.all_listings().await?;
    let matches = filter_listings(&listings, &criteria);
    debug!(user_id = %chat_id, matches = matches.len(), "Search executed");

    if matches.is_empty() {
        bot.send_message(chat_id, t_lang("search-no-results", lang))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
        dialogue.update(ConversationState::Idle).await?;
        return Ok(());
    }

    let cursor = ViewCursor::default();
    send_listing_view(bot, chat_id, &matches, cursor, lang).await?;
    dialogue
        .update(ConversationState::Viewing {
            criteria,
            listings: matches,
            cursor,
        })
        .await?;
    Ok(())
}

/// Pagination and interest actions while a listing is displayed
#[allow(clippy::too_many_arguments)]
async fn handle_viewing_callback(
    bot: &Bot,
    q: &teloxide::types::CallbackQuery,
    conn: &Arc<Mutex<Connection>>,
    config: &Arc<BotConfig>,
    dialogue: BotDialogue,
    data: &str,
    chat_id: ChatId,
    criteria: FilterCriteria,
    listings: Vec<Listing>,
    cursor: ViewCursor,
    lang: Option<&str>,
) -> Result<Option<String>> {
    if listings.is_empty() {
        dialogue.update(ConversationState::Idle).await?;
        return Ok(Some(t_lang("search-no-results", lang)));
    }
    let listing_idx = cursor.listing.min(listings.len() - 1);
    let photo_count = listings[listing_idx].photo_urls.len();
    let cursor = cursor.clamped(listings.len(), photo_count);

    let moved = match data {
        "next_photo" => cursor.next_photo(photo_count),
        "prev_photo" => cursor.prev_photo(),
        "next_listing" => cursor.next_listing(listings.len()),
        "prev_listing" => cursor.prev_listing(),
        "interested" => {
            let listing = listings[cursor.listing].clone();
            let username = q
                .from
                .username
                .clone()
                .unwrap_or_else(|| "no_username".to_string());
            {
                let conn = conn.lock().await;
                if let Err(e) = db::log_action(
                    &conn,
                    q.from.id.0 as i64,
                    q.from.username.as_deref(),
                    &format!("interested in listing {}", listing.id),
                ) {
                    warn!(error = %e, "Failed to log interest");
                }
            }
            notify_admin(
                bot,
                config.notification_chat(),
                format_admin_interest_notification(q.from.id.0 as i64, &username, &listing),
            );

            bot.send_message(chat_id, t_lang("request-name-prompt", lang))
                .reply_markup(cancel_keyboard(lang))
                .await?;
            dialogue
                .update(ConversationState::AwaitingName { listing })
                .await?;
            return Ok(Some(t_lang("interest-recorded", lang)));
        }
        _ => {
            debug!(user_id = %q.from.id, data, "Unknown viewing tag, ignoring");
            return Ok(None);
        }
    };

    match moved {
        Move::Moved(next) => {
            send_listing_view(bot, chat_id, &listings, next, lang).await?;
            dialogue
                .update(ConversationState::Viewing {
                    criteria,
                    listings,
                    cursor: next,
                })
                .await?;
            Ok(None)
        }
        Move::AtBoundary => {
            let key = match data {
                "next_photo" => "boundary-last-photo",
                "prev_photo" => "boundary-first-photo",
                "next_listing" => "boundary-last-listing",
                _ => "boundary-first-listing",
            };
            Ok(Some(t_lang(key, lang)))
        }
    }
}

/// Render the listing under the cursor: photo with caption when photos
/// exist, a plain text card otherwise
pub async fn send_listing_view(
    bot: &Bot,
    chat_id: ChatId,
    listings: &[Listing],
    cursor: ViewCursor,
    lang: Option<&str>,
) -> Result<()> {
    let listing = &listings[cursor.listing];
    let total = listings.len();
    let keyboard = listing_keyboard(cursor, total, listing.photo_urls.len(), lang);

    if listing.photo_urls.is_empty() {
        let card = format!(
            "{}\n\n{}",
            format_listing_card(listing, cursor.listing + 1, total, lang),
            t_lang("no-photos-notice", lang)
        );
        bot.send_message(chat_id, card).reply_markup(keyboard).await?;
        return Ok(());
    }

    let caption = format_photo_caption(
        listing,
        cursor.listing + 1,
        total,
        cursor.photo + 1,
        listing.photo_urls.len(),
        lang,
    );

    let photo_url = &listing.photo_urls[cursor.photo];
    let send_result = match reqwest::Url::parse(photo_url) {
        Ok(url) => {
            bot.send_photo(chat_id, InputFile::url(url))
                .caption(caption.clone())
                .reply_markup(keyboard.clone())
                .await
                .map(|_| ())
                .map_err(anyhow::Error::from)
        }
        Err(e) => Err(anyhow::Error::from(e)),
    };

    if let Err(e) = send_result {
        // A broken photo link must not hide the listing itself
        warn!(listing_id = %listing.id, url = %photo_url, error = %e, "Failed to send listing photo");
        let fallback = format!("{}\n\n{}", caption, t_lang("photo-send-failed", lang));
        bot.send_message(chat_id, fallback)
            .reply_markup(keyboard)
            .await?;
    }

    Ok(())
}

/// Admin panel actions; returns a toast when the tag was admin-scoped
async fn handle_admin_callback(
    bot: &Bot,
    q: &teloxide::types::CallbackQuery,
    config: &Arc<BotConfig>,
    sheets: &Arc<SheetsService>,
    conn: &Arc<Mutex<Connection>>,
    data: &str,
    lang: Option<&str>,
) -> Result<Option<Option<String>>> {
    if !data.starts_with("admin_") {
        return Ok(None);
    }
    let Some(msg) = &q.message else {
        return Ok(Some(None));
    };
    let chat_id = msg.chat().id;

    if !config.is_admin(q.from.id.0 as i64) {
        return Ok(Some(Some(t_lang("admin-denied", lang))));
    }

    match data {
        "admin_actions" => {
            let actions = {
                let conn = conn.lock().await;
                db::recent_actions(&conn, 10)?
            };
            let text = if actions.is_empty() {
                t_lang("admin-no-actions", lang)
            } else {
                format!(
                    "{}\n{}",
                    t_lang("admin-actions-title", lang),
                    format_actions_list(&actions)
                )
            };
            bot.edit_message_text(chat_id, msg.id(), text)
                .reply_markup(admin_keyboard(lang))
                .await?;
        }
        "admin_stats" => {
            let rows = sheets.all_request_rows().await?;
            let (total, unique) = request_stats(&rows);
            let text = t_args_lang(
                "admin-stats",
                &[
                    ("total", &total.to_string()),
                    ("unique", &unique.to_string()),
                ],
                lang,
            );
            bot.edit_message_text(chat_id, msg.id(), text)
                .reply_markup(admin_keyboard(lang))
                .await?;
        }
        "admin_history" => {
            let rows = sheets.all_request_rows().await?;
            let text = if rows.is_empty() {
                t_lang("admin-no-requests", lang)
            } else {
                let lines: Vec<String> = rows
                    .iter()
                    .rev()
                    .take(10)
                    .map(|row| {
                        let get = |i: usize| row.get(i).map(String::as_str).unwrap_or("?");
                        format!("{} - ID: {} - listing {}", get(0), get(1), get(5))
                    })
                    .collect();
                format!("{}\n{}", t_lang("admin-history-title", lang), lines.join("\n"))
            };
            bot.edit_message_text(chat_id, msg.id(), text)
                .reply_markup(admin_keyboard(lang))
                .await?;
        }
        "admin_clear" => {
            bot.edit_message_text(chat_id, msg.id(), t_lang("admin-clear-confirm", lang))
                .reply_markup(admin_clear_confirm_keyboard(lang))
                .await?;
        }
        "admin_clear_confirm" => {
            let removed = {
                let conn = conn.lock().await;
                db::clear_actions(&conn)?
            };
            let text = t_args_lang("admin-cleared", &[("count", &removed.to_string())], lang);
            bot.edit_message_text(chat_id, msg.id(), text)
                .reply_markup(admin_keyboard(lang))
                .await?;
        }
        "admin_clear_cancel" => {
            bot.edit_message_text(chat_id, msg.id(), t_lang("admin-clear-cancelled", lang))
                .reply_markup(admin_keyboard(lang))
                .await?;
        }
        _ => {
            debug!(data, "Unknown admin tag, ignoring");
        }
    }

    Ok(Some(None))
}
