//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::cursor::ViewCursor;
use crate::db::ActionRecord;
use crate::listing_model::{Listing, RequestRecord};

/// Canonical filter option values, as stored on the listings sheet.
/// Button labels are localized; callback payloads carry these values.
pub const PROPERTY_TYPES: [(&str, &str); 4] = [
    ("Apartment", "property-apartment"),
    ("House", "property-house"),
    ("Commercial", "property-commercial"),
    ("Land", "property-land"),
];

pub const DEAL_TYPES: [(&str, &str); 2] = [("Buy", "deal-buy"), ("Rent", "deal-rent")];

pub const DISTRICTS: [(&str, &str); 4] = [
    ("Central", "district-central"),
    ("Western", "district-western"),
    ("Prikubansky", "district-prikubansky"),
    ("Karasunsky", "district-karasunsky"),
];

/// Budget choices as (upper bound, label key)
pub const BUDGETS: [(u64, &str); 4] = [
    (5_000_000, "budget-to-5m"),
    (10_000_000, "budget-to-10m"),
    (50_000_000, "budget-to-50m"),
    (100_000_000, "budget-to-100m"),
];

const MAX_ROOM_CHOICES: u32 = 5;

/// Main menu shown from `/start` and after every completed flow
pub fn main_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!("🔍 {}", t_lang("btn-search", language_code)),
            "search",
        )],
        vec![InlineKeyboardButton::callback(
            format!("🧮 {}", t_lang("btn-calculators", language_code)),
            "calculators",
        )],
        vec![InlineKeyboardButton::callback(
            format!("📞 {}", t_lang("btn-contacts", language_code)),
            "contacts",
        )],
    ])
}

/// Single cancel button used across the request and calculator flows
pub fn cancel_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        format!("❌ {}", t_lang("btn-cancel", language_code)),
        "cancel",
    )]])
}

fn option_keyboard(
    options: &[(&str, &str)],
    prefix: &str,
    per_row: usize,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = options
        .chunks(per_row)
        .map(|chunk| {
            chunk
                .iter()
                .map(|(value, label_key)| {
                    InlineKeyboardButton::callback(
                        t_lang(label_key, language_code),
                        format!("{prefix}{value}"),
                    )
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(buttons)
}

pub fn property_type_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    option_keyboard(&PROPERTY_TYPES, "property_type_", 2, language_code)
}

pub fn deal_type_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    option_keyboard(&DEAL_TYPES, "deal_type_", 2, language_code)
}

pub fn district_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    option_keyboard(&DISTRICTS, "district_", 2, language_code)
}

pub fn budget_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = BUDGETS
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|(max, label_key)| {
                    InlineKeyboardButton::callback(
                        t_lang(label_key, language_code),
                        format!("budget_{max}"),
                    )
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(buttons)
}

pub fn rooms_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut row = Vec::new();
    for rooms in 1..=MAX_ROOM_CHOICES {
        row.push(InlineKeyboardButton::callback(
            t_args_lang("rooms-n", &[("count", &rooms.to_string())], language_code),
            format!("rooms_{rooms}"),
        ));
        if row.len() == 3 {
            rows.push(std::mem::take(&mut row));
        }
    }
    row.push(InlineKeyboardButton::callback(
        t_lang("rooms-any", language_code),
        "rooms_any",
    ));
    rows.push(row);
    InlineKeyboardMarkup::new(rows)
}

/// Navigation keyboard for a displayed listing
///
/// Only the moves that exist are rendered: no photo controls for a listing
/// without photos, no "next" on the last element.
pub fn listing_keyboard(
    cursor: ViewCursor,
    listing_count: usize,
    photo_count: usize,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = vec![vec![InlineKeyboardButton::callback(
        format!("⭐ {}", t_lang("btn-interested", language_code)),
        "interested",
    )]];

    let mut photo_row = Vec::new();
    if cursor.photo > 0 {
        photo_row.push(InlineKeyboardButton::callback(
            format!("⬅️ {}", t_lang("btn-prev-photo", language_code)),
            "prev_photo",
        ));
    }
    if photo_count > 0 && cursor.photo < photo_count - 1 {
        photo_row.push(InlineKeyboardButton::callback(
            format!("{} ➡️", t_lang("btn-next-photo", language_code)),
            "next_photo",
        ));
    }
    if !photo_row.is_empty() {
        rows.push(photo_row);
    }

    let mut listing_row = Vec::new();
    if cursor.listing > 0 {
        listing_row.push(InlineKeyboardButton::callback(
            format!("⬅️ {}", t_lang("btn-prev-listing", language_code)),
            "prev_listing",
        ));
    }
    if listing_count > 0 && cursor.listing < listing_count - 1 {
        listing_row.push(InlineKeyboardButton::callback(
            format!("{} ➡️", t_lang("btn-next-listing", language_code)),
            "next_listing",
        ));
    }
    if !listing_row.is_empty() {
        rows.push(listing_row);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        format!("🏠 {}", t_lang("btn-main-menu", language_code)),
        "main_menu",
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Confirm/cancel pair for the request summary
pub fn confirm_request_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("✅ {}", t_lang("btn-confirm", language_code)),
            "confirm_request",
        ),
        InlineKeyboardButton::callback(
            format!("❌ {}", t_lang("btn-cancel", language_code)),
            "cancel",
        ),
    ]])
}

pub fn calculators_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!("📊 {}", t_lang("btn-calc-mortgage", language_code)),
            "calc_mortgage",
        )],
        vec![InlineKeyboardButton::callback(
            format!("💰 {}", t_lang("btn-calc-investment", language_code)),
            "calc_investment",
        )],
        vec![InlineKeyboardButton::callback(
            format!("🏠 {}", t_lang("btn-main-menu", language_code)),
            "main_menu",
        )],
    ])
}

pub fn admin_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                format!("👥 {}", t_lang("btn-admin-actions", language_code)),
                "admin_actions",
            ),
            InlineKeyboardButton::callback(
                format!("📊 {}", t_lang("btn-admin-stats", language_code)),
                "admin_stats",
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("📋 {}", t_lang("btn-admin-history", language_code)),
                "admin_history",
            ),
            InlineKeyboardButton::callback(
                format!("🗑 {}", t_lang("btn-admin-clear", language_code)),
                "admin_clear",
            ),
        ],
    ])
}

pub fn admin_clear_confirm_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("✅ {}", t_lang("btn-yes", language_code)),
            "admin_clear_confirm",
        ),
        InlineKeyboardButton::callback(
            format!("❌ {}", t_lang("btn-no", language_code)),
            "admin_clear_cancel",
        ),
    ]])
}

/// Group a price into thousands: `5 000 000`
pub fn format_price(price: f64) -> String {
    let whole = price.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Text card for a listing, used when there is no photo to caption
pub fn format_listing_card(
    listing: &Listing,
    position: usize,
    total: usize,
    language_code: Option<&str>,
) -> String {
    let mut card = format!(
        "🏠 {}\n",
        t_args_lang(
            "listing-position",
            &[("current", &position.to_string()), ("total", &total.to_string())],
            language_code,
        )
    );
    card.push_str(&format!(
        "🆔 {}: {}\n",
        t_lang("listing-id", language_code),
        listing.id
    ));
    card.push_str(&format!(
        "🏢 {}: {}\n",
        t_lang("listing-type", language_code),
        listing.property_type
    ));
    card.push_str(&format!(
        "💼 {}: {}\n",
        t_lang("listing-deal", language_code),
        listing.deal_type
    ));
    card.push_str(&format!(
        "📍 {}: {}\n",
        t_lang("listing-district", language_code),
        listing.district
    ));
    card.push_str(&format!(
        "💰 {}: {} ₽\n",
        t_lang("listing-price", language_code),
        format_price(listing.price)
    ));
    if let Some(rooms) = listing.rooms {
        card.push_str(&format!(
            "🛏 {}: {}\n",
            t_lang("listing-rooms", language_code),
            rooms
        ));
    }

    let description = if listing.description.is_empty() {
        t_lang("listing-no-description", language_code)
    } else {
        listing.description.clone()
    };
    card.push_str(&format!("\n📝 {description}"));
    card
}

/// Caption for a listing photo, with photo pagination info appended
pub fn format_photo_caption(
    listing: &Listing,
    position: usize,
    total: usize,
    photo_position: usize,
    photo_total: usize,
    language_code: Option<&str>,
) -> String {
    let mut caption = format_listing_card(listing, position, total, language_code);
    caption.push_str(&format!(
        "\n\n📸 {}",
        t_args_lang(
            "photo-position",
            &[
                ("current", &photo_position.to_string()),
                ("total", &photo_total.to_string()),
            ],
            language_code,
        )
    ));
    caption
}

/// Summary shown to the user before the final confirm
pub fn format_request_summary(
    record: &RequestRecord,
    listing: &Listing,
    language_code: Option<&str>,
) -> String {
    let comments = if record.comments.is_empty() {
        t_lang("request-no-comments", language_code)
    } else {
        record.comments.clone()
    };
    format!(
        "📋 {}\n\n👤 {}: {}\n📱 {}: {}\n🏠 {}: {} ({}, {})\n💬 {}: {}",
        t_lang("request-summary-title", language_code),
        t_lang("request-name-label", language_code),
        record.name,
        t_lang("request-phone-label", language_code),
        record.phone,
        t_lang("request-listing-label", language_code),
        listing.id,
        listing.district,
        format_price(listing.price),
        t_lang("request-comments-label", language_code),
        comments,
    )
}

/// Notification relayed to the admin chat after a durable write
pub fn format_admin_request_notification(record: &RequestRecord, listing: &Listing) -> String {
    t_args_lang(
        "admin-new-request",
        &[
            ("user_id", &record.user_id.to_string()),
            ("username", &record.username),
            ("name", &record.name),
            ("phone", &record.phone),
            ("listing_id", &record.listing_id),
            ("district", &listing.district),
            ("price", &format_price(listing.price)),
            ("timestamp", &record.submitted_at.format("%Y-%m-%d %H:%M").to_string()),
        ],
        None,
    )
}

/// Short notice relayed to the admin chat on an interest event
pub fn format_admin_interest_notification(
    user_id: i64,
    username: &str,
    listing: &Listing,
) -> String {
    t_args_lang(
        "admin-interest",
        &[
            ("user_id", &user_id.to_string()),
            ("username", username),
            ("listing_id", &listing.id),
            ("district", &listing.district),
            ("price", &format_price(listing.price)),
        ],
        None,
    )
}

/// Numbered list of recent actions for the admin panel
pub fn format_actions_list(actions: &[ActionRecord]) -> String {
    actions
        .iter()
        .map(|a| {
            format!(
                "ID: {} (@{}) - {} - {}",
                a.user_id, a.username, a.action, a.created_at
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
