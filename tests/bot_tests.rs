use chrono::{TimeZone, Utc};
use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

use realtybot::bot::ui_builder::{
    budget_keyboard, format_admin_request_notification, format_listing_card,
    format_photo_caption, format_price, format_request_summary, listing_keyboard,
    main_menu_keyboard, rooms_keyboard,
};
use realtybot::cursor::ViewCursor;
use realtybot::listing_model::{Listing, RequestRecord};
use realtybot::localization::init_localization;

fn callback_tags(markup: &InlineKeyboardMarkup) -> Vec<String> {
    markup
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}

fn sample_listing(photos: usize) -> Listing {
    Listing {
        id: "42".to_string(),
        property_type: "Apartment".to_string(),
        deal_type: "Rent".to_string(),
        district: "Central".to_string(),
        price: 5_000_000.0,
        rooms: Some(2),
        description: "Bright two-room flat".to_string(),
        photo_urls: (0..photos)
            .map(|i| format!("https://cdn.example.com/{i}.jpg"))
            .collect(),
    }
}

fn sample_record() -> RequestRecord {
    RequestRecord {
        submitted_at: Utc.with_ymd_and_hms(2026, 8, 7, 12, 30, 0).unwrap(),
        user_id: 100,
        username: "client".to_string(),
        name: "Anna".to_string(),
        phone: "+79991234567".to_string(),
        listing_id: "42".to_string(),
        comments: "after 18:00".to_string(),
    }
}

#[test]
fn test_main_menu_tags() {
    init_localization().expect("Failed to initialize localization");

    let tags = callback_tags(&main_menu_keyboard(Some("en")));
    assert_eq!(tags, vec!["search", "calculators", "contacts"]);
}

#[test]
fn test_budget_tags_carry_numeric_bounds() {
    init_localization().expect("Failed to initialize localization");

    for tag in callback_tags(&budget_keyboard(Some("en"))) {
        let bound = tag.strip_prefix("budget_").expect("budget tag prefix");
        assert!(bound.parse::<u64>().is_ok(), "tag: {tag}");
    }
}

#[test]
fn test_rooms_keyboard_offers_any() {
    init_localization().expect("Failed to initialize localization");

    let tags = callback_tags(&rooms_keyboard(Some("en")));
    assert!(tags.contains(&"rooms_any".to_string()));
    assert!(tags.contains(&"rooms_1".to_string()));
    assert!(tags.contains(&"rooms_5".to_string()));
}

/// A listing with no photos gets no photo-navigation controls
#[test]
fn test_listing_keyboard_without_photos() {
    init_localization().expect("Failed to initialize localization");

    let cursor = ViewCursor::default();
    let tags = callback_tags(&listing_keyboard(cursor, 3, 0, Some("en")));

    assert!(tags.contains(&"interested".to_string()));
    assert!(tags.contains(&"next_listing".to_string()));
    assert!(tags.contains(&"main_menu".to_string()));
    assert!(!tags.contains(&"next_photo".to_string()));
    assert!(!tags.contains(&"prev_photo".to_string()));
    assert!(!tags.contains(&"prev_listing".to_string()));
}

/// Only the moves that exist are rendered
#[test]
fn test_listing_keyboard_edges() {
    init_localization().expect("Failed to initialize localization");

    // Last listing of three, middle photo of three
    let cursor = ViewCursor { listing: 2, photo: 1 };
    let tags = callback_tags(&listing_keyboard(cursor, 3, 3, Some("en")));
    assert!(tags.contains(&"prev_photo".to_string()));
    assert!(tags.contains(&"next_photo".to_string()));
    assert!(tags.contains(&"prev_listing".to_string()));
    assert!(!tags.contains(&"next_listing".to_string()));

    // Single listing with a single photo: only interest and menu remain
    let tags = callback_tags(&listing_keyboard(ViewCursor::default(), 1, 1, Some("en")));
    assert_eq!(tags, vec!["interested", "main_menu"]);
}

#[test]
fn test_format_price_groups_thousands() {
    assert_eq!(format_price(5_000_000.0), "5 000 000");
    assert_eq!(format_price(45000.0), "45 000");
    assert_eq!(format_price(999.0), "999");
    assert_eq!(format_price(0.0), "0");
}

#[test]
fn test_listing_card_content() {
    init_localization().expect("Failed to initialize localization");

    let card = format_listing_card(&sample_listing(0), 1, 3, Some("en"));
    assert!(card.contains("42"));
    assert!(card.contains("5 000 000"));
    assert!(card.contains("Bright two-room flat"));
    assert!(card.contains('2'));

    // Rooms line disappears for a listing with a blank room count
    let mut without_rooms = sample_listing(0);
    without_rooms.rooms = None;
    let card = format_listing_card(&without_rooms, 1, 3, Some("en"));
    assert!(!card.contains("Rooms"));
}

#[test]
fn test_photo_caption_includes_pagination() {
    init_localization().expect("Failed to initialize localization");

    let caption = format_photo_caption(&sample_listing(4), 2, 5, 3, 4, Some("en"));
    assert!(caption.contains("Listing 2 of 5"), "caption: {caption}");
    assert!(caption.contains("Photo 3 of 4"), "caption: {caption}");
}

#[test]
fn test_request_summary_and_notification() {
    init_localization().expect("Failed to initialize localization");

    let record = sample_record();
    let listing = sample_listing(1);

    let summary = format_request_summary(&record, &listing, Some("en"));
    assert!(summary.contains("Anna"));
    assert!(summary.contains("+79991234567"));
    assert!(summary.contains("after 18:00"));

    let notification = format_admin_request_notification(&record, &listing);
    assert!(notification.contains("Anna"));
    assert!(notification.contains("+79991234567"));
    assert!(notification.contains("42"));
    assert!(notification.contains("2026-08-07 12:30"));
}

#[test]
fn test_request_record_row_order() {
    let record = sample_record();
    let row = record.to_row();
    assert_eq!(
        row,
        vec![
            "2026-08-07 12:30",
            "100",
            "client",
            "Anna",
            "+79991234567",
            "42",
            "after 18:00",
        ]
    );
}
