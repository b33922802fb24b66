use realtybot::cursor::{Move, ViewCursor};
use realtybot::filter::{filter_listings, FilterCriteria, RoomsFilter};
use realtybot::listing_model::Listing;
use realtybot::sheets::parse_listing_rows;

fn listing(id: &str, district: &str, price: f64, rooms: Option<u32>) -> Listing {
    Listing {
        id: id.to_string(),
        property_type: "Apartment".to_string(),
        deal_type: "Rent".to_string(),
        district: district.to_string(),
        price,
        rooms,
        description: format!("listing {id}"),
        photo_urls: Vec::new(),
    }
}

fn criteria() -> FilterCriteria {
    FilterCriteria {
        property_type: "Apartment".to_string(),
        deal_type: "Rent".to_string(),
        district: "Central".to_string(),
        budget_max: 50000.0,
        rooms: RoomsFilter::Exactly(2),
    }
}

/// Every listing returned by the filter satisfies all constraints
#[test]
fn test_filter_results_satisfy_all_constraints() {
    let listings = vec![
        listing("1", "Central", 40000.0, Some(2)),
        listing("2", "Central", 60000.0, Some(2)), // over budget
        listing("3", "Western", 40000.0, Some(2)), // wrong district
        listing("4", "Central", 40000.0, Some(3)), // wrong rooms
        listing("5", "Central", 50000.0, Some(2)), // exactly at budget
    ];

    let found = filter_listings(&listings, &criteria());
    assert_eq!(found.len(), 2);
    for l in &found {
        assert!(l.price <= 50000.0);
        assert_eq!(l.district, "Central");
        assert_eq!(l.rooms, Some(2));
    }
}

/// Two listings differing only in room count, budget 50000, rooms = 2;
/// exactly the first one matches
#[test]
fn test_two_listings_rooms_scenario() {
    let listings = vec![
        listing("first", "Central", 40000.0, Some(2)),
        listing("second", "Central", 40000.0, Some(3)),
    ];

    let found = filter_listings(&listings, &criteria());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "first");
}

/// Advancing past the last of three listings keeps the cursor in place
#[test]
fn test_next_listing_on_last_of_three_is_noop() {
    let cursor = ViewCursor { listing: 2, photo: 0 };
    assert_eq!(cursor.next_listing(3), Move::AtBoundary);
}

/// Walking a three-listing result end to end and back
#[test]
fn test_cursor_walk() {
    let count = 3;
    let mut cursor = ViewCursor::default();

    for expected in [1, 2] {
        match cursor.next_listing(count) {
            Move::Moved(next) => {
                cursor = next;
                assert_eq!(cursor.listing, expected);
                assert_eq!(cursor.photo, 0);
            }
            Move::AtBoundary => panic!("Unexpected boundary at listing {expected}"),
        }
    }
    assert_eq!(cursor.next_listing(count), Move::AtBoundary);

    match cursor.prev_listing() {
        Move::Moved(prev) => assert_eq!(prev.listing, 1),
        Move::AtBoundary => panic!("Unexpected boundary going back"),
    }
}

/// Photo navigation stays inside the photo set and switching listings
/// restarts from the first photo
#[test]
fn test_photo_navigation_bounds() {
    let mut cursor = ViewCursor { listing: 0, photo: 0 };
    let photo_count = 2;

    cursor = match cursor.next_photo(photo_count) {
        Move::Moved(next) => next,
        Move::AtBoundary => panic!("Expected a second photo"),
    };
    assert_eq!(cursor.photo, 1);
    assert_eq!(cursor.next_photo(photo_count), Move::AtBoundary);

    match cursor.next_listing(2) {
        Move::Moved(next) => assert_eq!(next.photo, 0),
        Move::AtBoundary => panic!("Expected a second listing"),
    }
}

/// Filtering straight from raw sheet rows: the parse boundary and the
/// filter compose
#[test]
fn test_filter_over_parsed_rows() {
    let rows: Vec<Vec<String>> = vec![
        vec!["id", "property_type", "deal_type", "district", "price", "rooms"],
        vec!["10", "Apartment", "Rent", "Central", "45 000", "2"],
        vec!["11", "apartment", "rent", "central", "30000", "2"],
        vec!["12", "Apartment", "Rent", "Central", "junk", "2"],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(String::from).collect())
    .collect();

    let listings = parse_listing_rows(&rows).unwrap();
    assert_eq!(listings.len(), 2);

    let found = filter_listings(&listings, &criteria());
    let ids: Vec<&str> = found.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["10", "11"]);
}
