//! # Listing Model Module
//!
//! Schemas for the two spreadsheet-backed record types and the validating
//! parse applied at the service boundary. Spreadsheet rows arrive as loose
//! strings; everything the rest of the bot touches goes through here first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{MAX_LISTING_PRICE, SUPPORTED_IMAGE_FORMATS};
use crate::errors::BotError;

/// One real-estate record available for browsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub property_type: String,
    pub deal_type: String,
    pub district: String,
    pub price: f64,
    pub rooms: Option<u32>,
    pub description: String,
    pub photo_urls: Vec<String>,
}

/// Column headers expected on the listings sheet
const REQUIRED_COLUMNS: [&str; 5] = ["id", "property_type", "deal_type", "district", "price"];

/// Parse the header row into a lookup of column name to index
pub fn parse_header(header: &[String]) -> Result<Vec<(String, usize)>, BotError> {
    let columns: Vec<(String, usize)> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect();

    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|(name, _)| name == required) {
            return Err(BotError::Service(format!(
                "listings sheet is missing the '{required}' column"
            )));
        }
    }
    Ok(columns)
}

fn cell<'a>(columns: &[(String, usize)], row: &'a [String], name: &str) -> &'a str {
    columns
        .iter()
        .find(|(col, _)| col == name)
        .and_then(|(_, idx)| row.get(*idx))
        .map(|value| value.trim())
        .unwrap_or("")
}

/// Parse one data row into a [`Listing`], failing fast on malformed data
pub fn parse_listing_row(columns: &[(String, usize)], row: &[String]) -> Result<Listing, BotError> {
    let id = cell(columns, row, "id");
    if id.is_empty() {
        return Err(BotError::Validation("listing row has no id".to_string()));
    }

    let property_type = cell(columns, row, "property_type");
    let deal_type = cell(columns, row, "deal_type");
    let district = cell(columns, row, "district");
    if property_type.is_empty() || deal_type.is_empty() || district.is_empty() {
        return Err(BotError::Validation(format!(
            "listing {id} is missing a required field"
        )));
    }

    let price = parse_price(cell(columns, row, "price"))
        .map_err(|msg| BotError::Validation(format!("listing {id}: {msg}")))?;

    let rooms = match cell(columns, row, "rooms") {
        "" => None,
        raw => Some(raw.parse::<u32>().map_err(|_| {
            BotError::Validation(format!("listing {id}: rooms is not an integer: {raw}"))
        })?),
    };

    Ok(Listing {
        id: id.to_string(),
        property_type: property_type.to_string(),
        deal_type: deal_type.to_string(),
        district: district.to_string(),
        price,
        rooms,
        description: cell(columns, row, "description").to_string(),
        photo_urls: parse_photo_urls(cell(columns, row, "photo_url")),
    })
}

/// Normalize a spreadsheet price cell into a number
///
/// Tolerates thousands separators (spaces) and a decimal comma, which is how
/// prices commonly arrive from manually maintained sheets.
pub fn parse_price(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.replace(',', ".");
    if cleaned.is_empty() {
        return Err("price is empty".to_string());
    }
    let price = cleaned
        .parse::<f64>()
        .map_err(|_| format!("price is not a number: {raw}"))?;
    if price < 0.0 {
        return Err("price is negative".to_string());
    }
    if price > MAX_LISTING_PRICE {
        return Err("price is out of range".to_string());
    }
    Ok(price)
}

/// Split a comma-separated photo cell and keep only plausible image links
pub fn parse_photo_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| is_valid_image_url(url))
        .map(str::to_string)
        .collect()
}

fn is_valid_image_url(url: &str) -> bool {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    let lowered = url.to_lowercase();
    SUPPORTED_IMAGE_FORMATS
        .iter()
        .any(|ext| lowered.ends_with(ext))
}

/// A durable record of a submitted viewing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub submitted_at: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub phone: String,
    pub listing_id: String,
    pub comments: String,
}

impl RequestRecord {
    /// Reject a record with missing required fields before any write occurs
    pub fn validate(&self) -> Result<(), BotError> {
        if self.name.trim().is_empty() {
            return Err(BotError::Validation("request has no name".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(BotError::Validation("request has no phone".to_string()));
        }
        if self.listing_id.trim().is_empty() {
            return Err(BotError::Validation(
                "request has no listing reference".to_string(),
            ));
        }
        Ok(())
    }

    /// The spreadsheet row appended to the requests sheet
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.submitted_at.format("%Y-%m-%d %H:%M").to_string(),
            self.user_id.to_string(),
            self.username.clone(),
            self.name.clone(),
            self.phone.clone(),
            self.listing_id.clone(),
            self.comments.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn sample_header() -> Vec<(String, usize)> {
        parse_header(&strings(&[
            "id",
            "property_type",
            "deal_type",
            "district",
            "price",
            "rooms",
            "description",
            "photo_url",
        ]))
        .unwrap()
    }

    #[test]
    fn test_parse_header_rejects_missing_columns() {
        let result = parse_header(&strings(&["id", "price"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_listing_row() {
        let columns = sample_header();
        let row = strings(&[
            "42",
            "Apartment",
            "Rent",
            "Central",
            "45 000,50",
            "2",
            "Cosy two-room flat",
            "https://cdn.example.com/a.jpg, not-a-url",
        ]);

        let listing = parse_listing_row(&columns, &row).unwrap();
        assert_eq!(listing.id, "42");
        assert_eq!(listing.price, 45000.5);
        assert_eq!(listing.rooms, Some(2));
        assert_eq!(listing.photo_urls, vec!["https://cdn.example.com/a.jpg"]);
    }

    #[test]
    fn test_parse_listing_row_blank_rooms() {
        let columns = sample_header();
        let row = strings(&["7", "House", "Buy", "Western", "100000", "", "", ""]);
        let listing = parse_listing_row(&columns, &row).unwrap();
        assert_eq!(listing.rooms, None);
        assert!(listing.photo_urls.is_empty());
    }

    #[test]
    fn test_parse_listing_row_rejects_bad_rows() {
        let columns = sample_header();

        // Missing id
        let row = strings(&["", "Apartment", "Rent", "Central", "100", "", "", ""]);
        assert!(parse_listing_row(&columns, &row).is_err());

        // Unparseable price
        let row = strings(&["1", "Apartment", "Rent", "Central", "cheap", "", "", ""]);
        assert!(parse_listing_row(&columns, &row).is_err());

        // Non-integer rooms
        let row = strings(&["1", "Apartment", "Rent", "Central", "100", "two", "", ""]);
        assert!(parse_listing_row(&columns, &row).is_err());
    }

    #[test]
    fn test_parse_price_bounds() {
        assert_eq!(parse_price("5 000 000").unwrap(), 5_000_000.0);
        assert_eq!(parse_price("99,5").unwrap(), 99.5);
        assert!(parse_price("-1").is_err());
        assert!(parse_price("2000000001").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn test_photo_url_filtering() {
        let urls = parse_photo_urls(
            "https://a.example/1.jpg, ftp://a.example/2.jpg, https://a.example/3.pdf, http://a.example/4.PNG",
        );
        assert_eq!(
            urls,
            vec!["https://a.example/1.jpg", "http://a.example/4.PNG"]
        );
    }

    #[test]
    fn test_request_record_validation() {
        let record = RequestRecord {
            submitted_at: Utc::now(),
            user_id: 5,
            username: "client".to_string(),
            name: "Anna".to_string(),
            phone: "+79991234567".to_string(),
            listing_id: "42".to_string(),
            comments: String::new(),
        };
        assert!(record.validate().is_ok());

        let mut missing_phone = record.clone();
        missing_phone.phone = "  ".to_string();
        assert!(missing_phone.validate().is_err());

        let mut missing_listing = record;
        missing_listing.listing_id = String::new();
        assert!(missing_listing.validate().is_err());
    }
}
