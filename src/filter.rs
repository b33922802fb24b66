//! # Listing Filter Module
//!
//! Linear filtering of listings against the criteria collected during a
//! search conversation. No ranking: the output preserves source order.

use serde::{Deserialize, Serialize};

use crate::listing_model::Listing;

/// Room-count constraint collected at the last filter step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomsFilter {
    /// No constraint; listings with a blank room count are included
    Any,
    Exactly(u32),
}

/// The set of search constraints collected from a user in one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub property_type: String,
    pub deal_type: String,
    pub district: String,
    pub budget_max: f64,
    pub rooms: RoomsFilter,
}

impl FilterCriteria {
    /// Whether a single listing satisfies every constraint
    pub fn matches(&self, listing: &Listing) -> bool {
        if !eq_ignore_case(&listing.property_type, &self.property_type) {
            return false;
        }
        if !eq_ignore_case(&listing.deal_type, &self.deal_type) {
            return false;
        }
        if !eq_ignore_case(&listing.district, &self.district) {
            return false;
        }
        if listing.price > self.budget_max {
            return false;
        }
        match self.rooms {
            RoomsFilter::Any => true,
            RoomsFilter::Exactly(wanted) => listing.rooms == Some(wanted),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Scan the full listing set and keep matches, preserving source order
pub fn filter_listings(listings: &[Listing], criteria: &FilterCriteria) -> Vec<Listing> {
    listings
        .iter()
        .filter(|listing| criteria.matches(listing))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, rooms: Option<u32>, price: f64) -> Listing {
        Listing {
            id: id.to_string(),
            property_type: "Apartment".to_string(),
            deal_type: "Rent".to_string(),
            district: "Central".to_string(),
            price,
            rooms,
            description: String::new(),
            photo_urls: Vec::new(),
        }
    }

    fn criteria(rooms: RoomsFilter, budget_max: f64) -> FilterCriteria {
        FilterCriteria {
            property_type: "Apartment".to_string(),
            deal_type: "Rent".to_string(),
            district: "Central".to_string(),
            budget_max,
            rooms,
        }
    }

    #[test]
    fn test_rooms_mismatch_excluded() {
        // Two listings differing only in room count; only the exact match survives
        let listings = vec![listing("1", Some(2), 40000.0), listing("2", Some(3), 40000.0)];
        let found = filter_listings(&listings, &criteria(RoomsFilter::Exactly(2), 50000.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_any_rooms_includes_blank() {
        let listings = vec![listing("1", None, 40000.0), listing("2", Some(1), 40000.0)];
        let found = filter_listings(&listings, &criteria(RoomsFilter::Any, 50000.0));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_exact_rooms_excludes_blank() {
        let listings = vec![listing("1", None, 40000.0)];
        let found = filter_listings(&listings, &criteria(RoomsFilter::Exactly(1), 50000.0));
        assert!(found.is_empty());
    }

    #[test]
    fn test_budget_is_inclusive_upper_bound() {
        let listings = vec![listing("1", Some(2), 50000.0), listing("2", Some(2), 50000.01)];
        let found = filter_listings(&listings, &criteria(RoomsFilter::Any, 50000.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_string_match_is_case_insensitive() {
        let mut odd = listing("1", Some(2), 40000.0);
        odd.property_type = "APARTMENT".to_string();
        odd.district = " central ".to_string();
        let found = filter_listings(&[odd], &criteria(RoomsFilter::Any, 50000.0));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_source_order_preserved() {
        let listings = vec![
            listing("b", Some(2), 10.0),
            listing("a", Some(2), 20.0),
            listing("c", Some(2), 15.0),
        ];
        let found = filter_listings(&listings, &criteria(RoomsFilter::Any, 100.0));
        let ids: Vec<&str> = found.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
