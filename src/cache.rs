//! # Listing Cache Module
//!
//! A single-slot TTL cache fronting the spreadsheet read path so bursts of
//! near-simultaneous searches do not each refetch the sheet. Eviction is
//! time-based only. The clock is injected so tests can drive expiry.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::listing_model::Listing;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheSlot {
    listings: Vec<Listing>,
    stored_at: Instant,
}

/// Time-bounded snapshot of the listings sheet
pub struct ListingCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CacheSlot>>,
}

impl ListingCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// The cached snapshot, if one exists and has not expired
    pub fn get(&self) -> Option<Vec<Listing>> {
        let slot = self.slot.lock().unwrap();
        match slot.as_ref() {
            Some(entry) if self.clock.now().duration_since(entry.stored_at) < self.ttl => {
                Some(entry.listings.clone())
            }
            _ => None,
        }
    }

    /// The cached snapshot even when stale, used as a fallback after a
    /// failed refresh
    pub fn get_stale(&self) -> Option<Vec<Listing>> {
        let slot = self.slot.lock().unwrap();
        slot.as_ref().map(|entry| entry.listings.clone())
    }

    /// Replace the snapshot and restart its TTL
    pub fn store(&self, listings: Vec<Listing>) {
        let mut slot = self.slot.lock().unwrap();
        *slot = Some(CacheSlot {
            listings,
            stored_at: self.clock.now(),
        });
    }

    /// Drop the snapshot entirely
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap();
        *slot = None;
    }
}
