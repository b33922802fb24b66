//! # Pagination Cursor Module
//!
//! Tracks which listing and which of its photos a user is looking at.
//! Navigation past either end is a no-op that reports the boundary instead
//! of failing, and switching listings always starts at the first photo.

use serde::{Deserialize, Serialize};

/// The (listing index, photo index) pair for one viewing session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCursor {
    pub listing: usize,
    pub photo: usize,
}

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Moved(ViewCursor),
    /// The candidate index fell outside `[0, count)`; cursor unchanged
    AtBoundary,
}

impl ViewCursor {
    pub fn next_photo(self, photo_count: usize) -> Move {
        if self.photo + 1 >= photo_count {
            return Move::AtBoundary;
        }
        Move::Moved(Self {
            listing: self.listing,
            photo: self.photo + 1,
        })
    }

    pub fn prev_photo(self) -> Move {
        if self.photo == 0 {
            return Move::AtBoundary;
        }
        Move::Moved(Self {
            listing: self.listing,
            photo: self.photo - 1,
        })
    }

    pub fn next_listing(self, listing_count: usize) -> Move {
        if self.listing + 1 >= listing_count {
            return Move::AtBoundary;
        }
        Move::Moved(Self {
            listing: self.listing + 1,
            photo: 0,
        })
    }

    pub fn prev_listing(self) -> Move {
        if self.listing == 0 {
            return Move::AtBoundary;
        }
        Move::Moved(Self {
            listing: self.listing - 1,
            photo: 0,
        })
    }

    /// Re-establish `0 <= listing < count` and `0 <= photo < photos(listing)`
    /// after the listing set changed under the cursor
    pub fn clamped(self, listing_count: usize, photo_count: usize) -> Self {
        let listing = if listing_count == 0 {
            0
        } else {
            self.listing.min(listing_count - 1)
        };
        let photo = if photo_count == 0 {
            0
        } else {
            self.photo.min(photo_count - 1)
        };
        Self { listing, photo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_photo_within_bounds() {
        let cursor = ViewCursor { listing: 1, photo: 0 };
        assert_eq!(
            cursor.next_photo(3),
            Move::Moved(ViewCursor { listing: 1, photo: 1 })
        );
    }

    #[test]
    fn test_next_photo_at_last_is_boundary() {
        let cursor = ViewCursor { listing: 0, photo: 2 };
        assert_eq!(cursor.next_photo(3), Move::AtBoundary);
    }

    #[test]
    fn test_prev_photo_at_first_is_boundary() {
        let cursor = ViewCursor::default();
        assert_eq!(cursor.prev_photo(), Move::AtBoundary);
    }

    #[test]
    fn test_next_listing_resets_photo() {
        let cursor = ViewCursor { listing: 0, photo: 4 };
        assert_eq!(
            cursor.next_listing(3),
            Move::Moved(ViewCursor { listing: 1, photo: 0 })
        );
    }

    #[test]
    fn test_prev_listing_resets_photo() {
        let cursor = ViewCursor { listing: 2, photo: 4 };
        assert_eq!(
            cursor.prev_listing(),
            Move::Moved(ViewCursor { listing: 1, photo: 0 })
        );
    }

    #[test]
    fn test_last_listing_next_is_noop() {
        // 3 entries, cursor on the last one: next_listing must not move
        let cursor = ViewCursor { listing: 2, photo: 0 };
        assert_eq!(cursor.next_listing(3), Move::AtBoundary);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let cursor = ViewCursor { listing: 5, photo: 7 };
        assert_eq!(cursor.clamped(3, 2), ViewCursor { listing: 2, photo: 1 });
        assert_eq!(cursor.clamped(0, 0), ViewCursor::default());
    }
}
