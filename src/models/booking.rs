//! Booking data models and API request/response types.
//!
//! This module defines:
//! - `Booking`: Database entity representing one reserved slot
//! - `NewBooking`: Validated input handed to the store for creation
//! - Request/response types for the booking endpoints
//! - `to_lookup`: Normalization of a flat booking list into the nested
//!   date → court → time mapping the weekly view consumes

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::date_key;

/// Represents a booking record from the store.
///
/// # Database Table
///
/// Maps to the `bookings` table. Each booking:
/// - Occupies exactly one (court, date, time) slot — the natural key,
///   enforced unique by the store
/// - Carries the booker's name, an optional comment, and a 6-digit
///   cancellation key stored verbatim (a possession credential, not a
///   hashed secret)
/// - Is immutable after creation; the only lifecycle transition is deletion
///
/// Deliberately not `Serialize`: the secret key must never leave the
/// server, so only [`BookingResponse`] crosses the API boundary.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Booking {
    /// Opaque row identifier
    pub id: Uuid,

    /// Court number (one of the fixed catalog)
    pub court: i32,

    /// Calendar date of the slot
    pub date: NaiveDate,

    /// Time-of-day label (one of the 8 fixed slots, e.g. "10:30")
    pub time: String,

    /// Name of the person who booked
    pub name: String,

    /// Optional free-text comment
    pub comment: Option<String>,

    /// 6-digit cancellation key, required to delete this booking
    pub secret_key: String,

    /// When the booking was created (server-set)
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a booking.
///
/// Handlers validate the raw request (court/slot membership, key format,
/// name, comment length) before building one of these, so stores can
/// assume the fields are well-formed.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub court: i32,
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub comment: Option<String>,
    pub secret_key: String,
}

/// Request to book a slot.
///
/// # JSON Example
///
/// ```json
/// {
///   "court": 2,
///   "date": "2024-06-10",
///   "time": "10:30",
///   "name": "Ana",
///   "comment": "singles, bring balls",
///   "secret_key": "123456"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub court: i32,
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub comment: Option<String>,
    pub secret_key: String,
}

/// Request body for cancelling a booking.
///
/// The key must exactly match the one stored at booking time.
#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    pub secret_key: String,
}

/// Response returned for booking operations.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "770e8400-e29b-41d4-a716-446655440002",
///   "court": 2,
///   "date": "2024-06-10",
///   "time": "10:30",
///   "name": "Ana",
///   "comment": "singles, bring balls",
///   "created_at": "2024-06-08T16:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub court: i32,
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Convert a stored Booking to an API BookingResponse.
///
/// This removes the secret_key, which must never leave the server.
impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            court: booking.court,
            date: booking.date,
            time: booking.time,
            name: booking.name,
            comment: booking.comment,
            created_at: booking.created_at,
        }
    }
}

/// What the weekly view shows for a booked slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotEntry {
    pub id: Uuid,
    pub name: String,
    pub comment: Option<String>,
}

/// Nested lookup: date key → court key → time label → slot entry.
pub type BookingLookup = BTreeMap<String, BTreeMap<String, BTreeMap<String, SlotEntry>>>;

/// Normalize a flat booking list into the nested lookup.
///
/// One pass; keys are the string forms of date, court, and time. Collisions
/// cannot occur while the slot-uniqueness invariant holds; if one slips
/// through anyway the last booking in iteration order wins.
pub fn to_lookup(bookings: &[Booking]) -> BookingLookup {
    let mut lookup = BookingLookup::new();

    for booking in bookings {
        lookup
            .entry(date_key(booking.date))
            .or_default()
            .entry(booking.court.to_string())
            .or_default()
            .insert(
                booking.time.clone(),
                SlotEntry {
                    id: booking.id,
                    name: booking.name.clone(),
                    comment: booking.comment.clone(),
                },
            );
    }

    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(court: i32, date: &str, time: &str, name: &str) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            court,
            date: date.parse().unwrap(),
            time: time.to_string(),
            name: name.to_string(),
            comment: None,
            secret_key: "123456".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_empty_lookup() {
        assert!(to_lookup(&[]).is_empty());
    }

    #[test]
    fn two_courts_at_the_same_slot_are_independent_entries() {
        let bookings = vec![
            booking(2, "2024-06-10", "10:30", "Ana"),
            booking(3, "2024-06-10", "10:30", "Luis"),
        ];

        let lookup = to_lookup(&bookings);
        let day = &lookup["2024-06-10"];

        assert_eq!(day.len(), 2);
        assert_eq!(day["2"]["10:30"].name, "Ana");
        assert_eq!(day["3"]["10:30"].name, "Luis");
    }

    #[test]
    fn colliding_bookings_last_write_wins() {
        let bookings = vec![
            booking(2, "2024-06-10", "10:30", "Ana"),
            booking(2, "2024-06-10", "10:30", "Luis"),
        ];

        let lookup = to_lookup(&bookings);
        assert_eq!(lookup["2024-06-10"]["2"]["10:30"].name, "Luis");
    }

    #[test]
    fn response_omits_the_secret_key() {
        let response: BookingResponse = booking(2, "2024-06-10", "10:30", "Ana").into();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("secret_key").is_none());
        assert_eq!(json["date"], "2024-06-10");
    }
}
