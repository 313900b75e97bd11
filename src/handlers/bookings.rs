//! Booking HTTP handlers.
//!
//! This module implements the booking-related API endpoints:
//! - GET /api/v1/bookings - List bookings in a date range (default: this week)
//! - GET /api/v1/bookings/week - Weekly view with the nested slot lookup
//! - POST /api/v1/bookings - Book a slot
//! - GET /api/v1/bookings/find - Point lookup by (court, date, time)
//! - DELETE /api/v1/bookings/:id - Cancel a booking (requires the secret key)

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::booking::{
        BookingLookup, BookingResponse, CancelBookingRequest, CreateBookingRequest, NewBooking,
        to_lookup,
    },
    schedule::{
        self, MORNING_SLOTS, PADEL_COURTS, TIME_SLOTS, current_week_dates, date_key,
    },
    store::AppState,
};

/// Longest comment accepted on a booking.
const MAX_COMMENT_CHARS: usize = 80;

/// Inclusive date range for listing and subscription endpoints.
///
/// Both bounds default to the current Monday-to-Sunday week.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    /// Resolve the query to concrete bounds, defaulting to this week.
    pub fn resolve(self) -> Result<(NaiveDate, NaiveDate), AppError> {
        let week = current_week_dates();
        let start = self.start.unwrap_or(week[0]);
        let end = self.end.unwrap_or(week[6]);

        if start > end {
            return Err(AppError::InvalidRequest(
                "start must not be after end".to_string(),
            ));
        }

        Ok((start, end))
    }
}

/// List bookings in a date range.
///
/// # Endpoint
///
/// `GET /api/v1/bookings?start=2024-06-10&end=2024-06-16`
///
/// # Response (200 OK)
///
/// A flat array of bookings ordered by date then time. Secret keys are
/// never included.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let (start, end) = range.resolve()?;
    let bookings = state.bookings.list_bookings(start, end).await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// The weekly view: the 7 date keys, the fixed catalogs, and the nested
/// date → court → time lookup of current bookings.
#[derive(Debug, Serialize)]
pub struct WeekView {
    pub days: Vec<String>,
    pub courts: Vec<i32>,
    pub time_slots: Vec<&'static str>,
    pub morning_slots: Vec<&'static str>,
    pub bookings: BookingLookup,
}

/// Weekly view handler.
///
/// # Endpoint
///
/// `GET /api/v1/bookings/week`
///
/// Always covers the current Monday-to-Sunday week, derived from the local
/// calendar date.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "days": ["2024-06-10", "...", "2024-06-16"],
///   "courts": [2, 3],
///   "time_slots": ["09:00", "10:30", "12:00", "13:30", "16:30", "18:00", "19:30", "21:00"],
///   "morning_slots": ["09:00", "10:30", "12:00", "13:30"],
///   "bookings": {
///     "2024-06-10": { "2": { "10:30": { "id": "...", "name": "Ana", "comment": null } } }
///   }
/// }
/// ```
pub async fn week_view(State(state): State<AppState>) -> Result<Json<WeekView>, AppError> {
    let week = current_week_dates();
    let bookings = state.bookings.list_bookings(week[0], week[6]).await?;

    Ok(Json(WeekView {
        days: week.iter().map(|&d| date_key(d)).collect(),
        courts: PADEL_COURTS.to_vec(),
        time_slots: TIME_SLOTS.to_vec(),
        morning_slots: MORNING_SLOTS.to_vec(),
        bookings: to_lookup(&bookings),
    }))
}

/// Book a slot.
///
/// # Endpoint
///
/// `POST /api/v1/bookings`
///
/// # Request Body
///
/// ```json
/// {
///   "court": 2,
///   "date": "2024-06-10",
///   "time": "10:30",
///   "name": "Ana",
///   "comment": "singles",
///   "secret_key": "123456"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns the created booking
/// - **Error (400)**: Validation failed (unknown court/slot, bad key, ...)
/// - **Error (409)**: The slot is already booked
/// - **Error (500)**: Store error
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let new = validate_booking_request(request)?;
    let booking = state.bookings.create_booking(new).await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Query parameters for the point lookup.
#[derive(Debug, Deserialize)]
pub struct FindQuery {
    pub court: i32,
    pub date: NaiveDate,
    pub time: String,
}

/// Find the booking occupying a slot, if any.
///
/// # Endpoint
///
/// `GET /api/v1/bookings/find?court=2&date=2024-06-10&time=10:30`
///
/// # Response
///
/// - **Success (200 OK)**: The booking occupying the slot
/// - **Error (404)**: The slot is free
pub async fn find_booking(
    State(state): State<AppState>,
    Query(query): Query<FindQuery>,
) -> Result<Json<BookingResponse>, AppError> {
    if !schedule::is_valid_court(query.court) {
        return Err(AppError::InvalidRequest("unknown court".to_string()));
    }
    if !schedule::is_valid_slot(&query.time) {
        return Err(AppError::InvalidRequest("unknown time slot".to_string()));
    }

    let booking = state
        .bookings
        .find_booking(query.court, query.date, &query.time)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(booking.into()))
}

/// Cancel a booking.
///
/// # Endpoint
///
/// `DELETE /api/v1/bookings/:id`
///
/// # Request Body
///
/// ```json
/// { "secret_key": "123456" }
/// ```
///
/// # Response
///
/// - **Success (204 No Content)**: Booking removed
/// - **Error (403)**: Supplied key does not match
/// - **Error (404)**: No booking with that id
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<StatusCode, AppError> {
    state
        .bookings
        .cancel_booking(booking_id, &request.secret_key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Validate a raw booking request into store-ready input.
///
/// # Rules
///
/// - `court` must be one of the club's courts
/// - `time` must be one of the 8 fixed slot labels
/// - `name` must be non-empty after trimming (the trimmed form is stored)
/// - `secret_key` must be exactly 6 ASCII digits
/// - `comment` is capped at 80 characters; a blank comment is dropped
fn validate_booking_request(request: CreateBookingRequest) -> Result<NewBooking, AppError> {
    if !schedule::is_valid_court(request.court) {
        return Err(AppError::InvalidRequest(format!(
            "unknown court {}",
            request.court
        )));
    }

    if !schedule::is_valid_slot(&request.time) {
        return Err(AppError::InvalidRequest(format!(
            "unknown time slot {:?}",
            request.time
        )));
    }

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }

    if request.secret_key.len() != 6 || !request.secret_key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidRequest(
            "secret key must be exactly 6 digits".to_string(),
        ));
    }

    let comment = request
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if let Some(ref comment) = comment {
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::InvalidRequest(format!(
                "comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }
    }

    Ok(NewBooking {
        court: request.court,
        date: request.date,
        time: request.time,
        name: name.to_string(),
        comment,
        secret_key: request.secret_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateBookingRequest {
        CreateBookingRequest {
            court: 2,
            date: "2024-06-10".parse().unwrap(),
            time: "10:30".to_string(),
            name: "Ana".to_string(),
            comment: None,
            secret_key: "123456".to_string(),
        }
    }

    fn rejects(request: CreateBookingRequest) -> String {
        match validate_booking_request(request) {
            Err(AppError::InvalidRequest(msg)) => msg,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let new = validate_booking_request(request()).unwrap();
        assert_eq!(new.court, 2);
        assert_eq!(new.time, "10:30");
        assert_eq!(new.name, "Ana");
    }

    #[test]
    fn trims_the_name_and_rejects_blank_ones() {
        let mut req = request();
        req.name = "  Ana  ".to_string();
        assert_eq!(validate_booking_request(req).unwrap().name, "Ana");

        let mut req = request();
        req.name = "   ".to_string();
        assert!(rejects(req).contains("name"));
    }

    #[test]
    fn rejects_unknown_courts_and_slots() {
        let mut req = request();
        req.court = 1;
        assert!(rejects(req).contains("court"));

        let mut req = request();
        req.time = "08:00".to_string();
        assert!(rejects(req).contains("time slot"));
    }

    #[test]
    fn secret_key_must_be_six_ascii_digits() {
        for bad in ["12345", "1234567", "12a456", "12 456", "１２３４５６"] {
            let mut req = request();
            req.secret_key = bad.to_string();
            assert!(rejects(req).contains("6 digits"), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn range_bounds_default_to_the_current_week() {
        let week = current_week_dates();

        let (start, end) = RangeQuery { start: None, end: None }.resolve().unwrap();
        assert_eq!((start, end), (week[0], week[6]));

        // A single given bound keeps the week default for the other
        let (start, end) = RangeQuery {
            start: Some(week[2]),
            end: None,
        }
        .resolve()
        .unwrap();
        assert_eq!((start, end), (week[2], week[6]));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let range = RangeQuery {
            start: Some("2024-06-16".parse().unwrap()),
            end: Some("2024-06-10".parse().unwrap()),
        };

        match range.resolve() {
            Err(AppError::InvalidRequest(msg)) => assert!(msg.contains("start")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn comment_is_capped_and_blank_comments_are_dropped() {
        let mut req = request();
        req.comment = Some("x".repeat(81));
        assert!(rejects(req).contains("80"));

        let mut req = request();
        req.comment = Some("x".repeat(80));
        assert!(validate_booking_request(req).unwrap().comment.is_some());

        let mut req = request();
        req.comment = Some("   ".to_string());
        assert!(validate_booking_request(req).unwrap().comment.is_none());
    }
}
