//! Store abstraction over the booking and FAQ tables.
//!
//! The service runs against exactly one backend, selected at startup from
//! configuration (see [`crate::config::StoreBackend`]). Handlers only ever
//! see the traits defined here, so backends are interchangeable:
//!
//! - [`postgres::PostgresStore`] — the production backend; slot uniqueness
//!   is enforced by a real database constraint.
//! - [`memory::MemoryStore`] — an in-process backend for local development
//!   and tests; mutations are serialized behind a mutex.
//!
//! Both backends signal a `tokio::sync::broadcast` channel after every
//! successful booking mutation, which drives the live-update snapshot
//! stream in `handlers::live`.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        booking::{Booking, NewBooking},
        faq::{CreateFaqRequest, Faq, UpdateFaqRequest},
    },
};

/// CRUD access to the bookings table, plus change notifications.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Every booking whose date falls in the inclusive range, ordered by
    /// date then time.
    async fn list_bookings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Booking>, AppError>;

    /// Create a booking for a free slot.
    ///
    /// Fails with [`AppError::SlotTaken`] when a booking already occupies
    /// the `(court, date, time)` triple.
    async fn create_booking(&self, new: NewBooking) -> Result<Booking, AppError>;

    /// Point lookup by the natural key. Absence is not an error.
    async fn find_booking(
        &self,
        court: i32,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Booking>, AppError>;

    /// Delete the booking with `id` if `supplied_key` exactly matches its
    /// stored key.
    ///
    /// Fails with [`AppError::WrongKey`] on mismatch and
    /// [`AppError::NotFound`] when the id no longer exists.
    async fn cancel_booking(&self, id: Uuid, supplied_key: &str) -> Result<(), AppError>;

    /// Receiver signalled after every successful create or cancel.
    ///
    /// Subscribers re-list and replace their whole snapshot on each signal;
    /// no diffs are delivered.
    fn subscribe(&self) -> broadcast::Receiver<()>;
}

/// CRUD access to the FAQ list.
#[async_trait]
pub trait FaqStore: Send + Sync {
    /// All entries, ascending by display order.
    async fn list_faqs(&self) -> Result<Vec<Faq>, AppError>;

    async fn add_faq(&self, request: CreateFaqRequest) -> Result<Faq, AppError>;

    /// Apply a partial update; bumps `updated_at`.
    async fn update_faq(&self, id: Uuid, request: UpdateFaqRequest) -> Result<Faq, AppError>;

    async fn delete_faq(&self, id: Uuid) -> Result<(), AppError>;
}

/// Shared handler state: one store instance serving both traits.
#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<dyn BookingStore>,
    pub faqs: Arc<dyn FaqStore>,
}
