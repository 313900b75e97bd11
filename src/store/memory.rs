//! In-memory store backend.
//!
//! Holds everything in a mutex-guarded table. Because every mutation runs
//! under the lock, the check-then-write on a slot cannot race here; the
//! uniqueness invariant holds without a constraint. Used for local
//! development (`STORE_BACKEND=memory`) and as the store under test.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        booking::{Booking, NewBooking},
        faq::{CreateFaqRequest, Faq, UpdateFaqRequest},
    },
    store::{BookingStore, FaqStore},
};

#[derive(Default)]
struct Tables {
    bookings: Vec<Booking>,
    faqs: Vec<Faq>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    changes: broadcast::Sender<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            tables: Mutex::new(Tables::default()),
            changes,
        }
    }

    /// A poisoned lock still holds a consistent table, so the guard is
    /// recovered instead of propagating the panic to every later request.
    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let _ = self.changes.send(());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_bookings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Booking>, AppError> {
        let tables = self.lock_tables();

        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        // Zero-padded HH:MM labels sort chronologically as text
        bookings.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));

        Ok(bookings)
    }

    async fn create_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        let booking = {
            let mut tables = self.lock_tables();

            let taken = tables
                .bookings
                .iter()
                .any(|b| b.court == new.court && b.date == new.date && b.time == new.time);
            if taken {
                return Err(AppError::SlotTaken);
            }

            let booking = Booking {
                id: Uuid::new_v4(),
                court: new.court,
                date: new.date,
                time: new.time,
                name: new.name,
                comment: new.comment,
                secret_key: new.secret_key,
                created_at: Utc::now(),
            };
            tables.bookings.push(booking.clone());
            booking
        };

        self.notify();
        Ok(booking)
    }

    async fn find_booking(
        &self,
        court: i32,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Booking>, AppError> {
        let tables = self.lock_tables();

        Ok(tables
            .bookings
            .iter()
            .find(|b| b.court == court && b.date == date && b.time == time)
            .cloned())
    }

    async fn cancel_booking(&self, id: Uuid, supplied_key: &str) -> Result<(), AppError> {
        {
            let mut tables = self.lock_tables();

            let index = tables
                .bookings
                .iter()
                .position(|b| b.id == id)
                .ok_or(AppError::NotFound)?;

            if tables.bookings[index].secret_key != supplied_key {
                return Err(AppError::WrongKey);
            }

            tables.bookings.remove(index);
        }

        self.notify();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl FaqStore for MemoryStore {
    async fn list_faqs(&self) -> Result<Vec<Faq>, AppError> {
        let tables = self.lock_tables();

        let mut faqs = tables.faqs.clone();
        faqs.sort_by_key(|f| f.order);

        Ok(faqs)
    }

    async fn add_faq(&self, request: CreateFaqRequest) -> Result<Faq, AppError> {
        let mut tables = self.lock_tables();

        let now = Utc::now();
        let faq = Faq {
            id: Uuid::new_v4(),
            question: request.question,
            answer: request.answer,
            order: request.order,
            created_at: now,
            updated_at: now,
        };
        tables.faqs.push(faq.clone());

        Ok(faq)
    }

    async fn update_faq(&self, id: Uuid, request: UpdateFaqRequest) -> Result<Faq, AppError> {
        let mut tables = self.lock_tables();

        let faq = tables
            .faqs
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(AppError::NotFound)?;

        if let Some(question) = request.question {
            faq.question = question;
        }
        if let Some(answer) = request.answer {
            faq.answer = answer;
        }
        if let Some(order) = request.order {
            faq.order = order;
        }
        faq.updated_at = Utc::now();

        Ok(faq.clone())
    }

    async fn delete_faq(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.lock_tables();

        let index = tables
            .faqs
            .iter()
            .position(|f| f.id == id)
            .ok_or(AppError::NotFound)?;
        tables.faqs.remove(index);

        Ok(())
    }
}
