//! PostgreSQL store backend.
//!
//! All queries run against the pool created in `db.rs`. Slot uniqueness is
//! guaranteed by the `UNIQUE (court, date, time)` constraint from the
//! migrations: the pre-check in `create_booking` handles the common case
//! with a clean conflict, and the constraint catches the two-clients race
//! the pre-check cannot.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        booking::{Booking, NewBooking},
        faq::{CreateFaqRequest, Faq, UpdateFaqRequest},
    },
    store::{BookingStore, FaqStore},
};

pub struct PostgresStore {
    pool: DbPool,
    changes: broadcast::Sender<()>,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        // Subscribers that lag simply miss intermediate signals; they
        // re-list the full range on the next one, so nothing is lost.
        let (changes, _) = broadcast::channel(16);
        Self { pool, changes }
    }

    fn notify(&self) {
        // send() only errors when no subscriber exists, which is fine
        let _ = self.changes.send(());
    }
}

#[async_trait]
impl BookingStore for PostgresStore {
    async fn list_bookings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Booking>, AppError> {
        // Slot labels are zero-padded HH:MM, so text ordering is
        // chronological ordering
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, court, date, time, name, comment, secret_key, created_at
            FROM bookings
            WHERE date >= $1 AND date <= $2
            ORDER BY date, time
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn create_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        // Friendly pre-check: report the occupied slot without tripping the
        // constraint in the common case
        if self
            .find_booking(new.court, new.date, &new.time)
            .await?
            .is_some()
        {
            return Err(AppError::SlotTaken);
        }

        let result = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (court, date, time, name, comment, secret_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, court, date, time, name, comment, secret_key, created_at
            "#,
        )
        .bind(new.court)
        .bind(new.date)
        .bind(&new.time)
        .bind(&new.name)
        .bind(&new.comment)
        .bind(&new.secret_key)
        .fetch_one(&self.pool)
        .await;

        let booking = match result {
            Ok(booking) => booking,
            // Two near-simultaneous requests can both pass the pre-check;
            // the constraint decides the winner and the loser lands here
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::SlotTaken);
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            court = booking.court,
            date = %booking.date,
            time = %booking.time,
            "booking created"
        );
        self.notify();

        Ok(booking)
    }

    async fn find_booking(
        &self,
        court: i32,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, court, date, time, name, comment, secret_key, created_at
            FROM bookings
            WHERE court = $1 AND date = $2 AND time = $3
            "#,
        )
        .bind(court)
        .bind(date)
        .bind(time)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn cancel_booking(&self, id: Uuid, supplied_key: &str) -> Result<(), AppError> {
        // Fetch first so a mismatch can be told apart from a missing row
        let stored_key: String = sqlx::query_scalar("SELECT secret_key FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)?;

        // Exact, case-sensitive string match
        if stored_key != supplied_key {
            return Err(AppError::WrongKey);
        }

        // The key is re-checked in the DELETE so a concurrent re-booking of
        // the same row id cannot be removed with a stale key
        let deleted = sqlx::query("DELETE FROM bookings WHERE id = $1 AND secret_key = $2")
            .bind(id)
            .bind(supplied_key)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound);
        }

        tracing::info!(%id, "booking cancelled");
        self.notify();

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl FaqStore for PostgresStore {
    async fn list_faqs(&self) -> Result<Vec<Faq>, AppError> {
        let faqs = sqlx::query_as::<_, Faq>(
            r#"
            SELECT id, question, answer, "order", created_at, updated_at
            FROM faqs
            ORDER BY "order" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(faqs)
    }

    async fn add_faq(&self, request: CreateFaqRequest) -> Result<Faq, AppError> {
        let faq = sqlx::query_as::<_, Faq>(
            r#"
            INSERT INTO faqs (question, answer, "order")
            VALUES ($1, $2, $3)
            RETURNING id, question, answer, "order", created_at, updated_at
            "#,
        )
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(faq)
    }

    async fn update_faq(&self, id: Uuid, request: UpdateFaqRequest) -> Result<Faq, AppError> {
        // COALESCE keeps the stored value for any omitted field
        let faq = sqlx::query_as::<_, Faq>(
            r#"
            UPDATE faqs
            SET question = COALESCE($2, question),
                answer = COALESCE($3, answer),
                "order" = COALESCE($4, "order"),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, question, answer, "order", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.order)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(faq)
    }

    async fn delete_faq(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
