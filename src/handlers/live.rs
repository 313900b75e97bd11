//! Live-update subscription endpoint.
//!
//! `GET /api/v1/bookings/subscribe?start=&end=` streams Server-Sent Events
//! carrying **full snapshots** of the watched date range — never diffs.
//! Clients replace their cached copy wholesale on every event, so a late
//! snapshot and a manual refresh reconcile by last-write-wins.
//!
//! Delivery contract:
//! 1. One snapshot immediately on connect.
//! 2. If no change signal arrives within 5 seconds, one fallback refresh is
//!    pushed (single-shot; there is no retry loop).
//! 3. After that, one snapshot per change signal from the store.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::NaiveDate;
use futures::{Stream, StreamExt, stream};
use tokio::sync::broadcast;

use crate::{
    error::AppError,
    handlers::bookings::RangeQuery,
    models::booking::{BookingLookup, to_lookup},
    store::{AppState, BookingStore},
};

/// Bounded wait before the one-shot fallback refresh.
const FALLBACK_WAIT: Duration = Duration::from_secs(5);

/// One delivery to a subscriber.
enum Push {
    /// Full replacement snapshot of the watched range.
    Snapshot(BookingLookup),
    /// The store could not be listed; the stream stays open.
    Unavailable,
}

impl Push {
    fn into_event(self) -> Event {
        match self {
            Push::Snapshot(lookup) => Event::default()
                .event("snapshot")
                .json_data(lookup)
                .unwrap_or_else(|err| {
                    tracing::error!(%err, "failed to serialize snapshot");
                    Event::default()
                        .event("transport_error")
                        .data("snapshot serialization failed")
                }),
            Push::Unavailable => Event::default()
                .event("transport_error")
                .data("store unavailable"),
        }
    }
}

enum Phase {
    /// Snapshot sent straight away, before any waiting.
    Initial,
    /// First wait for a change, bounded by [`FALLBACK_WAIT`].
    FirstWait,
    /// Every later wait, unbounded.
    Steady,
}

struct Watch {
    store: Arc<dyn BookingStore>,
    rx: broadcast::Receiver<()>,
    start: NaiveDate,
    end: NaiveDate,
    phase: Phase,
}

/// The snapshot stream behind the SSE endpoint.
///
/// Ends only when the store's change channel closes.
fn watch_bookings(
    store: Arc<dyn BookingStore>,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Stream<Item = Push> {
    let watch = Watch {
        rx: store.subscribe(),
        store,
        start,
        end,
        phase: Phase::Initial,
    };

    stream::unfold(watch, |mut watch| async move {
        match watch.phase {
            Phase::Initial => {
                watch.phase = Phase::FirstWait;
            }
            Phase::FirstWait => {
                watch.phase = Phase::Steady;
                match tokio::time::timeout(FALLBACK_WAIT, watch.rx.recv()).await {
                    // Change signal, or the bounded wait elapsed: refresh
                    // either way
                    Ok(Ok(())) | Err(_) => {}
                    // A lagged receiver just missed intermediate signals;
                    // the fresh list below covers them
                    Ok(Err(broadcast::error::RecvError::Lagged(_))) => {}
                    Ok(Err(broadcast::error::RecvError::Closed)) => return None,
                }
            }
            Phase::Steady => loop {
                match watch.rx.recv().await {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => break,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            },
        }

        let push = match watch.store.list_bookings(watch.start, watch.end).await {
            Ok(bookings) => Push::Snapshot(to_lookup(&bookings)),
            Err(err) => {
                tracing::warn!(%err, "snapshot refresh failed");
                Push::Unavailable
            }
        };

        Some((push, watch))
    })
}

/// SSE subscription handler.
///
/// The range defaults to the current Monday-to-Sunday week. Events are
/// named `snapshot` and carry the nested date → court → time lookup; a
/// store failure mid-stream emits a `transport_error` event and the stream
/// stays open for the next change.
pub async fn subscribe(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let (start, end) = range.resolve()?;

    let stream = watch_bookings(state.bookings, start, end)
        .map(|push| Ok::<_, Infallible>(push.into_event()));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::booking::NewBooking, store::memory::MemoryStore};
    use tokio::time::Instant;

    fn new_booking(court: i32, date: &str, time: &str, name: &str, key: &str) -> NewBooking {
        NewBooking {
            court,
            date: date.parse().unwrap(),
            time: time.to_string(),
            name: name.to_string(),
            comment: None,
            secret_key: key.to_string(),
        }
    }

    // Paused clock: waits auto-advance only up to the next timer, so the
    // 5-second bound is observed exactly.
    #[tokio::test(start_paused = true)]
    async fn delivers_connect_snapshot_then_one_fallback_then_change_snapshots() {
        let store: Arc<dyn BookingStore> = Arc::new(MemoryStore::new());
        store
            .create_booking(new_booking(2, "2024-06-10", "10:30", "Ana", "123456"))
            .await
            .unwrap();

        let start: NaiveDate = "2024-06-10".parse().unwrap();
        let end: NaiveDate = "2024-06-16".parse().unwrap();
        let mut snapshots = Box::pin(watch_bookings(store.clone(), start, end));

        // One snapshot immediately on connect, no waiting
        let connected_at = Instant::now();
        let Some(Push::Snapshot(first)) = snapshots.next().await else {
            panic!("expected a snapshot on connect");
        };
        assert_eq!(connected_at.elapsed(), Duration::ZERO);
        assert!(first["2024-06-10"]["2"].contains_key("10:30"));

        // No change arrives: exactly one fallback refresh after the bounded wait
        let wait_began = Instant::now();
        let Some(Push::Snapshot(fallback)) = snapshots.next().await else {
            panic!("expected the fallback snapshot");
        };
        assert_eq!(wait_began.elapsed(), FALLBACK_WAIT);
        assert_eq!(fallback, first);

        // Steady phase waits are unbounded; silence produces nothing more
        let quiet = tokio::time::timeout(Duration::from_secs(600), snapshots.next()).await;
        assert!(quiet.is_err(), "no snapshot should arrive without a change");

        // A booking change pushes a snapshot containing the new booking
        store
            .create_booking(new_booking(3, "2024-06-10", "10:30", "Luis", "654321"))
            .await
            .unwrap();
        let Some(Push::Snapshot(updated)) = snapshots.next().await else {
            panic!("expected a snapshot after the change");
        };
        assert!(updated["2024-06-10"]["3"].contains_key("10:30"));
        assert!(updated["2024-06-10"]["2"].contains_key("10:30"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_pushed_as_a_full_replacement() {
        let store: Arc<dyn BookingStore> = Arc::new(MemoryStore::new());
        let booking = store
            .create_booking(new_booking(2, "2024-06-10", "10:30", "Ana", "123456"))
            .await
            .unwrap();

        let start: NaiveDate = "2024-06-10".parse().unwrap();
        let end: NaiveDate = "2024-06-16".parse().unwrap();
        let mut snapshots = Box::pin(watch_bookings(store.clone(), start, end));

        let Some(Push::Snapshot(first)) = snapshots.next().await else {
            panic!("expected a snapshot on connect");
        };
        assert!(!first.is_empty());

        store.cancel_booking(booking.id, "123456").await.unwrap();
        let Some(Push::Snapshot(after_cancel)) = snapshots.next().await else {
            panic!("expected a snapshot after the cancellation");
        };
        assert!(after_cancel.is_empty());
    }
}
