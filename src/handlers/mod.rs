//! HTTP request handlers.

pub mod bookings;
pub mod faqs;
pub mod health;
pub mod live;
