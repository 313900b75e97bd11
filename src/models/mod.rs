//! Data models for the booking service.

pub mod booking;
pub mod faq;
