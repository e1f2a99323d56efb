//! # Bookify Shared Library
//!
//! Types, persistence and business rules shared by the Bookify API server
//! and the payment gateway crate.
//!
//! ## Module Organization
//!
//! - `models`: Database models (hotels, rooms, users, reservations, payments)
//! - `booking`: Availability checking, reservation lifecycle and the
//!   transactional booking service
//! - `auth`: Password hashing, JWT tokens and request authorization
//! - `db`: Connection pool and embedded migrations
//! - `money`: Minor-unit money helpers

pub mod auth;
pub mod booking;
pub mod db;
pub mod models;
pub mod money;

/// Current version of the Bookify shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
