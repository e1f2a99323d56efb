//! # Bookify API Server Library
//!
//! HTTP surface of the Bookify hotel-booking service.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and JWT auth layer
//! - `bootstrap`: Startup tasks such as creating the initial administrator
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
