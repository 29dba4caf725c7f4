//! # shelf-web
//!
//! Web application for Shelf, a small per-user product catalogue.
//!
//! This crate provides:
//! - Product listing, create, edit and delete pages for the logged-in user
//! - Account registration, login and logout with store-backed sessions
//! - JSON and XML dumps of the product table
//! - An AJAX endpoint that stores submitted products as-is
//!
//! ## Tech Stack
//!
//! - Axum for HTTP server
//! - Static assets bundled via `rust-embed`
//! - Server-rendered HTML with Tailwind CSS

pub mod assets;
pub mod auth;
pub mod cookies;
pub mod csrf;
pub mod error;
pub mod export;
pub mod extract;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use error::ShelfError;
pub use routes::create_router;
pub use server::ShelfServer;
pub use state::AppState;
