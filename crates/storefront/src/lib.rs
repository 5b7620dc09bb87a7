//! Jerseyworks Storefront library.
//!
//! Public JSON API for the jersey shop: catalog browsing, a per-user cart
//! that merges repeat adds, checkout with tiered pricing, and account pages.
//! The binary in `main.rs` wires this library to a listener; tests build the
//! same router with [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
