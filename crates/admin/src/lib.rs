//! Jerseyworks Admin library.
//!
//! Back-office JSON API: catalog maintenance, order fulfilment, role
//! management, store settings and sales reports. Every `/api` route sits
//! behind the `RequireAdmin` guard.
//!
//! # Security
//!
//! This crate reads and changes every customer's orders. Bind it to a
//! private interface or enable TLS.

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
