//! API route handlers

pub mod account;
pub mod auth;
pub mod bot;
