//! Health spending account ledger.
//!
//! A small REST service that keeps account balances, issues synthetic
//! payment cards and authorizes merchant purchases against a fixed list of
//! qualified merchant category codes.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
