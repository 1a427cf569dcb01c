// src/lib.rs

//! Ranked battle season notice collector
//!
//! Pulls the official news feed, keeps the season announcements, extracts
//! their season number and regulation letter, and maintains a published
//! season to regulation table.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "lambda")]
pub mod lambda;
