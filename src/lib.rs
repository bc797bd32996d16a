//! kickoff-bot - A Telegram bot that reminds subscribed chats about a team's matches.
//!
//! This crate provides:
//! - Fixture sources (team RSS feed, API-Football, football-data.org) with a short-lived cache
//! - A reminder engine sending 24h, 1h and full-time messages at most once per fixture
//! - Flat JSON persistence for subscribers and sent reminders

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod notifier;
pub mod reminder;
pub mod service;
pub mod source;
pub mod store;
pub mod task;
