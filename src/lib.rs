//! Inbox Triage: email priority classification with suggested replies.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod inference;
pub mod pipeline;
