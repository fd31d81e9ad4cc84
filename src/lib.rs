//! Twekee: the Qera AI website chat assistant.
//!
//! The server half forwards widget messages to OpenRouter with the Twekee
//! system prompt ([`web`], [`model`]). The [`widget`] module models the chat
//! bubble that talks to it.

pub mod config;
pub mod model;
pub mod web;
pub mod widget;
