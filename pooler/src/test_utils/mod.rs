//! Helpers for testing pooler control without a running pooler.
//!
//! [`admin::ScriptedAdminConnectionProvider`] replays scripted outcomes for every command it
//! receives and records what was executed, and [`notify::TimedNotify`] lets tests wait for
//! those commands without hanging forever.

pub mod admin;
pub mod notify;
