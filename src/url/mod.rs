//! URL handling module for Mock-Traffic
//!
//! This module provides the blacklist filter that decides whether a URL may
//! enter the frontier.

mod blacklist;

pub use blacklist::{is_blacklisted, Blacklist};
