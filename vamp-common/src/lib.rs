//! # VAMP Common Library
//!
//! Shared code for the VAMP virtual-time media player:
//! - Catalog entity models (tracks, programs)
//! - Event types (PlayerEvent enum)
//! - Configuration loading
//! - Virtual-time utilities

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use time::Seconds;
