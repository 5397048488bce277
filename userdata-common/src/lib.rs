//! # User Data Common Library
//!
//! Shared code for the user data crates including:
//! - Record categories
//! - Database initialization, models and the record repository
//! - Configuration loading and root folder resolution
//! - Utility functions

pub mod category;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use category::Category;
pub use error::{Error, Result};
