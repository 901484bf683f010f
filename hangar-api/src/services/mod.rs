//! Service Layer
//!
//! Workflows that span more than one adapter or touch the picture object
//! store. Route handlers stay thin and delegate here.

mod import_service;
mod picture_service;

pub use import_service::*;
pub use picture_service::*;
