//! Core module - Application infrastructure shared by every lesson
//!
//! # Contents
//!
//! - [`LessonSettings`] - Board preferences and engine timings
//! - [`settings_persistence`] - JSON load/save in the user's config directory
//! - [`logging`] - `tracing` subscriber setup for the binary
//! - [`CoreError`] - Settings I/O and validation errors

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use settings::{BoardSettings, LessonSettings, Timings};
