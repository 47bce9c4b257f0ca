//! Conversion session model.
//!
//! A [`ConversionSession`] is the single mutable record describing the
//! current (or last) conversion attempt: what was picked, what it converts
//! to, how far along it is and what the user should be told about it.

mod format;
mod types;

pub use format::{TargetFormat, UnknownFormat};
pub use types::{ConversionSession, Message, SelectedInput, SessionStatus};
