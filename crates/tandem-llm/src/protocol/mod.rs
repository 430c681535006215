//! Wire format types for backend APIs
//!
//! Pure serde structs matching each backend's JSON. They exist only at the
//! HTTP boundary; [`crate::convert`] maps them to the shared types.

pub mod anthropic;
pub mod openai;
