//! Level persistence
//!
//! Features:
//! - Plain-text level format, hand-editable
//! - Level packs (many levels in one file)
//! - Strict validation: malformed text never yields a half-built level

pub mod level_text;

pub use level_text::{level_pack_to_string, level_to_string, parse_level, parse_level_pack};
