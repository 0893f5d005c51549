//! Byte-range edit application.
//!
//! The log rewriter computes all of its edits against the original text
//! and hands them to `ByteRangeRewriter`, which validates and applies them
//! in one pass.

mod rewriter;

pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};
