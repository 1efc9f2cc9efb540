//! Core domain types and shared logic for the Stacks e-book service.
//!
//! This crate defines the vocabulary used across all other crates:
//! - Upload validation and the fixed document content type
//! - Storage key derivation and filename sanitization
//! - Configuration types for server, storage, and metadata

pub mod book;
pub mod config;
pub mod error;
pub mod storage_key;

pub use book::{attachment_filename, require_non_empty, BOOK_CONTENT_TYPE};
pub use error::{Error, Result};
pub use storage_key::{derive_storage_key, sanitize_filename};
