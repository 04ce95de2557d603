//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — UTF-8 safe string helpers used for previews

pub mod error;
pub mod string;
