//! Data models for extraction documents.

pub mod document;
