//! Core library for invoice extraction post-processing.
//!
//! This crate provides:
//! - Canonicalization of loosely-structured extraction documents
//!   (dates, times, currency amounts and codes, vendor identity, free text)
//! - Structural validation of canonical invoices
//! - Heuristic confidence scoring with approval-status classification
//! - A pipeline orchestrator assembling the full invoice record
//!
//! The pipeline never fails on malformed content: unparseable fields are
//! dropped with warnings, and every document produces a record carrying
//! both the validity and confidence signals.

pub mod canon;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod score;
pub mod validate;

pub use canon::{
    CanonicalizationResult, FieldNormalizer, InvoiceCanonicalizer, VendorCanonicalizer,
    VendorRegistry,
};
pub use error::{IncanError, Result};
pub use models::document::{CanonicalInvoice, RawExtraction, RawScalar, VendorIdentity};
pub use pipeline::{InvoicePipeline, InvoiceRecord, PipelineOptions};
pub use score::{ConfidenceLevel, ConfidenceResult, ConfidenceScorer, InvoiceStatus};
pub use validate::{InvoiceValidator, ValidationResult};
