//! Pipeline orchestration: canonicalize, validate, score, classify.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canon::{CanonicalizationResult, InvoiceCanonicalizer, VendorRegistry};
use crate::models::document::{CanonicalInvoice, RawExtraction};
use crate::score::{ConfidenceResult, ConfidenceScorer, InvoiceStatus};
use crate::validate::{InvoiceValidator, ValidationResult};

/// Pipeline policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Demote auto-approved records that fail structural validation to
    /// needs_review. Off by default: confidence and validity are
    /// independent signals, and the record always carries both.
    pub gate_status_on_validation: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            gate_status_on_validation: false,
        }
    }
}

/// A fully processed invoice: the canonical document plus the validation
/// and confidence signals and the resulting routing status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub canonical: CanonicalInvoice,

    /// Field-level canonicalization warnings (unparseable dates, amounts).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    pub validation: ValidationResult,

    pub confidence: ConfidenceResult,

    /// Routing status, taken from the scorer. Structural validity does not
    /// gate this unless [`PipelineOptions::gate_status_on_validation`] is
    /// set.
    pub status: InvoiceStatus,
}

/// Sequences the three pipeline stages over one document at a time.
///
/// All services are stateless; a pipeline can be shared freely across
/// threads and invoices.
pub struct InvoicePipeline {
    canonicalizer: InvoiceCanonicalizer,
    validator: InvoiceValidator,
    scorer: ConfidenceScorer,
    options: PipelineOptions,
}

impl InvoicePipeline {
    pub fn new() -> Self {
        Self::with_options(PipelineOptions::default())
    }

    pub fn with_options(options: PipelineOptions) -> Self {
        Self {
            canonicalizer: InvoiceCanonicalizer::new(),
            validator: InvoiceValidator::new(),
            scorer: ConfidenceScorer::new(),
            options,
        }
    }

    /// Process one extraction document. Vendor identities are minted fresh
    /// per call; use [`process_with_registry`](Self::process_with_registry)
    /// for stable identities across documents.
    pub fn process(&self, raw: &RawExtraction) -> InvoiceRecord {
        self.assemble(self.canonicalizer.canonicalize(raw))
    }

    /// Process one document, resolving vendor identities through a
    /// caller-owned registry (lookup-or-create on the normalized name).
    pub fn process_with_registry(
        &self,
        raw: &RawExtraction,
        registry: &mut VendorRegistry,
    ) -> InvoiceRecord {
        self.assemble(self.canonicalizer.canonicalize_with_registry(raw, registry))
    }

    fn assemble(&self, result: CanonicalizationResult) -> InvoiceRecord {
        let CanonicalizationResult { invoice, warnings } = result;

        let validation = self.validator.validate(&invoice);
        let confidence = self.scorer.calculate(&invoice);

        let mut status = confidence.status;
        if self.options.gate_status_on_validation
            && !validation.valid
            && status == InvoiceStatus::AutoApproved
        {
            debug!("auto-approval withheld: structural validation failed");
            status = InvoiceStatus::NeedsReview;
        }

        InvoiceRecord {
            canonical: invoice,
            warnings,
            validation,
            confidence,
            status,
        }
    }
}

impl Default for InvoicePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawExtraction {
        serde_json::from_value(value).unwrap()
    }

    fn well_formed_document() -> RawExtraction {
        raw(json!({
            "invoice_metadata": {
                "company_name": "Globex Corporation Pvt Ltd",
                "invoice_number": "INV-2025-001",
                "date": "29/12/2025",
                "time": "2:30 PM"
            },
            "vendor_info": {
                "vendor_name": "Globex Corporation"
            },
            "items": [
                {
                    "item_name": "Widget",
                    "quantity": 2,
                    "unit_price": 500.0,
                    "line_total": 1000.0
                },
                {
                    "item_name": "Gadget",
                    "quantity": 1,
                    "unit_price": 400.0,
                    "line_total": 400.0
                }
            ],
            "pricing_summary": {
                "subtotal": 1400.0,
                "total_amount": "$1,500.00",
                "tax": {
                    "has_tax": true,
                    "tax_percent": 7.14,
                    "tax_amount": 100.0
                }
            }
        }))
    }

    #[test]
    fn test_well_formed_document_is_auto_approved() {
        let pipeline = InvoicePipeline::new();
        let record = pipeline.process(&well_formed_document());

        assert!(record.warnings.is_empty());
        assert!(record.validation.valid);
        assert!(record.confidence.overall_confidence >= 85.0);
        assert_eq!(record.status, InvoiceStatus::AutoApproved);
    }

    #[test]
    fn test_status_comes_from_scorer_not_validator() {
        let pipeline = InvoicePipeline::new();

        // An unparseable date leaves the canonical field unset: validation
        // fails, the score drops, and status still mirrors the scorer
        let mut document = well_formed_document();
        let meta = document.invoice_metadata.as_mut().unwrap();
        meta.date = Some(crate::models::document::RawScalar::Text("Dec 29".to_string()));

        let record = pipeline.process(&document);

        assert!(!record.warnings.is_empty());
        assert!(!record.validation.valid);
        assert_eq!(record.status, record.confidence.status);
        assert_eq!(record.status, InvoiceStatus::NeedsReview);
    }

    #[test]
    fn test_gating_flag_demotes_invalid_auto_approvals() {
        let document = {
            // High-scoring document that fails validation: no subtotal
            let mut document = well_formed_document();
            document.pricing_summary.as_mut().unwrap().subtotal = None;
            document
        };

        let ungated = InvoicePipeline::new().process(&document);
        assert!(!ungated.validation.valid);
        assert_eq!(ungated.status, InvoiceStatus::AutoApproved);

        let gated = InvoicePipeline::with_options(PipelineOptions {
            gate_status_on_validation: true,
        })
        .process(&document);
        assert!(!gated.validation.valid);
        assert_eq!(gated.status, InvoiceStatus::NeedsReview);
        // The scorer's own verdict is still visible
        assert_eq!(gated.confidence.status, InvoiceStatus::AutoApproved);
    }

    #[test]
    fn test_empty_document_is_low_confidence() {
        let pipeline = InvoicePipeline::new();
        let record = pipeline.process(&raw(json!({})));

        assert!(!record.validation.valid);
        assert_eq!(record.status, InvoiceStatus::LowConfidence);
    }

    #[test]
    fn test_registry_deduplicates_across_documents() {
        let pipeline = InvoicePipeline::new();
        let mut registry = VendorRegistry::new();

        let first = pipeline.process_with_registry(&well_formed_document(), &mut registry);
        let second = pipeline.process_with_registry(
            &raw(json!({
                "vendor_info": { "vendor_name": "Globex Corporation Ltd" }
            })),
            &mut registry,
        );

        let id = |record: &InvoiceRecord| {
            record
                .canonical
                .vendor_info
                .as_ref()
                .unwrap()
                .vendor_name_canonical
                .canonical_id
                .clone()
        };
        assert_eq!(id(&first), id(&second));
    }

    #[test]
    fn test_record_serializes_with_both_signals() {
        let pipeline = InvoicePipeline::new();
        let record = pipeline.process(&well_formed_document());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "auto_approved");
        assert_eq!(value["validation"]["valid"], true);
        assert!(value["confidence"]["overall_confidence"].is_number());
        assert_eq!(value["confidence"]["confidence_level"], "high");
    }
}
