//! Heuristic confidence scoring for canonicalized invoices.
//!
//! Each field is scored independently on a 0-100 scale, then combined into
//! a weighted aggregate that drives the routing status:
//! - >= 85: auto-approved
//! - 60-84: needs human review
//! - < 60: low confidence, manual handling

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::canon::patterns::{DATE_STRICT, TIME_STRICT};
use crate::models::document::{CanonicalInvoice, CanonicalItem, CanonicalPricing};

/// Field importance weights. `pricing` combines the tax (12) and total
/// amount (14) weights; fields outside this table default to 10.
const FIELD_WEIGHTS: [(&str, f64); 7] = [
    ("company_name", 10.0),
    ("invoice_number", 8.0),
    ("date", 12.0),
    ("time", 3.0),
    ("vendor_name", 10.0),
    ("items", 25.0),
    ("pricing", 26.0),
];

const DEFAULT_FIELD_WEIGHT: f64 = 10.0;

/// Score at or above which an invoice is approved without review.
pub const AUTO_APPROVE_THRESHOLD: f64 = 85.0;

/// Score at or above which an invoice is queued for human review.
pub const NEEDS_REVIEW_THRESHOLD: f64 = 60.0;

/// Keywords that make a company name look like a real business entity.
const BUSINESS_KEYWORDS: [&str; 10] = [
    "company", "corp", "inc", "ltd", "llc", "pvt", "gmbh", "ag", "industries", "solutions",
];

/// Display classification of an overall confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
    /// Fail-safe sentinel, never produced by a successful scoring pass.
    Error,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            ConfidenceLevel::High
        } else if score >= 70.0 {
            ConfidenceLevel::Medium
        } else if score >= 50.0 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very_low",
            ConfidenceLevel::Error => "error",
        }
    }
}

/// Routing status derived from the overall confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    AutoApproved,
    NeedsReview,
    LowConfidence,
    /// Fail-safe sentinel, never produced by a successful scoring pass.
    Error,
}

impl InvoiceStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= AUTO_APPROVE_THRESHOLD {
            InvoiceStatus::AutoApproved
        } else if score >= NEEDS_REVIEW_THRESHOLD {
            InvoiceStatus::NeedsReview
        } else {
            InvoiceStatus::LowConfidence
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::AutoApproved => "auto_approved",
            InvoiceStatus::NeedsReview => "needs_review",
            InvoiceStatus::LowConfidence => "low_confidence",
            InvoiceStatus::Error => "error",
        }
    }
}

/// Overall and per-field confidence for one invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Weighted aggregate, 0-100, two decimals.
    pub overall_confidence: f64,

    /// Per-field scores, two decimals.
    pub field_confidence: BTreeMap<String, f64>,

    pub confidence_level: ConfidenceLevel,

    pub status: InvoiceStatus,
}

impl ConfidenceResult {
    /// Fail-safe sentinel: zero confidence, error status, empty field map.
    pub fn error() -> Self {
        Self {
            overall_confidence: 0.0,
            field_confidence: BTreeMap::new(),
            confidence_level: ConfidenceLevel::Error,
            status: InvoiceStatus::Error,
        }
    }
}

/// Deterministic per-field scorers and the weighted aggregate.
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score every field and combine into the overall confidence result.
    pub fn calculate(&self, invoice: &CanonicalInvoice) -> ConfidenceResult {
        let meta = invoice.invoice_metadata.as_ref();
        let vendor = invoice.vendor_info.as_ref();

        let mut field_scores = BTreeMap::new();
        field_scores.insert(
            "company_name".to_string(),
            self.score_company_name(meta.and_then(|m| m.company_name.as_deref())),
        );
        field_scores.insert(
            "invoice_number".to_string(),
            self.score_invoice_number(meta.and_then(|m| m.invoice_number.as_deref())),
        );
        field_scores.insert(
            "date".to_string(),
            self.score_date(meta.and_then(|m| m.date.as_deref())),
        );
        field_scores.insert(
            "time".to_string(),
            self.score_time(meta.and_then(|m| m.time.as_deref())),
        );
        field_scores.insert(
            "vendor_name".to_string(),
            self.score_vendor_name(vendor.and_then(|v| v.vendor_name.as_deref())),
        );
        field_scores.insert("items".to_string(), self.score_items(invoice.items.as_deref()));
        field_scores.insert(
            "pricing".to_string(),
            self.score_pricing(invoice.pricing_summary.as_ref()),
        );

        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;
        for (field, score) in &field_scores {
            let weight = field_weight(field);
            total_weighted += score * weight;
            total_weight += weight;
        }

        let overall = if total_weight > 0.0 {
            (total_weighted / total_weight).min(100.0)
        } else {
            0.0
        };

        ConfidenceResult {
            overall_confidence: round2(overall),
            field_confidence: field_scores
                .into_iter()
                .map(|(field, score)| (field, round2(score)))
                .collect(),
            confidence_level: ConfidenceLevel::from_score(overall),
            status: InvoiceStatus::from_score(overall),
        }
    }

    /// Longer names score higher; business-entity keywords add a bonus.
    pub fn score_company_name(&self, name: Option<&str>) -> f64 {
        let Some(name) = name.filter(|s| !s.trim().is_empty()) else {
            return 0.0;
        };

        let length_score = (name.chars().count() as f64 / 50.0).min(1.0) * 100.0;
        let lower = name.to_lowercase();
        let has_keyword = BUSINESS_KEYWORDS.iter().any(|keyword| lower.contains(keyword));

        length_score + if has_keyword { 50.0 } else { 30.0 }
    }

    /// Full credit for a 5-20 character mix of letters and digits.
    pub fn score_invoice_number(&self, number: Option<&str>) -> f64 {
        let Some(number) = number.filter(|s| !s.is_empty()) else {
            return 0.0;
        };
        let number = number.trim();

        let has_alphanumeric = number.chars().any(|c| c.is_alphanumeric());
        let has_digits = number.chars().any(|c| c.is_ascii_digit());
        if !has_alphanumeric || !has_digits {
            return 30.0;
        }

        let length = number.chars().count();
        if (5..=20).contains(&length) { 100.0 } else { 70.0 }
    }

    /// Full credit only for a valid `YYYY-MM-DD` calendar date.
    pub fn score_date(&self, date: Option<&str>) -> f64 {
        let Some(date) = date.filter(|s| !s.is_empty()) else {
            return 0.0;
        };

        if DATE_STRICT.is_match(date) {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
                100.0
            } else {
                50.0
            }
        } else {
            60.0
        }
    }

    /// Time is optional: full credit when absent.
    pub fn score_time(&self, time: Option<&str>) -> f64 {
        let Some(time) = time.filter(|s| !s.is_empty()) else {
            return 100.0;
        };

        if TIME_STRICT.is_match(time) {
            if NaiveTime::parse_from_str(time, "%H:%M:%S").is_ok() {
                100.0
            } else {
                50.0
            }
        } else {
            60.0
        }
    }

    pub fn score_vendor_name(&self, name: Option<&str>) -> f64 {
        let Some(name) = name.filter(|s| !s.trim().is_empty()) else {
            return 0.0;
        };

        if !name.chars().any(|c| c.is_alphabetic()) {
            return 20.0;
        }

        (name.chars().count() as f64 / 40.0).min(1.0) * 100.0 + 20.0
    }

    /// Average per-item completeness: 25 points per present required field,
    /// +10 for a fully-specified discount, capped at 100.
    pub fn score_items(&self, items: Option<&[CanonicalItem]>) -> f64 {
        let Some(items) = items.filter(|list| !list.is_empty()) else {
            return 0.0;
        };

        let total: f64 = items.iter().map(score_item).sum();
        (total / items.len() as f64).min(100.0)
    }

    /// Weighted completeness of the pricing summary: subtotal 30, tax block
    /// 30 (20 partial credit when untaxed), total amount 40, scaled to the
    /// applicable maximum.
    pub fn score_pricing(&self, pricing: Option<&CanonicalPricing>) -> f64 {
        let Some(pricing) = pricing else {
            return 0.0;
        };

        let mut achieved = 0.0;
        let mut possible = 0.0;

        if pricing.subtotal.is_some() {
            achieved += 30.0;
            possible += 30.0;
        }

        possible += 30.0;
        match pricing.tax.as_ref() {
            Some(tax) if tax.has_tax == Some(true) => {
                if tax.tax_amount.is_some() && tax.tax_percent.is_some() {
                    achieved += 30.0;
                }
            }
            // Untaxed or absent tax block gets partial credit
            _ => achieved += 20.0,
        }

        if pricing.total_amount.is_some() {
            achieved += 40.0;
            possible += 40.0;
        }

        if possible > 0.0 { achieved / possible * 100.0 } else { 0.0 }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn score_item(item: &CanonicalItem) -> f64 {
    let mut score = 0.0;
    if item.item_name.is_some() {
        score += 25.0;
    }
    if item.quantity.is_some() {
        score += 25.0;
    }
    if item.unit_price.is_some() {
        score += 25.0;
    }
    if item.line_total.is_some() {
        score += 25.0;
    }

    if let Some(discount) = &item.discount {
        if discount.has_discount == Some(true)
            && discount.actual_price.is_some()
            && discount.discounted_price.is_some()
        {
            score += 10.0;
        }
    }

    score
}

fn field_weight(field: &str) -> f64 {
    FIELD_WEIGHTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_FIELD_WEIGHT)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
