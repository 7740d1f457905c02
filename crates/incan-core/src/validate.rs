//! Structural validation of canonicalized invoices.

use serde::{Deserialize, Serialize};

use crate::canon::patterns::{DATE_STRICT, TIME_STRICT};
use crate::models::document::{
    CanonicalInvoice, CanonicalItem, CanonicalMetadata, CanonicalPricing,
};

/// Outcome of structural validation: the first failing check, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self { valid: true, error: None }
    }

    fn fail(message: String) -> Self {
        Self { valid: false, error: Some(message) }
    }
}

/// Checks a canonical invoice for structural problems, stopping at the
/// first failure. Validation is informational: it never gates the pipeline.
pub struct InvoiceValidator;

impl InvoiceValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate company name, date, time, items, and pricing, in that order.
    pub fn validate(&self, invoice: &CanonicalInvoice) -> ValidationResult {
        let meta = invoice.invoice_metadata.as_ref();

        if let Err(message) = check_company_name(meta) {
            return ValidationResult::fail(format!("Metadata: {message}"));
        }
        if let Err(message) = check_date(meta) {
            return ValidationResult::fail(format!("Metadata: {message}"));
        }
        if let Err(message) = check_time(meta) {
            return ValidationResult::fail(format!("Metadata: {message}"));
        }
        if let Err(message) = check_items(invoice.items.as_deref()) {
            return ValidationResult::fail(format!("Items: {message}"));
        }
        if let Err(message) = check_pricing(invoice.pricing_summary.as_ref()) {
            return ValidationResult::fail(format!("Pricing: {message}"));
        }

        ValidationResult::ok()
    }
}

impl Default for InvoiceValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_company_name(meta: Option<&CanonicalMetadata>) -> Result<(), String> {
    let Some(name) = meta.and_then(|m| m.company_name.as_deref()) else {
        return Err("Company name is required".to_string());
    };

    let length = name.chars().count();
    if length < 2 {
        return Err("Company name too short (minimum 2 characters)".to_string());
    }
    if length > 200 {
        return Err("Company name too long (maximum 200 characters)".to_string());
    }
    Ok(())
}

fn check_date(meta: Option<&CanonicalMetadata>) -> Result<(), String> {
    let Some(date) = meta.and_then(|m| m.date.as_deref()) else {
        return Err("Date is required".to_string());
    };

    if !DATE_STRICT.is_match(date) {
        return Err("Date must be in YYYY-MM-DD format".to_string());
    }
    Ok(())
}

fn check_time(meta: Option<&CanonicalMetadata>) -> Result<(), String> {
    // Time is optional
    let Some(time) = meta.and_then(|m| m.time.as_deref()) else {
        return Ok(());
    };

    if !TIME_STRICT.is_match(time) {
        return Err("Time must be in HH:MM:SS format".to_string());
    }
    Ok(())
}

fn check_items(items: Option<&[CanonicalItem]>) -> Result<(), String> {
    let Some(items) = items else {
        return Err("Items must be a non-empty list".to_string());
    };
    if items.is_empty() {
        return Err("At least one item is required".to_string());
    }

    for (index, item) in items.iter().enumerate() {
        if item.item_name.as_deref().is_none_or(|name| name.is_empty()) {
            return Err(format!("Item {index} is missing name"));
        }
        if item.quantity.is_none() {
            return Err(format!("Item {index} has invalid quantity"));
        }
        if item.unit_price.is_none() {
            return Err(format!("Item {index} has invalid unit_price"));
        }
    }
    Ok(())
}

fn check_pricing(pricing: Option<&CanonicalPricing>) -> Result<(), String> {
    let Some(pricing) = pricing else {
        return Err("Pricing summary is required".to_string());
    };

    if pricing.subtotal.is_none() {
        return Err("Subtotal is required".to_string());
    }
    if pricing.total_amount.is_none() {
        return Err("Total amount is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{CanonicalPricing, CanonicalVendorInfo};
    use rust_decimal::Decimal;

    fn valid_invoice() -> CanonicalInvoice {
        CanonicalInvoice {
            invoice_metadata: Some(CanonicalMetadata {
                company_name: Some("Globex Corporation".to_string()),
                invoice_number: Some("INV-2025-001".to_string()),
                date: Some("2025-12-29".to_string()),
                time: Some("14:30:00".to_string()),
                ..Default::default()
            }),
            vendor_info: Some(CanonicalVendorInfo::default()),
            items: Some(vec![CanonicalItem {
                item_name: Some("Widget".to_string()),
                quantity: Some(Decimal::new(200, 2)),
                unit_price: Some(Decimal::new(50000, 2)),
                line_total: Some(Decimal::new(100000, 2)),
                ..Default::default()
            }]),
            pricing_summary: Some(CanonicalPricing {
                subtotal: Some(Decimal::new(100000, 2)),
                total_amount: Some(Decimal::new(118000, 2)),
                ..Default::default()
            }),
            payment_info: None,
        }
    }

    #[test]
    fn test_valid_invoice_passes() {
        let validator = InvoiceValidator::new();
        let result = validator.validate(&valid_invoice());

        assert!(result.valid);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_missing_company_name() {
        let validator = InvoiceValidator::new();
        let mut invoice = valid_invoice();
        invoice.invoice_metadata.as_mut().unwrap().company_name = None;

        let result = validator.validate(&invoice);
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Metadata: Company name is required")
        );
    }

    #[test]
    fn test_company_name_length_bounds() {
        let validator = InvoiceValidator::new();

        let mut invoice = valid_invoice();
        invoice.invoice_metadata.as_mut().unwrap().company_name = Some("X".to_string());
        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Metadata: Company name too short (minimum 2 characters)")
        );

        invoice.invoice_metadata.as_mut().unwrap().company_name = Some("X".repeat(201));
        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Metadata: Company name too long (maximum 200 characters)")
        );
    }

    #[test]
    fn test_date_must_be_iso() {
        let validator = InvoiceValidator::new();
        let mut invoice = valid_invoice();
        invoice.invoice_metadata.as_mut().unwrap().date = Some("29/12/2025".to_string());

        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Metadata: Date must be in YYYY-MM-DD format")
        );
    }

    #[test]
    fn test_time_is_optional_but_strict() {
        let validator = InvoiceValidator::new();

        let mut invoice = valid_invoice();
        invoice.invoice_metadata.as_mut().unwrap().time = None;
        assert!(validator.validate(&invoice).valid);

        invoice.invoice_metadata.as_mut().unwrap().time = Some("2:30 PM".to_string());
        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Metadata: Time must be in HH:MM:SS format")
        );
    }

    #[test]
    fn test_items_required_and_complete() {
        let validator = InvoiceValidator::new();

        let mut invoice = valid_invoice();
        invoice.items = None;
        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Items: Items must be a non-empty list")
        );

        invoice.items = Some(Vec::new());
        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Items: At least one item is required")
        );

        invoice = valid_invoice();
        invoice.items.as_mut().unwrap()[0].quantity = None;
        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Items: Item 0 has invalid quantity")
        );
    }

    #[test]
    fn test_missing_total_amount_is_a_pricing_error() {
        let validator = InvoiceValidator::new();
        let mut invoice = valid_invoice();
        invoice.pricing_summary.as_mut().unwrap().total_amount = None;

        let result = validator.validate(&invoice);
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Pricing: Total amount is required")
        );
    }

    #[test]
    fn test_missing_pricing_section() {
        let validator = InvoiceValidator::new();
        let mut invoice = valid_invoice();
        invoice.pricing_summary = None;

        assert_eq!(
            validator.validate(&invoice).error.as_deref(),
            Some("Pricing: Pricing summary is required")
        );
    }
}
