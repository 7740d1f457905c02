//! Invoice canonicalization: field normalization applied section by section.

pub mod fields;
pub mod patterns;
pub mod vendor;

pub use fields::FieldNormalizer;
pub use vendor::{VendorCanonicalizer, VendorRegistry};

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::document::{
    CanonicalDiscount, CanonicalInvoice, CanonicalItem, CanonicalMetadata, CanonicalPayment,
    CanonicalPricing, CanonicalShipping, CanonicalTax, CanonicalVendorInfo, RawDiscount,
    RawExtraction, RawItem, RawMetadata, RawPayment, RawPricing, RawScalar, RawShipping,
    RawTax, RawVendorInfo,
};

/// Outcome of canonicalizing one extraction document.
///
/// Parse failures never abort the pass; each one leaves its field unset and
/// adds a warning, so callers can tell a degraded document from a clean one.
#[derive(Debug, Clone)]
pub struct CanonicalizationResult {
    pub invoice: CanonicalInvoice,
    pub warnings: Vec<String>,
}

/// Applies the field normalizers across all sections of a raw document.
/// Missing sections are skipped without error.
pub struct InvoiceCanonicalizer {
    fields: FieldNormalizer,
    vendor: VendorCanonicalizer,
}

impl InvoiceCanonicalizer {
    pub fn new() -> Self {
        Self {
            fields: FieldNormalizer::new(),
            vendor: VendorCanonicalizer::new(),
        }
    }

    /// Canonicalize a document, minting fresh vendor IDs.
    pub fn canonicalize(&self, raw: &RawExtraction) -> CanonicalizationResult {
        self.canonicalize_inner(raw, None)
    }

    /// Canonicalize a document, resolving vendor identities through a
    /// caller-owned registry.
    pub fn canonicalize_with_registry(
        &self,
        raw: &RawExtraction,
        registry: &mut VendorRegistry,
    ) -> CanonicalizationResult {
        self.canonicalize_inner(raw, Some(registry))
    }

    fn canonicalize_inner(
        &self,
        raw: &RawExtraction,
        registry: Option<&mut VendorRegistry>,
    ) -> CanonicalizationResult {
        let mut warnings = Vec::new();

        let invoice = CanonicalInvoice {
            invoice_metadata: raw
                .invoice_metadata
                .as_ref()
                .map(|meta| self.metadata(meta, &mut warnings)),
            vendor_info: raw
                .vendor_info
                .as_ref()
                .map(|vendor| self.vendor_info(vendor, registry)),
            items: raw.items.as_ref().map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.item(index, item, &mut warnings))
                    .collect()
            }),
            pricing_summary: raw
                .pricing_summary
                .as_ref()
                .map(|pricing| self.pricing(pricing, &mut warnings)),
            payment_info: raw.payment_info.as_ref().map(|payment| self.payment(payment)),
        };

        debug!(warnings = warnings.len(), "canonicalization complete");
        CanonicalizationResult { invoice, warnings }
    }

    fn metadata(&self, raw: &RawMetadata, warnings: &mut Vec<String>) -> CanonicalMetadata {
        CanonicalMetadata {
            company_name: self.text_field(raw.company_name.as_ref()),
            invoice_number: self.text_field(raw.invoice_number.as_ref()),
            date: self.date_field("invoice_metadata.date", raw.date.as_ref(), warnings),
            time: self.time_field("invoice_metadata.time", raw.time.as_ref(), warnings),
            due_date: self.date_field("invoice_metadata.due_date", raw.due_date.as_ref(), warnings),
            invoice_type: self.text_field(raw.invoice_type.as_ref()),
        }
    }

    fn vendor_info(
        &self,
        raw: &RawVendorInfo,
        registry: Option<&mut VendorRegistry>,
    ) -> CanonicalVendorInfo {
        let raw_name = raw.vendor_name.as_ref().and_then(RawScalar::coerce_text);
        let identity = match registry {
            Some(registry) => registry.resolve(raw_name.as_deref()),
            None => self.vendor.canonicalize(raw_name.as_deref()),
        };

        CanonicalVendorInfo {
            // Name kept as extracted; the identity carries the normalization
            vendor_name: raw_name,
            vendor_name_canonical: identity,
            vendor_address: self.text_field(raw.vendor_address.as_ref()),
            vendor_tax_id: self.text_field(raw.vendor_tax_id.as_ref()),
            vendor_phone: self.text_field(raw.vendor_phone.as_ref()),
            vendor_email: self.text_field(raw.vendor_email.as_ref()),
        }
    }

    fn item(&self, index: usize, raw: &RawItem, warnings: &mut Vec<String>) -> CanonicalItem {
        let path = format!("items[{index}]");

        CanonicalItem {
            item_name: self.text_field(raw.item_name.as_ref()),
            quantity: self
                .amount_field(&format!("{path}.quantity"), raw.quantity.as_ref(), warnings)
                .0,
            unit: self.text_field(raw.unit.as_ref()),
            unit_price: self
                .amount_field(&format!("{path}.unit_price"), raw.unit_price.as_ref(), warnings)
                .0,
            line_total: self
                .amount_field(&format!("{path}.line_total"), raw.line_total.as_ref(), warnings)
                .0,
            tax_applicable: raw.tax_applicable.as_ref().map(RawScalar::truthy),
            discount: raw
                .discount
                .as_ref()
                .map(|discount| self.discount(&path, discount, warnings)),
        }
    }

    fn discount(
        &self,
        path: &str,
        raw: &RawDiscount,
        warnings: &mut Vec<String>,
    ) -> CanonicalDiscount {
        CanonicalDiscount {
            has_discount: raw.has_discount.as_ref().map(RawScalar::truthy),
            discount_percent: self
                .amount_field(
                    &format!("{path}.discount.discount_percent"),
                    raw.discount_percent.as_ref(),
                    warnings,
                )
                .0,
            discount_amount: self
                .amount_field(
                    &format!("{path}.discount.discount_amount"),
                    raw.discount_amount.as_ref(),
                    warnings,
                )
                .0,
            actual_price: self
                .amount_field(
                    &format!("{path}.discount.actual_price"),
                    raw.actual_price.as_ref(),
                    warnings,
                )
                .0,
            discounted_price: self
                .amount_field(
                    &format!("{path}.discount.discounted_price"),
                    raw.discounted_price.as_ref(),
                    warnings,
                )
                .0,
        }
    }

    fn pricing(&self, raw: &RawPricing, warnings: &mut Vec<String>) -> CanonicalPricing {
        let (total_amount, detected_currency) =
            self.amount_field("pricing_summary.total_amount", raw.total_amount.as_ref(), warnings);

        // A symbol detected on the total wins over the textual currency field
        let raw_currency = raw.currency.as_ref().and_then(RawScalar::coerce_text);
        let currency = detected_currency
            .unwrap_or_else(|| self.fields.normalize_currency_code(raw_currency.as_deref()));

        CanonicalPricing {
            subtotal: self
                .amount_field("pricing_summary.subtotal", raw.subtotal.as_ref(), warnings)
                .0,
            total_amount,
            total_discount: self
                .amount_field(
                    "pricing_summary.total_discount",
                    raw.total_discount.as_ref(),
                    warnings,
                )
                .0,
            currency,
            tax: raw.tax.as_ref().map(|tax| self.tax(tax, warnings)),
            shipping: raw
                .shipping
                .as_ref()
                .map(|shipping| self.shipping(shipping, warnings)),
        }
    }

    fn tax(&self, raw: &RawTax, warnings: &mut Vec<String>) -> CanonicalTax {
        CanonicalTax {
            has_tax: raw.has_tax.as_ref().map(RawScalar::truthy),
            tax_type: self.text_field(raw.tax_type.as_ref()),
            tax_percent: self
                .amount_field(
                    "pricing_summary.tax.tax_percent",
                    raw.tax_percent.as_ref(),
                    warnings,
                )
                .0,
            tax_amount: self
                .amount_field(
                    "pricing_summary.tax.tax_amount",
                    raw.tax_amount.as_ref(),
                    warnings,
                )
                .0,
        }
    }

    fn shipping(&self, raw: &RawShipping, warnings: &mut Vec<String>) -> CanonicalShipping {
        CanonicalShipping {
            shipping_amount: self
                .amount_field(
                    "pricing_summary.shipping.shipping_amount",
                    raw.shipping_amount.as_ref(),
                    warnings,
                )
                .0,
        }
    }

    fn payment(&self, raw: &RawPayment) -> CanonicalPayment {
        CanonicalPayment {
            payment_terms: self.text_field(raw.payment_terms.as_ref()),
            payment_methods: self.text_field(raw.payment_methods.as_ref()),
            bank_account: self.text_field(raw.bank_account.as_ref()),
            po_reference: self.text_field(raw.po_reference.as_ref()),
        }
    }

    fn text_field(&self, value: Option<&RawScalar>) -> Option<String> {
        self.fields
            .clean_string(value.and_then(RawScalar::coerce_text).as_deref())
    }

    fn date_field(
        &self,
        path: &str,
        value: Option<&RawScalar>,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        let text = value.and_then(RawScalar::coerce_text)?;
        let result = self.fields.normalize_date(Some(&text));
        if result.is_none() {
            warnings.push(format!("{path}: could not parse date {text:?}"));
        }
        result
    }

    fn time_field(
        &self,
        path: &str,
        value: Option<&RawScalar>,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        let text = value.and_then(RawScalar::coerce_text)?;
        let result = self.fields.normalize_time(Some(&text));
        if result.is_none() {
            warnings.push(format!("{path}: could not parse time {text:?}"));
        }
        result
    }

    fn amount_field(
        &self,
        path: &str,
        value: Option<&RawScalar>,
        warnings: &mut Vec<String>,
    ) -> (Option<Decimal>, Option<String>) {
        let Some(value) = value else {
            return (None, None);
        };

        let (amount, currency) = self.fields.normalize_amount(value);
        if amount.is_none() {
            let shown = value
                .coerce_text()
                .unwrap_or_else(|| format!("{value:?}"));
            warnings.push(format!("{path}: could not parse amount {shown:?}"));
        }
        (amount, currency)
    }
}

impl Default for InvoiceCanonicalizer {
    fn default() -> Self {
        Self::new()
    }
}
