//! Invoice document models: raw extraction input and canonical output.
//!
//! The extraction service returns loosely-structured JSON with no guarantee
//! of field presence or type correctness. [`RawExtraction`] models that
//! contract explicitly: every section is optional, every leaf is a
//! [`RawScalar`], and a section of the wrong JSON type reads as absent
//! instead of failing the document. [`CanonicalInvoice`] is the same shape
//! after normalization.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A leaf value from the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Anything else the service sent (objects, arrays).
    Other(serde_json::Value),
}

impl RawScalar {
    /// The value as text, if it is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawScalar::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The value as text, stringifying numbers.
    pub fn coerce_text(&self) -> Option<String> {
        match self {
            RawScalar::Text(text) => Some(text.clone()),
            RawScalar::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Loose truthiness for flag fields like `has_tax` and `has_discount`,
    /// matching how the extraction service reports them (true, 1, "yes").
    pub fn truthy(&self) -> bool {
        match self {
            RawScalar::Text(text) => !text.is_empty(),
            RawScalar::Number(number) => *number != 0.0,
            RawScalar::Bool(flag) => *flag,
            RawScalar::Other(value) => !value.is_null(),
        }
    }
}

/// Deserialize a field leniently: a value of the wrong shape becomes `None`
/// instead of failing the whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A raw document as returned by the external extraction service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub invoice_metadata: Option<RawMetadata>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub vendor_info: Option<RawVendorInfo>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<RawItem>>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pricing_summary: Option<RawPricing>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<RawPayment>,
}

impl RawExtraction {
    /// Decode a raw extraction document from JSON text.
    pub fn from_json_str(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and decode a raw extraction document from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Invoice header section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMetadata {
    pub company_name: Option<RawScalar>,
    pub invoice_number: Option<RawScalar>,
    pub date: Option<RawScalar>,
    pub time: Option<RawScalar>,
    pub due_date: Option<RawScalar>,
    pub invoice_type: Option<RawScalar>,
}

/// Vendor section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVendorInfo {
    pub vendor_name: Option<RawScalar>,
    pub vendor_address: Option<RawScalar>,
    pub vendor_tax_id: Option<RawScalar>,
    pub vendor_phone: Option<RawScalar>,
    pub vendor_email: Option<RawScalar>,
}

/// A single line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub item_name: Option<RawScalar>,
    pub quantity: Option<RawScalar>,
    pub unit: Option<RawScalar>,
    pub unit_price: Option<RawScalar>,
    pub line_total: Option<RawScalar>,
    pub tax_applicable: Option<RawScalar>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub discount: Option<RawDiscount>,
}

/// Discount sub-object on a line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDiscount {
    pub has_discount: Option<RawScalar>,
    pub discount_percent: Option<RawScalar>,
    pub discount_amount: Option<RawScalar>,
    pub actual_price: Option<RawScalar>,
    pub discounted_price: Option<RawScalar>,
}

/// Pricing summary section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPricing {
    pub subtotal: Option<RawScalar>,
    pub total_amount: Option<RawScalar>,
    pub total_discount: Option<RawScalar>,
    pub currency: Option<RawScalar>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tax: Option<RawTax>,

    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub shipping: Option<RawShipping>,
}

/// Tax sub-object in the pricing summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTax {
    pub has_tax: Option<RawScalar>,
    pub tax_type: Option<RawScalar>,
    pub tax_percent: Option<RawScalar>,
    pub tax_amount: Option<RawScalar>,
}

/// Shipping sub-object in the pricing summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawShipping {
    pub shipping_amount: Option<RawScalar>,
}

/// Payment section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayment {
    pub payment_terms: Option<RawScalar>,
    pub payment_methods: Option<RawScalar>,
    pub bank_account: Option<RawScalar>,
    pub po_reference: Option<RawScalar>,
}

/// A canonicalized invoice: the [`RawExtraction`] shape with every field
/// normalized (ISO dates, `HH:MM:SS` times, 2-decimal amounts, ISO-4217
/// currency, resolved vendor identity).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalInvoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_metadata: Option<CanonicalMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_info: Option<CanonicalVendorInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CanonicalItem>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_summary: Option<CanonicalPricing>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<CanonicalPayment>,
}

/// Canonical invoice header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// ISO calendar date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// 24-hour clock time, `HH:MM:SS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_type: Option<String>,
}

/// Canonical vendor section. The extracted name is kept as-is; the
/// normalization lives in the attached identity record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalVendorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    pub vendor_name_canonical: VendorIdentity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_tax_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_email: Option<String>,
}

/// Resolved vendor identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorIdentity {
    /// `VENDOR_` followed by eight hex characters, or the unknown sentinel.
    pub canonical_id: String,

    /// Lowercased name with punctuation and legal suffixes removed.
    pub normalized_name: String,

    /// The name exactly as extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_input: Option<String>,

    /// RFC 3339 timestamp of when this identity was minted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<String>,
}

impl VendorIdentity {
    /// Sentinel identity for absent or empty vendor names.
    pub fn unknown(raw_input: Option<String>) -> Self {
        Self {
            canonical_id: "VENDOR_UNKNOWN".to_string(),
            normalized_name: "Unknown".to_string(),
            raw_input,
            first_seen: None,
        }
    }
}

impl Default for VendorIdentity {
    fn default() -> Self {
        Self::unknown(None)
    }
}

/// Canonical line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_applicable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<CanonicalDiscount>,
}

/// Canonical discount sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalDiscount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_discount: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Decimal>,
}

/// Canonical pricing summary. Currency is always resolved, to the symbol
/// detected on the total amount, the normalized textual field, or `USD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalPricing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_discount: Option<Decimal>,

    /// ISO-4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<CanonicalTax>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<CanonicalShipping>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for CanonicalPricing {
    fn default() -> Self {
        Self {
            subtotal: None,
            total_amount: None,
            total_discount: None,
            currency: default_currency(),
            tax: None,
            shipping: None,
        }
    }
}

/// Canonical tax sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalTax {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_tax: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percent: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,
}

/// Canonical shipping sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalShipping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_amount: Option<Decimal>,
}

/// Canonical payment section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_reference: Option<String>,
}
