//! The strongly-typed invoice decoded from a document's opaque
//! `structured_data` JSON. The parse pipeline and validation engine both
//! operate on this shape rather than re-parsing raw JSON at every step.

use serde::{Deserialize, Serialize};

fn default_string() -> String {
    String::new()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default = "default_string")]
    pub name: String,
    #[serde(default = "default_string")]
    pub gstin: String,
    #[serde(default = "default_string")]
    pub pan: String,
    #[serde(default = "default_string")]
    pub address: String,
    #[serde(default = "default_string")]
    pub state_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default = "default_string")]
    pub description: String,
    #[serde(default = "default_string")]
    pub hsn_sac: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub taxable: f64,
    #[serde(default)]
    pub cgst_rate: f64,
    #[serde(default)]
    pub cgst_amount: f64,
    #[serde(default)]
    pub sgst_rate: f64,
    #[serde(default)]
    pub sgst_amount: f64,
    #[serde(default)]
    pub igst_rate: f64,
    #[serde(default)]
    pub igst_amount: f64,
    #[serde(default)]
    pub total: f64,
}

impl LineItem {
    /// The effective tax rate applied to the line: IGST when nonzero,
    /// otherwise CGST + SGST.
    pub fn effective_rate(&self) -> f64 {
        if self.igst_rate != 0.0 {
            self.igst_rate
        } else {
            self.cgst_rate + self.sgst_rate
        }
    }

    pub fn uses_igst(&self) -> bool {
        self.igst_amount != 0.0 || self.igst_rate != 0.0
    }

    pub fn uses_cgst_sgst(&self) -> bool {
        self.cgst_amount != 0.0
            || self.sgst_amount != 0.0
            || self.cgst_rate != 0.0
            || self.sgst_rate != 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub total_discount: f64,
    #[serde(default)]
    pub taxable_amount: f64,
    #[serde(default)]
    pub cgst: f64,
    #[serde(default)]
    pub sgst: f64,
    #[serde(default)]
    pub igst: f64,
    #[serde(default)]
    pub cess: f64,
    #[serde(default)]
    pub round_off: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default = "default_string")]
    pub bank_name: String,
    #[serde(default = "default_string")]
    pub account_number: String,
    #[serde(default = "default_string")]
    pub ifsc: String,
    #[serde(default = "default_string")]
    pub terms: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    #[serde(default = "default_string")]
    pub invoice_number: String,
    #[serde(default = "default_string")]
    pub invoice_date: String,
    #[serde(default = "default_string")]
    pub due_date: String,
    #[serde(default = "default_string")]
    pub place_of_supply: String,
    #[serde(default = "default_string")]
    pub currency: String,
    #[serde(default = "default_string")]
    pub irn: String,
    #[serde(default = "default_string")]
    pub acknowledgement_number: String,
    #[serde(default = "default_string")]
    pub acknowledgement_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(flatten)]
    pub header: InvoiceHeader,
    #[serde(default)]
    pub seller: Party,
    #[serde(default)]
    pub buyer: Party,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub totals: Totals,
    #[serde(default)]
    pub payment: Payment,
}

impl Invoice {
    /// Decodes the opaque `structured_data` JSON into the typed shape.
    /// Per the open design question in the specification, this only
    /// confirms the JSON is parseable; it does not enforce required fields
    /// — that is the validation engine's job.
    pub fn decode(structured_data: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if structured_data.is_null() {
            return Ok(Invoice::default());
        }
        serde_json::from_value(structured_data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_null_is_empty_invoice() {
        let invoice = Invoice::decode(&serde_json::Value::Null).unwrap();
        assert_eq!(invoice, Invoice::default());
    }

    #[test]
    fn decode_partial_invoice_does_not_fail() {
        let data = serde_json::json!({
            "invoice_number": "INV-001",
            "seller": { "gstin": "29ABCDE1234F1Z5" }
        });
        let invoice = Invoice::decode(&data).unwrap();
        assert_eq!(invoice.header.invoice_number, "INV-001");
        assert_eq!(invoice.seller.gstin, "29ABCDE1234F1Z5");
        assert!(invoice.line_items.is_empty());
    }

    #[test]
    fn effective_rate_prefers_igst() {
        let mut line = LineItem::default();
        line.cgst_rate = 9.0;
        line.sgst_rate = 9.0;
        assert_eq!(line.effective_rate(), 18.0);
        line.igst_rate = 18.0;
        assert_eq!(line.effective_rate(), 18.0);
    }
}
