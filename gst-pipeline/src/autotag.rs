//! Best-effort auto-tag extraction from the typed invoice. Failure here
//! must never fail the parse (§4.6) — callers log and move on.

use chrono::NaiveDate;

use gst_core::Invoice;
use gst_rules::date_parser::parse_date;

pub struct ExtractedTag {
    pub key: &'static str,
    pub value: String,
}

pub fn extract(invoice: &Invoice) -> Vec<ExtractedTag> {
    let mut tags = Vec::new();
    if !invoice.seller.name.is_empty() {
        tags.push(ExtractedTag {
            key: "seller_name",
            value: invoice.seller.name.clone(),
        });
    }
    if !invoice.buyer.name.is_empty() {
        tags.push(ExtractedTag {
            key: "buyer_name",
            value: invoice.buyer.name.clone(),
        });
    }
    if !invoice.header.invoice_number.is_empty() {
        tags.push(ExtractedTag {
            key: "invoice_number",
            value: invoice.header.invoice_number.clone(),
        });
    }
    if let Some(date) = parse_date(&invoice.header.invoice_date) {
        tags.push(ExtractedTag {
            key: "financial_year",
            value: financial_year_tag(date),
        });
    }
    tags
}

fn financial_year_tag(date: NaiveDate) -> String {
    gst_core::utils::financial_year(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::{InvoiceHeader, Party};

    #[test]
    fn extracts_every_available_tag() {
        let invoice = Invoice {
            header: InvoiceHeader {
                invoice_number: "INV-001".to_string(),
                invoice_date: "2025-01-15".to_string(),
                ..Default::default()
            },
            seller: Party {
                name: "Acme".to_string(),
                ..Default::default()
            },
            buyer: Party {
                name: "Globex".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let tags = extract(&invoice);
        assert!(tags.iter().any(|t| t.key == "seller_name" && t.value == "Acme"));
        assert!(tags.iter().any(|t| t.key == "buyer_name" && t.value == "Globex"));
        assert!(tags.iter().any(|t| t.key == "invoice_number" && t.value == "INV-001"));
        assert!(tags.iter().any(|t| t.key == "financial_year" && t.value == "2024-25"));
    }

    #[test]
    fn skips_unparseable_date() {
        let invoice = Invoice::default();
        let tags = extract(&invoice);
        assert!(tags.is_empty());
    }
}
