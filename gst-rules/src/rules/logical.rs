//! Rule family 5: logical invariants that are neither presence, format, nor
//! pure arithmetic.

use chrono::Utc;

use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::date_parser::parse_date;
use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

const ALLOWED_RATES: [f64; 7] = [0.0, 0.25, 3.0, 5.0, 12.0, 18.0, 28.0];

fn non_negative(field_path: String, value: f64) -> RuleOutcome {
    if value >= 0.0 {
        RuleOutcome::pass(field_path, "value is non-negative")
    } else {
        RuleOutcome::fail(
            field_path,
            ">= 0",
            format!("{value:.2}"),
            "value must not be negative",
        )
    }
}

fn logical_line_non_negative(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .flat_map(|(i, line)| {
            vec![
                non_negative(format!("line_items[{i}].qty"), line.qty),
                non_negative(format!("line_items[{i}].price"), line.price),
                non_negative(format!("line_items[{i}].discount"), line.discount),
                non_negative(format!("line_items[{i}].taxable"), line.taxable),
                non_negative(format!("line_items[{i}].cgst_amount"), line.cgst_amount),
                non_negative(format!("line_items[{i}].sgst_amount"), line.sgst_amount),
                non_negative(format!("line_items[{i}].igst_amount"), line.igst_amount),
            ]
        })
        .collect()
}

fn logical_allowed_rate(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let rate = line.effective_rate();
            let path = format!("line_items[{i}].effective_rate");
            if ALLOWED_RATES.iter().any(|r| (r - rate).abs() < 0.01) {
                RuleOutcome::pass(path, "rate is an allowed GST slab")
            } else {
                RuleOutcome::fail(
                    path,
                    "one of 0, 0.25, 3, 5, 12, 18, 28",
                    format!("{rate:.2}"),
                    "rate is not an allowed GST slab",
                )
            }
        })
        .collect()
}

fn logical_cgst_equals_sgst(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let path = format!("line_items[{i}].cgst_sgst_parity");
            if (line.cgst_rate - line.sgst_rate).abs() < 0.01 {
                RuleOutcome::pass(path, "cgst_rate equals sgst_rate")
            } else {
                RuleOutcome::fail(
                    path,
                    format!("{:.2}", line.cgst_rate),
                    format!("{:.2}", line.sgst_rate),
                    "cgst_rate must equal sgst_rate",
                )
            }
        })
        .collect()
}

fn logical_tax_type_exclusive(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let path = format!("line_items[{i}].tax_type_exclusive");
            if line.uses_cgst_sgst() && line.uses_igst() {
                RuleOutcome::fail(
                    path,
                    "CGST+SGST xor IGST",
                    "both present",
                    "a line cannot use both CGST/SGST and IGST",
                )
            } else {
                RuleOutcome::pass(path, "tax types are mutually exclusive")
            }
        })
        .collect()
}

fn logical_at_least_one_line_item(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    if invoice.line_items.is_empty() {
        vec![RuleOutcome::fail(
            "line_items",
            ">= 1 item",
            "0",
            "invoice must have at least one line item",
        )]
    } else {
        vec![RuleOutcome::pass(
            "line_items",
            "invoice has at least one line item",
        )]
    }
}

fn logical_invoice_date_not_future(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    match parse_date(&invoice.header.invoice_date) {
        None => vec![RuleOutcome::skipping(
            "invoice_date",
            "invoice_date absent or unparseable",
        )],
        Some(date) => {
            let today = Utc::now().date_naive();
            if date <= today {
                vec![RuleOutcome::pass(
                    "invoice_date",
                    "invoice_date is not in the future",
                )]
            } else {
                vec![RuleOutcome::fail(
                    "invoice_date",
                    "<= today",
                    &date.to_string(),
                    "invoice_date must not be in the future",
                )]
            }
        }
    }
}

fn logical_totals_non_negative(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let t = &invoice.totals;
    vec![
        non_negative("totals.subtotal".to_string(), t.subtotal),
        non_negative("totals.taxable_amount".to_string(), t.taxable_amount),
        non_negative("totals.cgst".to_string(), t.cgst),
        non_negative("totals.sgst".to_string(), t.sgst),
        non_negative("totals.igst".to_string(), t.igst),
        non_negative("totals.cess".to_string(), t.cess),
    ]
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.line_non_negative",
                name: "Line amounts non-negative",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: logical_line_non_negative,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.allowed_rate",
                name: "Line rate is an allowed GST slab",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: logical_allowed_rate,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.cgst_equals_sgst",
                name: "CGST rate equals SGST rate",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: logical_cgst_equals_sgst,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.tax_type_exclusive",
                name: "Tax types are mutually exclusive per line",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: logical_tax_type_exclusive,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.at_least_one_line_item",
                name: "At least one line item",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: logical_at_least_one_line_item,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.invoice_date_not_future",
                name: "Invoice date not in the future",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: logical_invoice_date_not_future,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "logical.totals_non_negative",
                name: "Totals amounts non-negative",
                rule_type: RuleType::Custom,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: logical_totals_non_negative,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::{DocumentId, LineItem, TenantId};

    fn ctx() -> ValidationContext {
        ValidationContext {
            tenant_id: TenantId::new(),
            document_id: DocumentId::new(),
        }
    }

    #[test]
    fn negative_amount_fails() {
        let mut invoice = Invoice::default();
        invoice.line_items.push(LineItem {
            qty: -1.0,
            ..Default::default()
        });
        let out = logical_line_non_negative(&ctx(), &invoice);
        assert!(out.iter().any(|r| !r.passed));
    }

    #[test]
    fn unknown_rate_fails() {
        let mut invoice = Invoice::default();
        invoice.line_items.push(LineItem {
            igst_rate: 17.0,
            ..Default::default()
        });
        let out = logical_allowed_rate(&ctx(), &invoice);
        assert!(!out[0].passed);
    }

    #[test]
    fn empty_line_items_fails() {
        let invoice = Invoice::default();
        let out = logical_at_least_one_line_item(&ctx(), &invoice);
        assert!(!out[0].passed);
    }

    #[test]
    fn both_tax_types_on_one_line_fails() {
        let mut invoice = Invoice::default();
        invoice.line_items.push(LineItem {
            cgst_rate: 9.0,
            cgst_amount: 90.0,
            igst_rate: 18.0,
            igst_amount: 180.0,
            ..Default::default()
        });
        let out = logical_tax_type_exclusive(&ctx(), &invoice);
        assert!(!out[0].passed);
    }
}
