//! Rule family 4: cross-field checks. When an input the check needs is
//! absent, emit a single passing result with a "skipping" message rather
//! than failing or erroring.

use gst_core::{Invoice, Party, RuleSeverity, RuleType};

use crate::date_parser::parse_date;
use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

fn gstin_state_code_matches(field_path: &str, party: &Party) -> RuleOutcome {
    if party.gstin.trim().len() < 2 || party.state_code.trim().is_empty() {
        return RuleOutcome::skipping(field_path, "gstin or state_code absent");
    }
    let gstin_prefix = &party.gstin.trim()[..2];
    if gstin_prefix == party.state_code.trim() {
        RuleOutcome::pass(field_path, "GSTIN state prefix matches state_code")
    } else {
        RuleOutcome::fail(
            field_path,
            party.state_code.trim(),
            gstin_prefix,
            "GSTIN state prefix does not match state_code",
        )
    }
}

fn xf_seller_gstin_state_code(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![gstin_state_code_matches("seller.gstin_state_code", &invoice.seller)]
}

fn xf_buyer_gstin_state_code(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![gstin_state_code_matches("buyer.gstin_state_code", &invoice.buyer)]
}

fn gstin_pan_matches(field_path: &str, party: &Party) -> RuleOutcome {
    if party.gstin.trim().len() < 12 || party.pan.trim().is_empty() {
        return RuleOutcome::skipping(field_path, "gstin or pan absent");
    }
    let embedded_pan = &party.gstin.trim()[2..12];
    if embedded_pan == party.pan.trim() {
        RuleOutcome::pass(field_path, "GSTIN embeds the declared PAN")
    } else {
        RuleOutcome::fail(
            field_path,
            party.pan.trim(),
            embedded_pan,
            "GSTIN does not embed the declared PAN",
        )
    }
}

fn xf_seller_gstin_pan(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![gstin_pan_matches("seller.gstin_pan", &invoice.seller)]
}

fn xf_buyer_gstin_pan(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![gstin_pan_matches("buyer.gstin_pan", &invoice.buyer)]
}

fn xf_intrastate(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let seller_state = invoice.seller.state_code.trim();
    let buyer_state = invoice.buyer.state_code.trim();
    if seller_state.is_empty() || buyer_state.is_empty() {
        return vec![RuleOutcome::skipping(
            "xf.tax_type.intrastate",
            "seller or buyer state_code absent",
        )];
    }
    if seller_state != buyer_state {
        return vec![RuleOutcome::pass(
            "xf.tax_type.intrastate",
            "not an intrastate invoice, skipping",
        )];
    }
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let path = format!("line_items[{i}].xf.tax_type.intrastate");
            if line.uses_cgst_sgst() && !line.uses_igst() {
                RuleOutcome::pass(path, "intrastate line uses CGST+SGST")
            } else {
                RuleOutcome::fail(
                    path,
                    "CGST+SGST, zero IGST",
                    "IGST present or CGST+SGST absent",
                    "intrastate line must use CGST+SGST and zero IGST",
                )
            }
        })
        .collect()
}

fn xf_interstate(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let seller_state = invoice.seller.state_code.trim();
    let buyer_state = invoice.buyer.state_code.trim();
    if seller_state.is_empty() || buyer_state.is_empty() {
        return vec![RuleOutcome::skipping(
            "xf.tax_type.interstate",
            "seller or buyer state_code absent",
        )];
    }
    if seller_state == buyer_state {
        return vec![RuleOutcome::pass(
            "xf.tax_type.interstate",
            "not an interstate invoice, skipping",
        )];
    }
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let path = format!("line_items[{i}].xf.tax_type.interstate");
            if line.uses_igst() && !line.uses_cgst_sgst() {
                RuleOutcome::pass(path, "interstate line uses IGST")
            } else {
                RuleOutcome::fail(
                    path,
                    "IGST, zero CGST+SGST",
                    "CGST+SGST present or IGST absent",
                    "interstate line must use IGST and zero CGST+SGST",
                )
            }
        })
        .collect()
}

fn xf_due_date_after_invoice_date(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let invoice_date = parse_date(&invoice.header.invoice_date);
    let due_date = parse_date(&invoice.header.due_date);
    match (invoice_date, due_date) {
        (Some(inv), Some(due)) => {
            if due >= inv {
                vec![RuleOutcome::pass(
                    "xf.due_date",
                    "due_date is on or after invoice_date",
                )]
            } else {
                vec![RuleOutcome::fail(
                    "xf.due_date",
                    ">= invoice_date",
                    &due.to_string(),
                    "due_date is before invoice_date",
                )]
            }
        }
        _ => vec![RuleOutcome::skipping(
            "xf.due_date",
            "invoice_date or due_date absent/unparseable",
        )],
    }
}

fn xf_seller_buyer_gstin_distinct(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let seller_gstin = invoice.seller.gstin.trim();
    let buyer_gstin = invoice.buyer.gstin.trim();
    if seller_gstin.is_empty() || buyer_gstin.is_empty() {
        return vec![RuleOutcome::skipping(
            "xf.seller_buyer_gstin_distinct",
            "seller or buyer gstin absent",
        )];
    }
    if seller_gstin != buyer_gstin {
        vec![RuleOutcome::pass(
            "xf.seller_buyer_gstin_distinct",
            "seller and buyer GSTIN differ",
        )]
    } else {
        vec![RuleOutcome::fail(
            "xf.seller_buyer_gstin_distinct",
            "seller.gstin != buyer.gstin",
            seller_gstin,
            "seller and buyer GSTIN must not be identical",
        )]
    }
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.seller_gstin_state_code",
                name: "Seller GSTIN state prefix",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: xf_seller_gstin_state_code,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.buyer_gstin_state_code",
                name: "Buyer GSTIN state prefix",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: xf_buyer_gstin_state_code,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.seller_gstin_pan",
                name: "Seller GSTIN embeds PAN",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: xf_seller_gstin_pan,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.buyer_gstin_pan",
                name: "Buyer GSTIN embeds PAN",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: xf_buyer_gstin_pan,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.tax_type.intrastate",
                name: "Intrastate lines use CGST+SGST",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: xf_intrastate,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.tax_type.interstate",
                name: "Interstate lines use IGST",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: xf_interstate,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.due_date",
                name: "Due date on or after invoice date",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: xf_due_date_after_invoice_date,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "xf.seller_buyer_gstin_distinct",
                name: "Seller and buyer GSTIN differ",
                rule_type: RuleType::CrossField,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: xf_seller_buyer_gstin_distinct,
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

    fn intrastate_invoice() -> Invoice {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        invoice.seller.state_code = "29".to_string();
        invoice.buyer.gstin = "29FGHIJ5678K1Z2".to_string();
        invoice.buyer.state_code = "29".to_string();
        invoice.line_items.push(LineItem {
            cgst_rate: 9.0,
            cgst_amount: 90.0,
            sgst_rate: 9.0,
            sgst_amount: 90.0,
            ..Default::default()
        });
        invoice
    }

    #[test]
    fn gstin_state_prefix_matches_on_golden_invoice() {
        let invoice = intrastate_invoice();
        assert!(xf_seller_gstin_state_code(&ctx(), &invoice)[0].passed);
        assert!(xf_buyer_gstin_state_code(&ctx(), &invoice)[0].passed);
    }

    #[test]
    fn interstate_mis_taxation_fails() {
        let mut invoice = intrastate_invoice();
        invoice.buyer.state_code = "27".to_string();
        invoice.buyer.gstin = "27FGHIJ5678K1Z2".to_string();
        let out = xf_interstate(&ctx(), &invoice);
        assert!(!out[0].passed);
    }

    #[test]
    fn skips_when_state_codes_absent() {
        let invoice = Invoice::default();
        let out = xf_intrastate(&ctx(), &invoice);
        assert!(out[0].passed);
        assert!(out[0].message.starts_with("skipping"));
    }

    #[test]
    fn identical_gstin_fails() {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        invoice.buyer.gstin = "29ABCDE1234F1Z5".to_string();
        let out = xf_seller_buyer_gstin_distinct(&ctx(), &invoice);
        assert!(!out[0].passed);
    }
}
