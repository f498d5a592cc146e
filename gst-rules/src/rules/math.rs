//! Rule family 3: arithmetic identities. Absolute tolerance ±1.00, except
//! the round-off bound which permits ±0.50 of itself.

use gst_core::utils::approx_eq;
use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

const TOLERANCE: f64 = 1.00;
const ROUND_OFF_TOLERANCE: f64 = 0.50;

fn identity_check(field_path: String, expected: f64, actual: f64, message: &str) -> RuleOutcome {
    if approx_eq(expected, actual, TOLERANCE) {
        RuleOutcome::pass(field_path, message)
    } else {
        RuleOutcome::fail(
            field_path,
            format!("{expected:.2}"),
            format!("{actual:.2}"),
            message,
        )
    }
}

fn math_line_taxable(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let expected = line.qty * line.price - line.discount;
            identity_check(
                format!("line_items[{i}].taxable"),
                expected,
                line.taxable,
                "taxable = qty*price - discount",
            )
        })
        .collect()
}

fn math_line_cgst_amount(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let expected = line.taxable * line.cgst_rate / 100.0;
            identity_check(
                format!("line_items[{i}].cgst_amount"),
                expected,
                line.cgst_amount,
                "cgst_amount = taxable * cgst_rate/100",
            )
        })
        .collect()
}

fn math_line_sgst_amount(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let expected = line.taxable * line.sgst_rate / 100.0;
            identity_check(
                format!("line_items[{i}].sgst_amount"),
                expected,
                line.sgst_amount,
                "sgst_amount = taxable * sgst_rate/100",
            )
        })
        .collect()
}

fn math_line_igst_amount(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let expected = line.taxable * line.igst_rate / 100.0;
            identity_check(
                format!("line_items[{i}].igst_amount"),
                expected,
                line.igst_amount,
                "igst_amount = taxable * igst_rate/100",
            )
        })
        .collect()
}

fn math_line_total(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let expected = line.taxable + line.cgst_amount + line.sgst_amount + line.igst_amount;
            identity_check(
                format!("line_items[{i}].total"),
                expected,
                line.total,
                "total = taxable + cgst_amount + sgst_amount + igst_amount",
            )
        })
        .collect()
}

fn math_totals_subtotal(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    // Known implementation trap: sums `taxable`, not `total`.
    let expected: f64 = invoice.line_items.iter().map(|l| l.taxable).sum();
    vec![identity_check(
        "totals.subtotal".to_string(),
        expected,
        invoice.totals.subtotal,
        "subtotal = sum(line.taxable)",
    )]
}

fn math_totals_taxable_amount(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let expected = invoice.totals.subtotal - invoice.totals.total_discount;
    vec![identity_check(
        "totals.taxable_amount".to_string(),
        expected,
        invoice.totals.taxable_amount,
        "taxable_amount = subtotal - total_discount",
    )]
}

fn math_totals_cgst(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let expected: f64 = invoice.line_items.iter().map(|l| l.cgst_amount).sum();
    vec![identity_check(
        "totals.cgst".to_string(),
        expected,
        invoice.totals.cgst,
        "cgst = sum(line.cgst_amount)",
    )]
}

fn math_totals_sgst(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let expected: f64 = invoice.line_items.iter().map(|l| l.sgst_amount).sum();
    vec![identity_check(
        "totals.sgst".to_string(),
        expected,
        invoice.totals.sgst,
        "sgst = sum(line.sgst_amount)",
    )]
}

fn math_totals_igst(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let expected: f64 = invoice.line_items.iter().map(|l| l.igst_amount).sum();
    vec![identity_check(
        "totals.igst".to_string(),
        expected,
        invoice.totals.igst,
        "igst = sum(line.igst_amount)",
    )]
}

fn math_totals_total(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let t = &invoice.totals;
    let expected = t.taxable_amount + t.cgst + t.sgst + t.igst + t.cess + t.round_off;
    vec![identity_check(
        "totals.total".to_string(),
        expected,
        t.total,
        "total = taxable_amount + cgst + sgst + igst + cess + round_off",
    )]
}

fn math_round_off_bound(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let round_off = invoice.totals.round_off;
    if round_off.abs() <= ROUND_OFF_TOLERANCE {
        vec![RuleOutcome::pass(
            "totals.round_off",
            "round_off within bound",
        )]
    } else {
        vec![RuleOutcome::fail(
            "totals.round_off",
            format!("|x| <= {ROUND_OFF_TOLERANCE:.2}"),
            format!("{round_off:.2}"),
            "round_off exceeds the permitted bound",
        )]
    }
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.line_taxable",
                name: "Line taxable identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: math_line_taxable,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.line_cgst_amount",
                name: "Line CGST amount identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: math_line_cgst_amount,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.line_sgst_amount",
                name: "Line SGST amount identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: math_line_sgst_amount,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.line_igst_amount",
                name: "Line IGST amount identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: math_line_igst_amount,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.line_total",
                name: "Line total identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: math_line_total,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.totals_subtotal",
                name: "Totals subtotal identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: math_totals_subtotal,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.totals_taxable_amount",
                name: "Totals taxable amount identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: math_totals_taxable_amount,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.totals_cgst",
                name: "Totals CGST identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: math_totals_cgst,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.totals_sgst",
                name: "Totals SGST identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: math_totals_sgst,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.totals_igst",
                name: "Totals IGST identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: math_totals_igst,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.totals_total",
                name: "Totals total identity",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: math_totals_total,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "math.round_off_bound",
                name: "Round-off bound",
                rule_type: RuleType::SumCheck,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: math_round_off_bound,
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

    fn golden_invoice() -> Invoice {
        let mut invoice = Invoice::default();
        invoice.line_items.push(LineItem {
            qty: 10.0,
            price: 100.0,
            discount: 0.0,
            taxable: 1000.0,
            cgst_rate: 9.0,
            cgst_amount: 90.0,
            sgst_rate: 9.0,
            sgst_amount: 90.0,
            igst_rate: 0.0,
            igst_amount: 0.0,
            total: 1180.0,
            ..Default::default()
        });
        invoice.totals.subtotal = 1000.0;
        invoice.totals.taxable_amount = 1000.0;
        invoice.totals.cgst = 90.0;
        invoice.totals.sgst = 90.0;
        invoice.totals.total = 1180.0;
        invoice
    }

    #[test]
    fn golden_invoice_passes_every_math_identity() {
        let invoice = golden_invoice();
        for validator in catalogue() {
            let out = validator.validate(&ctx(), &invoice);
            assert!(
                out.iter().all(|r| r.passed),
                "{} failed: {:?}",
                validator.meta.key,
                out
            );
        }
    }

    #[test]
    fn subtotal_trap_catches_total_instead_of_taxable() {
        let mut invoice = golden_invoice();
        invoice.totals.subtotal = 1180.0;
        let out = math_totals_subtotal(&ctx(), &invoice);
        assert!(!out[0].passed);
    }

    #[test]
    fn round_off_bound_rejects_large_values() {
        let mut invoice = golden_invoice();
        invoice.totals.round_off = 2.0;
        let out = math_round_off_bound(&ctx(), &invoice);
        assert!(!out[0].passed);
    }
}
