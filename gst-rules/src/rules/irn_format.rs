//! Rule family 6: IRN format checks. Absence is treated the same as the
//! `format` family — a pass, since presence is owned elsewhere.

use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::date_parser::parse_date;
use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

fn irn_format_is_hex64(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let irn = invoice.header.irn.trim();
    if irn.is_empty() {
        return vec![RuleOutcome::skipping("irn", "irn absent")];
    }
    let lowered = irn.to_lowercase();
    if lowered.len() == 64 && lowered.chars().all(|c| c.is_ascii_hexdigit()) {
        vec![RuleOutcome::pass("irn", "irn is 64-char lowercase hex")]
    } else {
        vec![RuleOutcome::fail(
            "irn",
            "64-char hex string",
            irn,
            "irn must be a 64-character hexadecimal string",
        )]
    }
}

fn irn_acknowledgement_number_numeric(
    _ctx: &ValidationContext,
    invoice: &Invoice,
) -> Vec<RuleOutcome> {
    let ack = invoice.header.acknowledgement_number.trim();
    if ack.is_empty() {
        return vec![RuleOutcome::skipping(
            "acknowledgement_number",
            "acknowledgement_number absent",
        )];
    }
    if ack.chars().all(|c| c.is_ascii_digit()) {
        vec![RuleOutcome::pass(
            "acknowledgement_number",
            "acknowledgement_number is numeric",
        )]
    } else {
        vec![RuleOutcome::fail(
            "acknowledgement_number",
            "numeric string",
            ack,
            "acknowledgement_number must be numeric",
        )]
    }
}

fn irn_acknowledgement_date_parses(
    _ctx: &ValidationContext,
    invoice: &Invoice,
) -> Vec<RuleOutcome> {
    let ack_date = invoice.header.acknowledgement_date.trim();
    if ack_date.is_empty() {
        return vec![RuleOutcome::skipping(
            "acknowledgement_date",
            "acknowledgement_date absent",
        )];
    }
    if parse_date(ack_date).is_some() {
        vec![RuleOutcome::pass(
            "acknowledgement_date",
            "acknowledgement_date parses",
        )]
    } else {
        vec![RuleOutcome::fail(
            "acknowledgement_date",
            "a recognised date format",
            ack_date,
            "acknowledgement_date does not match any accepted format",
        )]
    }
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "irn.format_hex64",
                name: "IRN is 64-char hex",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: irn_format_is_hex64,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "irn.acknowledgement_number_numeric",
                name: "Acknowledgement number is numeric",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: irn_acknowledgement_number_numeric,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "irn.acknowledgement_date_parses",
                name: "Acknowledgement date parses",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: irn_acknowledgement_date_parses,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::{DocumentId, TenantId};

    fn ctx() -> ValidationContext {
        ValidationContext {
            tenant_id: TenantId::new(),
            document_id: DocumentId::new(),
        }
    }

    #[test]
    fn uppercase_hex_is_normalised_and_passes() {
        let mut invoice = Invoice::default();
        invoice.header.irn = "A".repeat(64);
        let out = irn_format_is_hex64(&ctx(), &invoice);
        assert!(out[0].passed);
    }

    #[test]
    fn wrong_length_fails() {
        let mut invoice = Invoice::default();
        invoice.header.irn = "abc123".to_string();
        let out = irn_format_is_hex64(&ctx(), &invoice);
        assert!(!out[0].passed);
    }

    #[test]
    fn empty_irn_passes() {
        let invoice = Invoice::default();
        let out = irn_format_is_hex64(&ctx(), &invoice);
        assert!(out[0].passed);
    }
}
