//! Rule family 2: format. Regex/range checks; an empty input is *always* a
//! pass here — presence is the `required` family's job, format is a no-op
//! on absence.

use once_cell::sync::Lazy;
use regex::Regex;

use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::date_parser::parse_date;
use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

static GSTIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}[A-Z]{5}\d{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").unwrap());
static PAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{5}\d{4}[A-Z]$").unwrap());
static IFSC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap());
static HSN_SAC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,8}$").unwrap());
static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9,18}$").unwrap());

const ISO_CURRENCIES: &[&str] = &["INR", "USD", "EUR", "GBP", "AED", "SGD", "JPY", "AUD", "CAD"];

fn regex_check(field_path: &str, value: &str, re: &Regex, label: &str) -> RuleOutcome {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return RuleOutcome::pass(field_path, format!("{label} absent, skipping format check"));
    }
    if re.is_match(trimmed) {
        RuleOutcome::pass(field_path, format!("{label} format valid"))
    } else {
        RuleOutcome::fail(
            field_path,
            label,
            trimmed,
            format!("{label} does not match the expected format"),
        )
    }
}

fn format_seller_gstin(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![regex_check(
        "seller.gstin",
        &invoice.seller.gstin,
        &GSTIN_RE,
        "GSTIN",
    )]
}

fn format_buyer_gstin(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![regex_check(
        "buyer.gstin",
        &invoice.buyer.gstin,
        &GSTIN_RE,
        "GSTIN",
    )]
}

fn format_seller_pan(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![regex_check("seller.pan", &invoice.seller.pan, &PAN_RE, "PAN")]
}

fn format_buyer_pan(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![regex_check("buyer.pan", &invoice.buyer.pan, &PAN_RE, "PAN")]
}

fn format_ifsc(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![regex_check(
        "payment.ifsc",
        &invoice.payment.ifsc,
        &IFSC_RE,
        "IFSC",
    )]
}

fn format_account_number(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![regex_check(
        "payment.account_number",
        &invoice.payment.account_number,
        &ACCOUNT_RE,
        "account number",
    )]
}

fn state_code_check(field_path: &str, value: &str) -> RuleOutcome {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return RuleOutcome::pass(field_path, "state code absent, skipping format check");
    }
    match trimmed.parse::<u32>() {
        Ok(n) if (1..=38).contains(&n) && trimmed.len() == 2 => {
            RuleOutcome::pass(field_path, "state code format valid")
        }
        _ => RuleOutcome::fail(
            field_path,
            "01-38",
            trimmed,
            "state code must be a two-digit value between 01 and 38",
        ),
    }
}

fn format_seller_state_code(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![state_code_check("seller.state_code", &invoice.seller.state_code)]
}

fn format_buyer_state_code(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![state_code_check("buyer.state_code", &invoice.buyer.state_code)]
}

fn format_currency(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let trimmed = invoice.header.currency.trim();
    if trimmed.is_empty() {
        return vec![RuleOutcome::pass(
            "currency",
            "currency absent, skipping format check",
        )];
    }
    if ISO_CURRENCIES.contains(&trimmed.to_uppercase().as_str()) {
        vec![RuleOutcome::pass("currency", "currency code valid")]
    } else {
        vec![RuleOutcome::fail(
            "currency",
            "ISO 4217 code",
            trimmed,
            "currency is not a recognised ISO 4217 code",
        )]
    }
}

fn date_check(field_path: &str, value: &str) -> RuleOutcome {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return RuleOutcome::pass(field_path, "date absent, skipping format check");
    }
    if parse_date(trimmed).is_some() {
        RuleOutcome::pass(field_path, "date format valid")
    } else {
        RuleOutcome::fail(
            field_path,
            "a recognised date format",
            trimmed,
            "date does not match any accepted format",
        )
    }
}

fn format_invoice_date(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![date_check("invoice_date", &invoice.header.invoice_date)]
}

fn format_due_date(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    vec![date_check("due_date", &invoice.header.due_date)]
}

fn format_line_hsn_sac(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            regex_check(
                &format!("line_items[{i}].hsn_sac"),
                &line.hsn_sac,
                &HSN_SAC_RE,
                "HSN/SAC",
            )
        })
        .collect()
}

pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.seller_gstin",
                name: "Seller GSTIN format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: format_seller_gstin,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.buyer_gstin",
                name: "Buyer GSTIN format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: format_buyer_gstin,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.seller_pan",
                name: "Seller PAN format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: format_seller_pan,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.buyer_pan",
                name: "Buyer PAN format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: format_buyer_pan,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.ifsc",
                name: "IFSC format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: format_ifsc,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.account_number",
                name: "Bank account number format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: format_account_number,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.seller_state_code",
                name: "Seller state code format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: format_seller_state_code,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.buyer_state_code",
                name: "Buyer state code format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: format_buyer_state_code,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.currency",
                name: "Currency code format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: format_currency,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.invoice_date",
                name: "Invoice date format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: format_invoice_date,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.due_date",
                name: "Due date format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: format_due_date,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "format.line_hsn_sac",
                name: "Line item HSN/SAC format",
                rule_type: RuleType::Regex,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: format_line_hsn_sac,
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
    fn empty_gstin_passes() {
        let invoice = Invoice::default();
        let out = format_seller_gstin(&ctx(), &invoice);
        assert!(out[0].passed);
    }

    #[test]
    fn valid_gstin_passes() {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "29ABCDE1234F1Z5".to_string();
        let out = format_seller_gstin(&ctx(), &invoice);
        assert!(out[0].passed);
    }

    #[test]
    fn malformed_gstin_fails() {
        let mut invoice = Invoice::default();
        invoice.seller.gstin = "not-a-gstin".to_string();
        let out = format_seller_gstin(&ctx(), &invoice);
        assert!(!out[0].passed);
    }

    #[test]
    fn state_code_must_be_two_digits_in_range() {
        assert!(state_code_check("x", "29").passed);
        assert!(!state_code_check("x", "99").passed);
        assert!(!state_code_check("x", "1").passed);
    }

    #[test]
    fn currency_is_case_insensitive() {
        let mut invoice = Invoice::default();
        invoice.header.currency = "inr".to_string();
        assert!(format_currency(&ctx(), &invoice)[0].passed);
    }
}
