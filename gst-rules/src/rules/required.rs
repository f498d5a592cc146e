//! Rule family 1: required fields. Presence only — format is the job of
//! the `format` family, and absence here is always a hard failure (unlike
//! `format`, where absence is a pass).

use gst_core::{Invoice, RuleSeverity, RuleType};

use crate::validator::{BuiltinValidator, RuleOutcome, ValidationContext, ValidatorMeta};

fn non_empty(
    field_path: &str,
    value: &str,
    key: &'static str,
    results: &mut Vec<RuleOutcome>,
) {
    if value.trim().is_empty() {
        results.push(RuleOutcome::fail(
            field_path,
            "non-empty",
            "",
            format!("{key} is required"),
        ));
    } else {
        results.push(RuleOutcome::pass(field_path, format!("{key} present")));
    }
}

macro_rules! header_required {
    ($fn_name:ident, $key:literal, $field:ident) => {
        fn $fn_name(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
            let mut results = Vec::new();
            non_empty($key, &invoice.header.$field, $key, &mut results);
            results
        }
    };
}

header_required!(required_invoice_number, "invoice_number", invoice_number);
header_required!(required_invoice_date, "invoice_date", invoice_date);
header_required!(required_place_of_supply, "place_of_supply", place_of_supply);

fn required_seller_name(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty("seller.name", &invoice.seller.name, "seller.name", &mut results);
    results
}

fn required_seller_gstin(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty(
        "seller.gstin",
        &invoice.seller.gstin,
        "seller.gstin",
        &mut results,
    );
    results
}

fn required_seller_address(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty(
        "seller.address",
        &invoice.seller.address,
        "seller.address",
        &mut results,
    );
    results
}

fn required_seller_state_code(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty(
        "seller.state_code",
        &invoice.seller.state_code,
        "seller.state_code",
        &mut results,
    );
    results
}

fn required_buyer_name(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty("buyer.name", &invoice.buyer.name, "buyer.name", &mut results);
    results
}

fn required_buyer_gstin(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty(
        "buyer.gstin",
        &invoice.buyer.gstin,
        "buyer.gstin",
        &mut results,
    );
    results
}

fn required_buyer_state_code(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    let mut results = Vec::new();
    non_empty(
        "buyer.state_code",
        &invoice.buyer.state_code,
        "buyer.state_code",
        &mut results,
    );
    results
}

fn required_line_description(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let path = format!("line_items[{i}].description");
            if line.description.trim().is_empty() {
                RuleOutcome::fail(path, "non-empty", "", "description is required")
            } else {
                RuleOutcome::pass(path, "description present")
            }
        })
        .collect()
}

fn required_line_hsn_sac(_ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
    invoice
        .line_items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let path = format!("line_items[{i}].hsn_sac");
            if line.hsn_sac.trim().is_empty() {
                RuleOutcome::fail(path, "non-empty", "", "hsn_sac is required")
            } else {
                RuleOutcome::pass(path, "hsn_sac present")
            }
        })
        .collect()
}

/// The twelve required-field validators. Six are reconciliation-critical
/// (invoice number/date/place-of-supply, seller name/gstin, buyer gstin).
pub fn catalogue() -> Vec<BuiltinValidator> {
    vec![
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.invoice_number",
                name: "Invoice number required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: required_invoice_number,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.invoice_date",
                name: "Invoice date required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: required_invoice_date,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.place_of_supply",
                name: "Place of supply required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: required_place_of_supply,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.seller_name",
                name: "Seller name required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: required_seller_name,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.seller_gstin",
                name: "Seller GSTIN required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: required_seller_gstin,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.seller_address",
                name: "Seller address required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: required_seller_address,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.seller_state_code",
                name: "Seller state code required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: required_seller_state_code,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.buyer_name",
                name: "Buyer name required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: required_buyer_name,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.buyer_gstin",
                name: "Buyer GSTIN required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: true,
            },
            run: required_buyer_gstin,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.buyer_state_code",
                name: "Buyer state code required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Warning,
                reconciliation_critical: false,
            },
            run: required_buyer_state_code,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.line_description",
                name: "Line item description required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: required_line_description,
        },
        BuiltinValidator {
            meta: ValidatorMeta {
                key: "required.line_hsn_sac",
                name: "Line item HSN/SAC required",
                rule_type: RuleType::Required,
                severity: RuleSeverity::Error,
                reconciliation_critical: false,
            },
            run: required_line_hsn_sac,
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
    fn empty_invoice_fails_every_header_required_rule() {
        let invoice = Invoice::default();
        for validator in catalogue() {
            if validator.meta.key.starts_with("required.line_") {
                continue;
            }
            let out = validator.validate(&ctx(), &invoice);
            assert!(out.iter().all(|r| !r.passed), "{}", validator.meta.key);
        }
    }

    #[test]
    fn line_item_rules_emit_one_result_per_item() {
        let mut invoice = Invoice::default();
        invoice.line_items.push(Default::default());
        invoice.line_items.push(Default::default());
        let out = required_line_description(&ctx(), &invoice);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].field_path, "line_items[0].description");
        assert_eq!(out[1].field_path, "line_items[1].description");
    }
}
