//! Validator shape shared by every rule family: a pure function over
//! `(ValidationContext, Invoice)` plus static metadata describing it.

use gst_core::{DocumentId, Invoice, RuleSeverity, RuleType, TenantId};

/// Carried into every validator invocation; validators never reach the
/// store directly, so this is all the "who/what" context they get.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub tenant_id: TenantId,
    pub document_id: DocumentId,
}

/// One field-level verdict from a single validator invocation. This is the
/// pre-persistence shape; the engine attaches a `rule_id` and the rule row's
/// authoritative severity/reconciliation flag when it turns this into a
/// `ValidationResultEntry`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub field_path: String,
    pub passed: bool,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
    pub message: String,
}

impl RuleOutcome {
    pub fn pass(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            passed: true,
            expected_value: None,
            actual_value: None,
            message: message.into(),
        }
    }

    pub fn fail(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field_path: field_path.into(),
            passed: false,
            expected_value: Some(expected.into()),
            actual_value: Some(actual.into()),
            message: message.into(),
        }
    }

    /// Used when a check cannot run because an input is absent. Per
    /// spec §4.1 family 4: absence is a pass, not a failure.
    pub fn skipping(field_path: impl Into<String>, reason: &str) -> Self {
        Self {
            field_path: field_path.into(),
            passed: true,
            expected_value: None,
            actual_value: None,
            message: format!("skipping: {reason}"),
        }
    }
}

/// Catalogue metadata for a validator. `reconciliation_critical` and
/// `severity` here are the defaults copied into a seeded rule row; the
/// engine reads the *row's* severity at evaluation time (spec §9), not this
/// struct, once a tenant may have edited it.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorMeta {
    pub key: &'static str,
    pub name: &'static str,
    pub rule_type: RuleType,
    pub severity: RuleSeverity,
    pub reconciliation_critical: bool,
}

/// Implemented by every entry in the rule catalogue. The trait is async
/// because one rule (duplicate invoice detection) closes over a
/// network/DB-backed finder; built-in, purely-computational validators
/// simply return immediately from their `async fn`.
#[async_trait::async_trait]
pub trait Validator: Send + Sync {
    fn meta(&self) -> ValidatorMeta;
    async fn validate(&self, ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome>;
}

pub type ValidatorFn = fn(&ValidationContext, &Invoice) -> Vec<RuleOutcome>;

/// A stateless validator backed by a plain function pointer. The entire
/// static catalogue (rule families 1–8) is built from these.
pub struct BuiltinValidator {
    pub meta: ValidatorMeta,
    pub run: ValidatorFn,
}

#[async_trait::async_trait]
impl Validator for BuiltinValidator {
    fn meta(&self) -> ValidatorMeta {
        self.meta
    }

    async fn validate(&self, ctx: &ValidationContext, invoice: &Invoice) -> Vec<RuleOutcome> {
        (self.run)(ctx, invoice)
    }
}
