//! Validation engine (C4): resolves active rules for a (tenant, doc type),
//! runs them, aggregates status and the reconciliation-critical subset, and
//! computes per-field status.

use std::collections::HashMap;

use gst_core::{
    Document, DocumentId, DocumentValidationRule, GstError, GstResult, ReconciliationStatus,
    RuleSeverity, TenantId, ValidationResultEntry, ValidationStatus,
};
use gst_rules::{missing_builtin_rules, RuleRegistry, ValidationContext};

/// What the engine needs from the document store. Kept separate from
/// `gst-db` so the validation engine and the document store stay
/// independent of each other (spec §2 dependency order: C4 and C6 both
/// depend on C3, not on each other) — `gst-service` wires a concrete
/// implementation in.
#[async_trait::async_trait]
pub trait ValidationStore: Send + Sync {
    async fn get_document(&self, tenant_id: TenantId, doc_id: DocumentId) -> GstResult<Document>;

    async fn existing_builtin_keys(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<Vec<String>>;

    async fn insert_rules(&self, rules: Vec<DocumentValidationRule>) -> GstResult<()>;

    async fn active_rules(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<Vec<DocumentValidationRule>>;

    async fn persist_validation(
        &self,
        tenant_id: TenantId,
        doc_id: DocumentId,
        results: Vec<ValidationResultEntry>,
        validation_status: ValidationStatus,
        reconciliation_status: ReconciliationStatus,
    ) -> GstResult<()>;
}

pub struct ValidationReport {
    pub results: Vec<ValidationResultEntry>,
    pub validation_status: ValidationStatus,
    pub reconciliation_status: ReconciliationStatus,
    pub total: usize,
    pub passed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub reconciliation_total: usize,
    pub reconciliation_passed: usize,
    pub reconciliation_errors: usize,
    pub field_statuses: HashMap<String, FieldStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldStatus {
    Valid,
    Unsure,
    Invalid,
}

pub struct ValidationEngine<S: ValidationStore> {
    registry: RuleRegistry,
    store: S,
}

impl<S: ValidationStore> ValidationEngine<S> {
    pub fn new(registry: RuleRegistry, store: S) -> Self {
        Self { registry, store }
    }

    /// Seeds missing built-in rules for (tenant, document_type), idempotent.
    pub async fn ensure_builtin_rules(
        &self,
        tenant_id: TenantId,
        document_type: &str,
    ) -> GstResult<()> {
        let existing = self
            .store
            .existing_builtin_keys(tenant_id, document_type)
            .await?;
        let missing = missing_builtin_rules(tenant_id, document_type, &existing);
        if missing.is_empty() {
            return Ok(());
        }
        self.store.insert_rules(missing).await
    }

    pub async fn validate_document(
        &self,
        tenant_id: TenantId,
        doc_id: DocumentId,
    ) -> GstResult<ValidationReport> {
        let doc = self.store.get_document(tenant_id, doc_id).await?;
        self.ensure_builtin_rules(tenant_id, &doc.document_type)
            .await?;
        let rules = self
            .store
            .active_rules(tenant_id, &doc.document_type)
            .await?;

        let invoice = gst_core::Invoice::decode(&doc.structured_data)
            .map_err(|e| GstError::InvalidStructuredData {
                reason: e.to_string(),
            })?;
        let ctx = ValidationContext {
            tenant_id,
            document_id: doc_id,
        };

        let mut results = Vec::new();
        for rule in &rules {
            let Some(key) = &rule.builtin_rule_key else {
                continue;
            };
            let Some(validator) = self.registry.get(key) else {
                tracing::warn!(rule_key = %key, "active rule has no registered validator, skipping");
                continue;
            };
            for outcome in validator.validate(&ctx, &invoice).await {
                results.push(ValidationResultEntry {
                    rule_id: rule.id,
                    passed: outcome.passed,
                    field_path: outcome.field_path,
                    expected_value: outcome.expected_value,
                    actual_value: outcome.actual_value,
                    message: outcome.message,
                    reconciliation_critical: rule.reconciliation_critical,
                });
            }
        }

        let severity_by_rule: HashMap<_, _> = rules.iter().map(|r| (r.id, r.severity)).collect();
        let validation_status = aggregate_status(&results, &severity_by_rule, false);
        let reconciliation_status = match aggregate_status(&results, &severity_by_rule, true) {
            ValidationStatus::Invalid => ReconciliationStatus::Invalid,
            _ => ReconciliationStatus::Valid,
        };

        self.store
            .persist_validation(
                tenant_id,
                doc_id,
                results.clone(),
                validation_status,
                reconciliation_status,
            )
            .await?;

        let field_statuses = compute_field_statuses(&results, &severity_by_rule, &HashMap::new());
        let (total, passed, errors, warnings) =
            count_by_severity(&results, &severity_by_rule, false);
        let (reconciliation_total, reconciliation_passed, reconciliation_errors, _) =
            count_by_severity(&results, &severity_by_rule, true);

        Ok(ValidationReport {
            results,
            validation_status,
            reconciliation_status,
            total,
            passed,
            errors,
            warnings,
            reconciliation_total,
            reconciliation_passed,
            reconciliation_errors,
            field_statuses,
        })
    }

    pub async fn get_validation(
        &self,
        tenant_id: TenantId,
        doc_id: DocumentId,
        confidence: &HashMap<String, f64>,
    ) -> GstResult<ValidationReport> {
        let doc = self.store.get_document(tenant_id, doc_id).await?;
        let rules = self
            .store
            .active_rules(tenant_id, &doc.document_type)
            .await?;
        let severity_by_rule: HashMap<_, _> = rules.iter().map(|r| (r.id, r.severity)).collect();
        let results = doc.validation_results.clone();
        let field_statuses = compute_field_statuses(&results, &severity_by_rule, confidence);
        let (total, passed, errors, warnings) =
            count_by_severity(&results, &severity_by_rule, false);
        let (reconciliation_total, reconciliation_passed, reconciliation_errors, _) =
            count_by_severity(&results, &severity_by_rule, true);
        Ok(ValidationReport {
            results,
            validation_status: doc.validation_status,
            reconciliation_status: doc.reconciliation_status,
            total,
            passed,
            errors,
            warnings,
            reconciliation_total,
            reconciliation_passed,
            reconciliation_errors,
            field_statuses,
        })
    }
}

fn relevant<'a>(
    results: &'a [ValidationResultEntry],
    reconciliation_only: bool,
) -> impl Iterator<Item = &'a ValidationResultEntry> {
    results
        .iter()
        .filter(move |r| !reconciliation_only || r.reconciliation_critical)
}

/// Error > warning > valid; warnings never move the reconciliation subset
/// off `valid` by themselves in the caller's mapping to `ReconciliationStatus`.
fn aggregate_status(
    results: &[ValidationResultEntry],
    severity_by_rule: &HashMap<gst_core::ValidationRuleId, RuleSeverity>,
    reconciliation_only: bool,
) -> ValidationStatus {
    let mut any_error_failure = false;
    let mut any_warning_failure = false;
    for result in relevant(results, reconciliation_only) {
        if result.passed {
            continue;
        }
        match severity_by_rule.get(&result.rule_id) {
            Some(RuleSeverity::Error) => any_error_failure = true,
            Some(RuleSeverity::Warning) => any_warning_failure = true,
            None => {}
        }
    }
    if any_error_failure {
        ValidationStatus::Invalid
    } else if any_warning_failure {
        ValidationStatus::Warning
    } else {
        ValidationStatus::Valid
    }
}

fn count_by_severity(
    results: &[ValidationResultEntry],
    severity_by_rule: &HashMap<gst_core::ValidationRuleId, RuleSeverity>,
    reconciliation_only: bool,
) -> (usize, usize, usize, usize) {
    let mut total = 0;
    let mut passed = 0;
    let mut errors = 0;
    let mut warnings = 0;
    for result in relevant(results, reconciliation_only) {
        total += 1;
        if result.passed {
            passed += 1;
            continue;
        }
        match severity_by_rule.get(&result.rule_id) {
            Some(RuleSeverity::Error) => errors += 1,
            Some(RuleSeverity::Warning) => warnings += 1,
            None => {}
        }
    }
    (total, passed, errors, warnings)
}

/// `ComputeFieldStatuses`: deterministic, idempotent; `valid < unsure < invalid`.
pub fn compute_field_statuses(
    results: &[ValidationResultEntry],
    severity_by_rule: &HashMap<gst_core::ValidationRuleId, RuleSeverity>,
    confidence: &HashMap<String, f64>,
) -> HashMap<String, FieldStatus> {
    let mut statuses: HashMap<String, FieldStatus> = HashMap::new();

    let mut paths: Vec<&str> = results.iter().map(|r| r.field_path.as_str()).collect();
    paths.extend(confidence.keys().map(String::as_str));

    for path in paths {
        statuses.entry(path.to_string()).or_insert(FieldStatus::Valid);
    }

    for result in results {
        if result.passed {
            continue;
        }
        let severity = severity_by_rule.get(&result.rule_id).copied();
        let candidate = match severity {
            Some(RuleSeverity::Error) => FieldStatus::Invalid,
            Some(RuleSeverity::Warning) => FieldStatus::Unsure,
            None => continue,
        };
        let entry = statuses.entry(result.field_path.clone()).or_insert(FieldStatus::Valid);
        if candidate > *entry {
            *entry = candidate;
        }
    }

    for (path, score) in confidence {
        if *score < 0.5 {
            let entry = statuses.entry(path.clone()).or_insert(FieldStatus::Valid);
            if FieldStatus::Unsure > *entry {
                *entry = FieldStatus::Unsure;
            }
        }
    }

    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::ValidationRuleId;

    fn result(rule_id: ValidationRuleId, path: &str, passed: bool, recon: bool) -> ValidationResultEntry {
        ValidationResultEntry {
            rule_id,
            passed,
            field_path: path.to_string(),
            expected_value: None,
            actual_value: None,
            message: String::new(),
            reconciliation_critical: recon,
        }
    }

    #[test]
    fn aggregate_status_error_beats_warning() {
        let error_rule = ValidationRuleId::new();
        let warning_rule = ValidationRuleId::new();
        let mut severity = HashMap::new();
        severity.insert(error_rule, RuleSeverity::Error);
        severity.insert(warning_rule, RuleSeverity::Warning);

        let results = vec![
            result(warning_rule, "a", false, false),
            result(error_rule, "b", false, false),
        ];
        assert_eq!(
            aggregate_status(&results, &severity, false),
            ValidationStatus::Invalid
        );
    }

    #[test]
    fn aggregate_status_warning_only_when_no_errors() {
        let warning_rule = ValidationRuleId::new();
        let mut severity = HashMap::new();
        severity.insert(warning_rule, RuleSeverity::Warning);
        let results = vec![result(warning_rule, "a", false, false)];
        assert_eq!(
            aggregate_status(&results, &severity, false),
            ValidationStatus::Warning
        );
    }

    #[test]
    fn aggregate_status_valid_when_everything_passes() {
        let rule = ValidationRuleId::new();
        let mut severity = HashMap::new();
        severity.insert(rule, RuleSeverity::Error);
        let results = vec![result(rule, "a", true, false)];
        assert_eq!(
            aggregate_status(&results, &severity, false),
            ValidationStatus::Valid
        );
    }

    #[test]
    fn reconciliation_subset_ignores_non_critical_failures() {
        let error_rule = ValidationRuleId::new();
        let mut severity = HashMap::new();
        severity.insert(error_rule, RuleSeverity::Error);
        let results = vec![result(error_rule, "a", false, false)];
        assert_eq!(
            aggregate_status(&results, &severity, true),
            ValidationStatus::Valid
        );
    }

    #[test]
    fn field_status_invalid_beats_unsure() {
        let error_rule = ValidationRuleId::new();
        let warning_rule = ValidationRuleId::new();
        let mut severity = HashMap::new();
        severity.insert(error_rule, RuleSeverity::Error);
        severity.insert(warning_rule, RuleSeverity::Warning);

        let results = vec![
            result(warning_rule, "a", false, false),
            result(error_rule, "a", false, false),
        ];
        let statuses = compute_field_statuses(&results, &severity, &HashMap::new());
        assert_eq!(statuses["a"], FieldStatus::Invalid);
    }

    #[test]
    fn low_confidence_marks_field_unsure() {
        let mut confidence = HashMap::new();
        confidence.insert("seller.name".to_string(), 0.2);
        let statuses = compute_field_statuses(&[], &HashMap::new(), &confidence);
        assert_eq!(statuses["seller.name"], FieldStatus::Unsure);
    }

    #[test]
    fn compute_field_statuses_is_idempotent() {
        let error_rule = ValidationRuleId::new();
        let mut severity = HashMap::new();
        severity.insert(error_rule, RuleSeverity::Error);
        let results = vec![result(error_rule, "a", false, false)];
        let first = compute_field_statuses(&results, &severity, &HashMap::new());
        let second = compute_field_statuses(&results, &severity, &HashMap::new());
        assert_eq!(first["a"], second["a"]);
    }
}
