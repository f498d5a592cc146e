pub mod date_parser;
pub mod duplicate;
pub mod hsn;
pub mod registry;
pub mod rules;
pub mod validator;

pub use duplicate::{DuplicateInvoiceFinder, DuplicateInvoiceValidator, DuplicateMatch};
pub use hsn::HsnLookup;
pub use registry::{missing_builtin_rules, RuleRegistry};
pub use rules::hsn_rules::{HsnExistsValidator, HsnRateMatchValidator};
pub use validator::{
    BuiltinValidator, RuleOutcome, ValidationContext, Validator, ValidatorFn, ValidatorMeta,
};
