pub mod engine;

pub use engine::{compute_field_statuses, FieldStatus, ValidationEngine, ValidationReport, ValidationStore};
