pub mod audit;
pub mod collections;
pub mod documents;
pub mod files;
pub mod hsn;
pub mod tags;
pub mod tenants;
pub mod users;
pub mod validation_rules;

pub use audit::DocumentAuditEntryRepository;
pub use collections::CollectionRepository;
pub use documents::DocumentRepository;
pub use files::FileRepository;
pub use hsn::HsnRateRepository;
pub use tags::DocumentTagRepository;
pub use tenants::TenantRepository;
pub use users::UserRepository;
pub use validation_rules::DocumentValidationRuleRepository;
