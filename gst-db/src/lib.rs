pub mod convert;
pub mod repo;
pub mod schema;

use sqlx::{Pool, Postgres};

use gst_core::GstResult;

pub use schema::Schema;

pub use repo::{
    CollectionRepository, DocumentAuditEntryRepository, DocumentRepository, DocumentTagRepository,
    DocumentValidationRuleRepository, FileRepository, HsnRateRepository, TenantRepository,
    UserRepository,
};

/// Bundles one repository per entity over a shared pool. `gst-service`
/// constructs one of these at boot and hands individual repositories to the
/// layers that need them.
pub struct Store {
    pub tenants: TenantRepository,
    pub users: UserRepository,
    pub collections: CollectionRepository,
    pub files: FileRepository,
    pub documents: DocumentRepository,
    pub tags: DocumentTagRepository,
    pub validation_rules: DocumentValidationRuleRepository,
    pub audit: DocumentAuditEntryRepository,
    pub hsn: HsnRateRepository,
}

impl Store {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            tenants: TenantRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            collections: CollectionRepository::new(pool.clone()),
            files: FileRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            tags: DocumentTagRepository::new(pool.clone()),
            validation_rules: DocumentValidationRuleRepository::new(pool.clone()),
            audit: DocumentAuditEntryRepository::new(pool.clone()),
            hsn: HsnRateRepository::new(pool),
        }
    }
}

pub async fn ensure_schema(pool: &Pool<Postgres>) -> GstResult<()> {
    Schema::ensure_all(pool).await
}
