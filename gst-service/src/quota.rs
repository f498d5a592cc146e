//! Free-tier quota is referenced by the service but its rolling-vs-calendar
//! semantics are not specified (spec §9 open question). The call site is
//! preserved behind this trait; the default implementation never limits.

use gst_core::{GstResult, TenantId};

#[async_trait::async_trait]
pub trait QuotaPolicy: Send + Sync {
    async fn check_and_increment(&self, tenant_id: TenantId) -> GstResult<()>;
}

pub struct NoQuota;

#[async_trait::async_trait]
impl QuotaPolicy for NoQuota {
    async fn check_and_increment(&self, _tenant_id: TenantId) -> GstResult<()> {
        Ok(())
    }
}
