use async_trait::async_trait;

use crate::api::errors::ApiResult;
use crate::api::{AuditLogApi, HttpApi};
use crate::domain::audit_log::AuditLog;
use crate::dto::api::{PageData, PageQuery};

#[async_trait]
impl AuditLogApi for HttpApi {
    async fn list_audit_logs(&self, page: PageQuery) -> ApiResult<PageData<AuditLog>> {
        self.page("/audits", page).await
    }
}
