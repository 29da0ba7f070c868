use crate::api::AuditLogApi;
use crate::domain::audit_log::AuditLog;
use crate::domain::permission::PermissionNode;
use crate::domain::user::User;
use crate::dto::api::{PageData, PageQuery};
use crate::services::{ServiceResult, ensure_permission};

pub async fn list_audit_logs<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<AuditLog>>
where
    A: AuditLogApi + ?Sized,
{
    ensure_permission(user, PermissionNode::AuditLogShow)?;
    Ok(api.list_audit_logs(page).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::domain::permission::Permission;
    use crate::domain::user::fixtures;
    use crate::services::ServiceError;

    /// Ensures audit logs stay hidden without AuditLogShow.
    #[tokio::test]
    async fn audit_logs_require_permission() {
        let mut api = MockApi::new();
        api.expect_list_audit_logs().times(0);
        let user = fixtures::user(1, Permission::new(PermissionNode::AdminEntry.bit()));

        let result = list_audit_logs(&api, Some(&user), PageQuery::new(0, 20)).await;

        assert!(matches!(
            result,
            Err(ServiceError::Forbidden(PermissionNode::AuditLogShow))
        ));
    }

    /// Confirms the requested page is forwarded.
    #[tokio::test]
    async fn audit_logs_forward_page() {
        let mut api = MockApi::new();
        api.expect_list_audit_logs()
            .withf(|page| *page == PageQuery::new(2, 50))
            .times(1)
            .returning(|page| {
                Ok(PageData {
                    items: Vec::new(),
                    total: 0,
                    page: page.page,
                    page_size: page.page_size,
                })
            });
        let user = fixtures::user(1, Permission::new(PermissionNode::AuditLogShow.bit()));

        let page = list_audit_logs(&api, Some(&user), PageQuery::new(2, 50))
            .await
            .unwrap();

        assert_eq!(page.page, 2);
        assert!(page.items.is_empty());
    }
}
