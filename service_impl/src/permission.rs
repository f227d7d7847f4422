use std::sync::Arc;

use async_trait::async_trait;
use service::permission::{Authentication, PermissionService};
use service::ServiceError;

/// Grants every privilege and reports a fixed user id.
///
/// Used to run the engine locally without a login service; the real
/// authentication system implements [`PermissionService`] at the boundary.
pub struct PermissionServiceDev {
    user: Arc<str>,
}
impl PermissionServiceDev {
    pub fn new(user: impl Into<Arc<str>>) -> Self {
        Self { user: user.into() }
    }
}

#[async_trait]
impl PermissionService for PermissionServiceDev {
    type Context = ();

    async fn check_permission(
        &self,
        _privilege: &str,
        _context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn current_user_id(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Option<Arc<str>>, ServiceError> {
        Ok(match context {
            Authentication::Full => None,
            Authentication::Context(()) => Some(self.user.clone()),
        })
    }
}
