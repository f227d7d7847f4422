use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

pub const CUSTOMER_PRIVILEGE: &str = "customer";
pub const OWNER_PRIVILEGE: &str = "owner";
pub const ADMIN_PRIVILEGE: &str = "admin";

/// Authentication context handed into every service operation.
///
/// `Full` is reserved for internal callers like the expiration sweep and
/// bypasses permission and ownership checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication<Context: Clone + PartialEq + Eq + Send + Sync + Debug + 'static> {
    Full,
    Context(Context),
}
impl<Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static> From<Context>
    for Authentication<Context>
{
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

/// Interface to the out-of-scope authentication system. The engine never
/// stores sessions or credentials, it only asks two questions.
#[automock(type Context=();)]
#[async_trait]
pub trait PermissionService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn check_permission(
        &self,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;

    /// The user id behind the context, `None` for `Authentication::Full`.
    async fn current_user_id(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Option<Arc<str>>, ServiceError>;
}
