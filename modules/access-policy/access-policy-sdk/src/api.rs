//! Public API trait for the access policy engine.

use access_security::UserSecurityContext;

use crate::models::TableAccessRule;

/// Public API trait consumed by query builders.
///
/// Every operation is a pure, synchronous computation over an immutable
/// policy registry and the caller's context; implementations are safe to
/// share across request workers without locking:
///
/// ```ignore
/// let policy: Arc<dyn AccessPolicyClient> = Arc::new(AccessPolicyLocalClient::new(svc));
///
/// let rule = policy.resolve("sales_orders", &user);
/// ```
pub trait AccessPolicyClient: Send + Sync {
    /// Effective rule for `table`, or `None` when no role grants access.
    fn resolve(&self, table: &str, user: &UserSecurityContext) -> Option<TableAccessRule>;

    /// Whether `field` of `table` is visible to `user`. Denials win.
    fn is_field_allowed(&self, table: &str, field: &str, user: &UserSecurityContext) -> bool;

    /// Visible subset of `requested`, in request order. Empty without access.
    fn filter_allowed_fields(
        &self,
        table: &str,
        requested: &[String],
        user: &UserSecurityContext,
    ) -> Vec<String>;

    /// Row restriction bound to `user`, or `None` when every row is visible.
    ///
    /// The result is a boolean SQL fragment; the caller parenthesises it
    /// when embedding it in a `WHERE` clause.
    fn row_level_filter(&self, table: &str, user: &UserSecurityContext) -> Option<String>;

    /// Gate: `true` iff some role grants a rule for `table`.
    fn can_access_table(&self, table: &str, user: &UserSecurityContext) -> bool;

    /// Concrete visible columns of `table`, expanding `"*"` through the
    /// schema catalog.
    fn visible_columns(&self, table: &str, user: &UserSecurityContext) -> Vec<String>;
}
