use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// `UserSecurityContext` carries the identity and attributes a data access
/// policy is evaluated against.
///
/// Built per request from authenticated claims and immutable for the rest of
/// the request. Role order is irrelevant and duplicate role names collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSecurityContext {
    /// Authenticated user id, bound to `@userId` in row filters.
    user_id: String,
    /// Tenant (company) code the user operates in.
    company_code: String,
    /// Role names granted to the user.
    #[serde(default)]
    roles: BTreeSet<String>,
    /// Department code, bound to `@userDept`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dept_code: Option<String>,
    /// Region code, bound to `@userRegion`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region_code: Option<String>,
    /// Departments the user may see, bound to `@accessibleDepts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accessible_depts: Option<Vec<String>>,
    /// Customers the user may see, bound to `@accessibleCustomers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accessible_customers: Option<Vec<String>>,
    /// Sales reps whose records the user may see. Carried for callers;
    /// not addressable from row filter templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accessible_sales_reps: Option<Vec<String>>,
    /// Administrative bypass: when set, every table is fully visible.
    #[serde(default)]
    is_admin: bool,
}

impl UserSecurityContext {
    /// Create a new `UserSecurityContext` builder
    #[must_use]
    pub fn builder() -> UserSecurityContextBuilder {
        UserSecurityContextBuilder::default()
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn company_code(&self) -> &str {
        &self.company_code
    }

    /// Role names in ascending order, without duplicates.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn dept_code(&self) -> Option<&str> {
        self.dept_code.as_deref()
    }

    #[must_use]
    pub fn region_code(&self) -> Option<&str> {
        self.region_code.as_deref()
    }

    #[must_use]
    pub fn accessible_depts(&self) -> Option<&[String]> {
        self.accessible_depts.as_deref()
    }

    #[must_use]
    pub fn accessible_customers(&self) -> Option<&[String]> {
        self.accessible_customers.as_deref()
    }

    #[must_use]
    pub fn accessible_sales_reps(&self) -> Option<&[String]> {
        self.accessible_sales_reps.as_deref()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[derive(Default)]
pub struct UserSecurityContextBuilder {
    user_id: String,
    company_code: String,
    roles: BTreeSet<String>,
    dept_code: Option<String>,
    region_code: Option<String>,
    accessible_depts: Option<Vec<String>>,
    accessible_customers: Option<Vec<String>>,
    accessible_sales_reps: Option<Vec<String>>,
    is_admin: bool,
}

impl UserSecurityContextBuilder {
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    #[must_use]
    pub fn company_code(mut self, company_code: impl Into<String>) -> Self {
        self.company_code = company_code.into();
        self
    }

    /// Add a single role. Adding the same role twice has no effect.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn dept_code(mut self, dept_code: impl Into<String>) -> Self {
        self.dept_code = Some(dept_code.into());
        self
    }

    #[must_use]
    pub fn region_code(mut self, region_code: impl Into<String>) -> Self {
        self.region_code = Some(region_code.into());
        self
    }

    #[must_use]
    pub fn accessible_depts<I, S>(mut self, depts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessible_depts = Some(depts.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn accessible_customers<I, S>(mut self, customers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessible_customers = Some(customers.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn accessible_sales_reps<I, S>(mut self, reps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessible_sales_reps = Some(reps.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    #[must_use]
    pub fn build(self) -> UserSecurityContext {
        UserSecurityContext {
            user_id: self.user_id,
            company_code: self.company_code,
            roles: self.roles,
            dept_code: self.dept_code,
            region_code: self.region_code,
            accessible_depts: self.accessible_depts,
            accessible_customers: self.accessible_customers,
            accessible_sales_reps: self.accessible_sales_reps,
            is_admin: self.is_admin,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_builder_full() {
        let ctx = UserSecurityContext::builder()
            .user_id("u1")
            .company_code("C001")
            .roles(["dept_manager", "regional_manager"])
            .dept_code("D1")
            .region_code("R2")
            .accessible_depts(["D1", "D2"])
            .accessible_customers(["CUST-1"])
            .accessible_sales_reps(["u2", "u3"])
            .build();

        assert_eq!(ctx.user_id(), "u1");
        assert_eq!(ctx.company_code(), "C001");
        assert!(ctx.has_role("dept_manager"));
        assert!(ctx.has_role("regional_manager"));
        assert_eq!(ctx.dept_code(), Some("D1"));
        assert_eq!(ctx.region_code(), Some("R2"));
        assert_eq!(ctx.accessible_depts(), Some(&["D1".to_owned(), "D2".to_owned()][..]));
        assert_eq!(ctx.accessible_customers().map(<[String]>::len), Some(1));
        assert_eq!(ctx.accessible_sales_reps().map(<[String]>::len), Some(2));
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_builder_minimal() {
        let ctx = UserSecurityContext::builder().build();

        assert_eq!(ctx.user_id(), "");
        assert!(ctx.roles().is_empty());
        assert!(ctx.dept_code().is_none());
        assert!(ctx.region_code().is_none());
        assert!(ctx.accessible_depts().is_none());
        assert!(ctx.accessible_customers().is_none());
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_duplicate_roles_collapse() {
        let ctx = UserSecurityContext::builder()
            .role("sales_rep")
            .roles(["sales_rep", "report_viewer"])
            .role("sales_rep")
            .build();

        assert_eq!(ctx.roles().len(), 2);
        let roles: Vec<&str> = ctx.roles().iter().map(String::as_str).collect();
        assert_eq!(roles, ["report_viewer", "sales_rep"]);
    }

    #[test]
    fn test_empty_accessible_list_is_present() {
        let ctx = UserSecurityContext::builder()
            .accessible_depts(Vec::<String>::new())
            .build();

        assert_eq!(ctx.accessible_depts(), Some(&[][..]));
    }

    #[test]
    fn test_serialize_deserialize() {
        let original = UserSecurityContext::builder()
            .user_id("u1")
            .company_code("C001")
            .role("sales_rep")
            .dept_code("O'Brien")
            .admin(true)
            .build();

        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: UserSecurityContext = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized, original);
        assert!(!serialized.contains("region_code"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let ctx: UserSecurityContext =
            serde_json::from_str(r#"{"user_id":"u9","company_code":"C1"}"#).unwrap();

        assert_eq!(ctx.user_id(), "u9");
        assert!(ctx.roles().is_empty());
        assert!(!ctx.is_admin());
    }
}
