use derive_builder::Builder;

/// A role as returned by the IAM `ListRoles` API; only the fields needed to audit its trust policy.
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
pub struct Role {
    /// The role ARN. Unique within a scan.
    #[builder(setter(into))]
    arn: String,

    /// The trust policy, percent-encoded as IAM returns it.
    #[builder(setter(into))]
    assume_role_policy_document: String,
}

impl Role {
    #[inline]
    pub fn builder() -> RoleBuilder {
        RoleBuilder::default()
    }

    #[inline]
    pub fn arn(&self) -> &str {
        &self.arn
    }

    #[inline]
    pub fn assume_role_policy_document(&self) -> &str {
        &self.assume_role_policy_document
    }
}

/// Parameters for one `ListRoles` request.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
#[builder(default)]
pub struct ListRolesInput {
    /// Pagination marker from the previous response's `Marker`.
    #[builder(setter(into, strip_option))]
    marker: Option<String>,

    /// Upper bound on the number of roles returned per page.
    #[builder(setter(strip_option))]
    max_items: Option<i32>,

    /// Only return roles whose path starts with this prefix.
    #[builder(setter(into, strip_option))]
    path_prefix: Option<String>,
}

impl ListRolesInput {
    #[inline]
    pub fn builder() -> ListRolesInputBuilder {
        ListRolesInputBuilder::default()
    }

    #[inline]
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    #[inline]
    pub fn max_items(&self) -> Option<i32> {
        self.max_items
    }

    #[inline]
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    pub(crate) fn new(path_prefix: Option<String>, max_items: Option<i32>) -> Self {
        Self {
            marker: None,
            max_items,
            path_prefix,
        }
    }

    pub(crate) fn with_marker(mut self, marker: Option<String>) -> Self {
        self.marker = marker;
        self
    }
}

/// One page of `ListRoles` results.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
#[builder(default)]
pub struct ListRolesOutput {
    roles: Vec<Role>,

    /// Whether more roles are available after this page.
    is_truncated: bool,

    /// The marker to send with the next request when `is_truncated` is set.
    #[builder(setter(into, strip_option))]
    marker: Option<String>,
}

impl ListRolesOutput {
    #[inline]
    pub fn builder() -> ListRolesOutputBuilder {
        ListRolesOutputBuilder::default()
    }

    #[inline]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.is_truncated
    }

    #[inline]
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Vec<Role>, bool, Option<String>) {
        (self.roles, self.is_truncated, self.marker)
    }
}
