#![warn(clippy::all)]
pub(crate) mod decode;
pub(crate) mod error;
pub(crate) mod invert;
pub(crate) mod paginator;
pub(crate) mod policy;
pub(crate) mod principal;
pub(crate) mod resolver;
pub(crate) mod role;
pub(crate) mod scan;
pub(crate) mod statement;

#[macro_use]
pub(crate) mod serutil;

pub use {
    decode::{decode_role_trust, unescape},
    error::VeilError,
    invert::{invert, render_json, PrincipalRoleMap},
    paginator::{enumerate_roles, ListRolesApi, PageError, RolePager, RolePaginator},
    policy::{TrustPolicy, TrustPolicyBuilder, TrustPolicyBuilderError},
    principal::{PrincipalSet, PrincipalSetBuilder, PrincipalSetBuilderError},
    resolver::{RoleTrustMap, TrustResolver},
    role::{
        ListRolesInput, ListRolesInputBuilder, ListRolesInputBuilderError, ListRolesOutput, ListRolesOutputBuilder,
        ListRolesOutputBuilderError, Role, RoleBuilder, RoleBuilderError,
    },
    scan::{ScanConfig, ScanConfigBuilder, ScanConfigBuilderError, Scanner},
    serutil::{MapList, StringList},
    statement::{Statement, StatementBuilder, StatementBuilderError, StatementList},
};
