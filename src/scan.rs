use {
    crate::{
        enumerate_roles, invert, render_json, ListRolesApi, ListRolesInput, PrincipalRoleMap, RolePaginator,
        TrustResolver, VeilError,
    },
    derive_builder::Builder,
    log::debug,
    std::time::Duration,
    tokio_util::sync::CancellationToken,
};

/// Options for a trust relationship scan.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
#[builder(default)]
pub struct ScanConfig {
    /// Only audit roles whose path starts with this prefix.
    #[builder(setter(into, strip_option))]
    path_prefix: Option<String>,

    /// Page size requested from `ListRoles`.
    #[builder(setter(strip_option))]
    max_items: Option<i32>,

    /// Abandon the scan after this long. Expiry is reported as [`VeilError::Cancelled`].
    #[builder(setter(strip_option))]
    timeout: Option<Duration>,
}

impl ScanConfig {
    #[inline]
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    #[inline]
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    #[inline]
    pub fn max_items(&self) -> Option<i32> {
        self.max_items
    }

    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn list_roles_input(&self) -> ListRolesInput {
        ListRolesInput::new(self.path_prefix.clone(), self.max_items)
    }
}

/// Audits every role visible to an IAM client and reports which roles each principal may assume.
pub struct Scanner<C> {
    client: C,
    config: ScanConfig,
}

impl<C: ListRolesApi> Scanner<C> {
    pub fn new(client: C, config: ScanConfig) -> Self {
        Self {
            client,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// List all roles, resolve their trust policies and invert the result.
    pub async fn scan(&self, cancel: &CancellationToken) -> Result<PrincipalRoleMap, VeilError> {
        let cancel = cancel.child_token();
        let timer = self.config.timeout.map(|timeout| {
            let expired = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                debug!("Scan timed out after {:?}", timeout);
                expired.cancel();
            })
        });

        let result = self.run(&cancel).await;

        if let Some(timer) = timer {
            timer.abort();
        }

        result
    }

    /// Like [`Scanner::scan`], rendering the result as JSON.
    pub async fn scan_json(&self, cancel: &CancellationToken) -> Result<String, VeilError> {
        render_json(&self.scan(cancel).await?)
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<PrincipalRoleMap, VeilError> {
        let mut pager = RolePaginator::new(&self.client, self.config.list_roles_input());
        let roles = enumerate_roles(&mut pager, cancel).await?;
        let role_trust = TrustResolver::resolve(roles, cancel).await?;
        let principals = invert(&role_trust);

        debug!("Found IAM roles and principals: roles={} principals={}", role_trust.len(), principals.len());
        Ok(principals)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{ScanConfig, Scanner},
        crate::{
            paginator::tests::{role, MockIam},
            ListRolesInput, VeilError,
        },
        indoc::indoc,
        pretty_assertions::assert_eq,
        std::time::Duration,
        tokio_util::sync::CancellationToken,
    };

    const SSO_TRUST_POLICY: &str = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%5B%7B%22Effect%22%3A%22Allow%22%2C%22Principal%22%3A%7B%22Federated%22%3A%5B%22arn%3Aaws%3Aiam%3A%3A0123456789%3Asaml-provider%2FAWSSSO_42_DO_NOT_DELETE%22%2C%22arn%3Aaws%3Aiam%3A%3A0123456789%3Asaml-provider%2FAWSSSO_24_DO_NOT_DELETE%22%5D%7D%2C%22Action%22%3A%5B%22sts%3AAssumeRoleWithSAML%22%2C%22sts%3ATagSession%22%5D%7D%5D%7D";
    const LAMBDA_TRUST_POLICY: &str = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%7B%22Effect%22%3A%22Allow%22%2C%22Principal%22%3A%7B%22Service%22%3A%22lambda.amazonaws.com%22%7D%2C%22Action%22%3A%22sts%3AAssumeRole%22%7D%7D";

    #[test_log::test(tokio::test)]
    async fn test_scan_json() {
        let client = MockIam::new(vec![
            vec![role("sso-admin", SSO_TRUST_POLICY), role("empty", "%7B%7D")],
            vec![role("lambda-exec", LAMBDA_TRUST_POLICY)],
        ]);
        let scanner = Scanner::new(client, ScanConfig::default());

        let output = scanner.scan_json(&CancellationToken::new()).await.unwrap();
        assert_eq!(
            output,
            indoc! { r#"
            {
              "arn:aws:iam::0123456789:saml-provider/AWSSSO_24_DO_NOT_DELETE": [
                "arn:aws:iam::123456789012:role/sso-admin"
              ],
              "arn:aws:iam::0123456789:saml-provider/AWSSSO_42_DO_NOT_DELETE": [
                "arn:aws:iam::123456789012:role/sso-admin"
              ],
              "lambda.amazonaws.com": [
                "arn:aws:iam::123456789012:role/lambda-exec"
              ]
            }"#}
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_shared_principal() {
        let client =
            MockIam::new(vec![vec![role("R1", LAMBDA_TRUST_POLICY)], vec![role("R2", LAMBDA_TRUST_POLICY)]]);
        let scanner = Scanner::new(client, ScanConfig::default());

        let output = scanner.scan(&CancellationToken::new()).await.unwrap();
        let mut roles = output["lambda.amazonaws.com"].clone();
        roles.sort();
        assert_eq!(roles, vec!["arn:aws:iam::123456789012:role/R1", "arn:aws:iam::123456789012:role/R2"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_no_roles() {
        let scanner = Scanner::new(MockIam::new(vec![]), ScanConfig::default());
        assert_eq!(scanner.scan_json(&CancellationToken::new()).await.unwrap(), "{}");
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_passes_config() {
        let config = ScanConfig::builder().path_prefix("/service-role/").max_items(10).build().unwrap();
        let scanner = Scanner::new(MockIam::new(vec![vec![role("a", "%7B%7D")]]), config);
        assert_eq!(scanner.config().path_prefix(), Some("/service-role/"));
        assert_eq!(scanner.config().timeout(), None);

        scanner.scan(&CancellationToken::new()).await.unwrap();
        let requests = scanner.client.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path_prefix(), Some("/service-role/"));
        assert_eq!(requests[0].max_items(), Some(10));
    }

    #[test_log::test]
    fn test_list_roles_input() {
        let input = ScanConfig::builder().path_prefix("/app/").max_items(25).build().unwrap().list_roles_input();
        assert_eq!(input.path_prefix(), Some("/app/"));
        assert_eq!(input.max_items(), Some(25));
        assert_eq!(input.marker(), None);

        assert_eq!(ScanConfig::default().list_roles_input(), ListRolesInput::default());
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_failures() {
        let mut client = MockIam::new(vec![vec![role("a", "%7B%7D")]]);
        client.fail_page = Some(0);
        let e = Scanner::new(client, ScanConfig::default()).scan(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(e, VeilError::Enumeration("test error".to_string()));

        let client = MockIam::new(vec![vec![role("bad", "invalid policy"), role("a", "%7B%7D")]]);
        let e = Scanner::new(client, ScanConfig::default()).scan_json(&CancellationToken::new()).await.unwrap_err();
        assert!(e.is_decode());
        assert_eq!(e.role_arn(), Some("arn:aws:iam::123456789012:role/bad"));
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let scanner = Scanner::new(MockIam::new(vec![vec![role("bad", "invalid policy")]]), ScanConfig::default());
        assert_eq!(scanner.scan(&cancel).await.unwrap_err(), VeilError::Cancelled);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_scan_timeout() {
        let mut client = MockIam::new(vec![vec![role("a", "%7B%7D")]]);
        client.delay = Some(Duration::from_secs(60));
        let config = ScanConfig::builder().timeout(Duration::from_secs(5)).build().unwrap();
        let scanner = Scanner::new(client, config);

        let cancel = CancellationToken::new();
        assert_eq!(scanner.scan(&cancel).await.unwrap_err(), VeilError::Cancelled);
        assert!(!cancel.is_cancelled());
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_scan_within_timeout() {
        let mut client = MockIam::new(vec![vec![role("lambda-exec", LAMBDA_TRUST_POLICY)]]);
        client.delay = Some(Duration::from_secs(1));
        let config = ScanConfig::builder().timeout(Duration::from_secs(5)).build().unwrap();
        let scanner = Scanner::new(client, config);

        let output = scanner.scan(&CancellationToken::new()).await.unwrap();
        assert_eq!(output.len(), 1);
    }
}
