use {
    crate::{Role, TrustPolicy, VeilError},
    lazy_static::lazy_static,
    log::debug,
    regex::Regex,
};

lazy_static! {
    /// A `%` that is not followed by two hex digits.
    static ref INVALID_ESCAPE: Regex =
        Regex::new(r"%(?:[^0-9A-Fa-f]|[0-9A-Fa-f][^0-9A-Fa-f]|[0-9A-Fa-f]?$)").unwrap();
}

/// Undo the query-style percent encoding IAM applies to policy documents.
///
/// `+` decodes to a space and `%XX` to the byte `0xXX`. A malformed escape is an error; decoded bytes that are not
/// valid UTF-8 are replaced with U+FFFD.
pub fn unescape(raw: &str) -> Result<String, VeilError> {
    if let Some(m) = INVALID_ESCAPE.find(raw) {
        let escape: String = raw[m.start()..].chars().take(3).collect();
        return Err(VeilError::InvalidEscape(escape));
    }

    let decoded = urlencoding::decode_binary(raw.replace('+', " ").as_bytes()).into_owned();
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

impl TrustPolicy {
    /// Decode a percent-encoded trust policy document.
    pub fn from_encoded(raw: &str) -> Result<Self, VeilError> {
        let data = unescape(raw)?;
        serde_json::from_str(&data).map_err(|e| VeilError::InvalidTrustPolicy(e.to_string()))
    }
}

/// Decode the trust policy of a role. Failures carry the role's ARN.
pub fn decode_role_trust(role: &Role) -> Result<TrustPolicy, VeilError> {
    debug!("Decoding trust policy: role={}", role.arn());

    TrustPolicy::from_encoded(role.assume_role_policy_document()).map_err(|e| VeilError::RoleTrust {
        role_arn: role.arn().to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use {
        super::unescape,
        crate::{decode_role_trust, Role, TrustPolicy, VeilError},
        pretty_assertions::assert_eq,
    };

    const SSO_ROLE_ARN: &str = "arn:aws:iam::0123456789:role/aws-reserved/sso.amazonaws.com/AWSReservedSSO_FullAdmin";
    const SSO_TRUST_POLICY: &str = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%5B%7B%22Effect%22%3A%22Allow%22%2C%22Principal%22%3A%7B%22Federated%22%3A%5B%22arn%3Aaws%3Aiam%3A%3A0123456789%3Asaml-provider%2FAWSSSO_42_DO_NOT_DELETE%22%2C%22arn%3Aaws%3Aiam%3A%3A0123456789%3Asaml-provider%2FAWSSSO_24_DO_NOT_DELETE%22%5D%7D%2C%22Action%22%3A%5B%22sts%3AAssumeRoleWithSAML%22%2C%22sts%3ATagSession%22%5D%2C%22Condition%22%3A%7B%22StringEquals%22%3A%7B%22SAML%3Aaud%22%3A%22https%3A%2F%2Fsignin.aws.amazon.com%2Fsaml%22%7D%7D%7D%5D%7D";

    #[test_log::test]
    fn test_unescape() {
        assert_eq!(unescape("%7B%7D").unwrap(), "{}");
        assert_eq!(unescape("{}").unwrap(), "{}");
        assert_eq!(unescape("a+b%2Bc").unwrap(), "a b+c");
        assert_eq!(unescape("%e2%9c%93").unwrap(), "\u{2713}");
        assert_eq!(unescape("").unwrap(), "");
    }

    #[test_log::test]
    fn test_unescape_invalid() {
        assert_eq!(unescape("%zz").unwrap_err(), VeilError::InvalidEscape("%zz".to_string()));
        assert_eq!(unescape("abc%4").unwrap_err(), VeilError::InvalidEscape("%4".to_string()));
        assert_eq!(unescape("abc%").unwrap_err(), VeilError::InvalidEscape("%".to_string()));
        assert_eq!(unescape("%4g%41").unwrap_err(), VeilError::InvalidEscape("%4g".to_string()));
        assert_eq!(unescape("%%41").unwrap_err(), VeilError::InvalidEscape("%%4".to_string()));

        assert_eq!(unescape("%ff%fe").unwrap(), "\u{fffd}\u{fffd}");
    }

    #[test_log::test]
    fn test_from_encoded() {
        let policy = TrustPolicy::from_encoded("%7B%7D").unwrap();
        assert_eq!(policy, TrustPolicy::default());

        let policy = TrustPolicy::from_encoded(SSO_TRUST_POLICY).unwrap();
        assert_eq!(policy.version(), "2012-10-17");
        assert_eq!(policy.statement()[0].effect(), "Allow");
        assert_eq!(policy.statement()[0].action().unwrap().to_vec(), vec!["sts:AssumeRoleWithSAML", "sts:TagSession"]);
        assert_eq!(
            policy.principals(),
            vec![
                "arn:aws:iam::0123456789:saml-provider/AWSSSO_24_DO_NOT_DELETE",
                "arn:aws:iam::0123456789:saml-provider/AWSSSO_42_DO_NOT_DELETE",
            ]
        );
    }

    #[test_log::test]
    fn test_from_encoded_invalid() {
        let e = TrustPolicy::from_encoded("invalid policy").unwrap_err();
        assert!(matches!(e, VeilError::InvalidTrustPolicy(_)));

        let e = TrustPolicy::from_encoded("").unwrap_err();
        assert_eq!(e, VeilError::InvalidTrustPolicy("EOF while parsing a value at line 1 column 0".to_string()));

        let e = TrustPolicy::from_encoded("%7B%22Statement%22%3A42%7D").unwrap_err();
        assert!(e.to_string().starts_with("Invalid trust policy: invalid type: integer `42`"));

        let e = TrustPolicy::from_encoded("%7B%zz").unwrap_err();
        assert_eq!(e, VeilError::InvalidEscape("%zz".to_string()));
    }

    #[test_log::test]
    fn test_from_encoded_non_utf8() {
        let policy = TrustPolicy::from_encoded("%7B%22Version%22%3A%22%ff%22%7D").unwrap();
        assert_eq!(policy.version(), "\u{fffd}");
    }

    #[test_log::test]
    fn test_decode_role_trust() {
        let role = Role::builder().arn(SSO_ROLE_ARN).assume_role_policy_document(SSO_TRUST_POLICY).build().unwrap();
        let policy = decode_role_trust(&role).unwrap();
        assert_eq!(policy.principals().len(), 2);

        let role =
            Role::builder().arn("arn:aws:iam::123456789012:role/test").assume_role_policy_document("%").build().unwrap();
        let e = decode_role_trust(&role).unwrap_err();
        assert!(e.is_decode());
        assert_eq!(e.role_arn(), Some("arn:aws:iam::123456789012:role/test"));
        assert_eq!(
            e.to_string(),
            "Failed to decode trust policy for role arn:aws:iam::123456789012:role/test: Invalid URL escape: %"
        );
    }
}
