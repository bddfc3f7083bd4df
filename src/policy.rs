use {
    crate::{display_json, from_str_json, StatementList},
    derive_builder::Builder,
    log::debug,
    serde::{
        de::{self, Deserializer, IgnoredAny, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::{
        collections::BTreeSet,
        fmt::{Formatter, Result as FmtResult},
    },
};

/// The trust policy (assume role policy document) attached to a role.
///
/// An empty document `{}` is valid and has an empty version and no statements. `Statement` may be a single map
/// instead of a list.
///
/// This does not derive Deserialize to prevent serde from allowing this to be represented as an array.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[builder(default)]
pub struct TrustPolicy {
    /// The policy language version, usually `2012-10-17`. Not validated.
    #[builder(setter(into))]
    #[serde(rename = "Version")]
    version: String,

    #[builder(setter(into))]
    #[serde(rename = "Statement")]
    statement: StatementList,
}

impl TrustPolicy {
    #[inline]
    pub fn builder() -> TrustPolicyBuilder {
        TrustPolicyBuilder::default()
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn statement(&self) -> &StatementList {
        &self.statement
    }

    /// Every principal identifier named by any statement, deduplicated across statements and categories and sorted
    /// in byte order. Always returns a list, even when no principals are named.
    pub fn principals(&self) -> Vec<String> {
        let mut seen = 0;
        let mut unique = BTreeSet::new();

        for statement in self.statement.iter() {
            for principal in statement.principal().iter() {
                seen += 1;
                unique.insert(principal.clone());
            }
        }

        debug!("Aggregated principals: input={} output={}", seen, unique.len());
        unique.into_iter().collect()
    }
}

display_json!(TrustPolicy);
from_str_json!(TrustPolicy);

impl<'de> Visitor<'de> for TrustPolicyBuilder {
    type Value = TrustPolicy;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("trust policy")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TrustPolicy::default())
    }

    fn visit_map<A: MapAccess<'de>>(mut self, mut access: A) -> Result<Self::Value, A::Error> {
        let builder = &mut self;

        // Keys match without regard to ASCII case and a repeated key replaces the earlier value. A null `Version`
        // leaves it as it was; a null `Statement` clears the statements.
        while let Some(key) = access.next_key::<String>()? {
            match key.to_ascii_lowercase().as_str() {
                "version" => {
                    if let Some(version) = access.next_value::<Option<String>>()? {
                        builder.version(version);
                    }
                }
                "statement" => {
                    builder.statement(access.next_value::<Option<StatementList>>()?.unwrap_or_default());
                }
                _ => {
                    debug!("Ignoring trust policy element: {}", key);
                    access.next_value::<IgnoredAny>()?;
                }
            }
        }

        self.build().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for TrustPolicy {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<TrustPolicy, D::Error> {
        d.deserialize_any(TrustPolicyBuilder::default())
    }
}
