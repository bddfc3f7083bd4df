use {
    crate::{display_json, serutil::StringList},
    derive_builder::Builder,
    serde::{
        de::{self, Deserializer, IgnoredAny, MapAccess, Unexpected, Visitor},
        Deserialize, Serialize,
    },
    std::{
        collections::BTreeSet,
        fmt::{Formatter, Result as FmtResult},
    },
};

/// The principals named by a single trust policy statement, grouped by category.
///
/// A statement may use the bare string `"*"` instead of a map; this is held as the anonymous category containing
/// `*`.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[builder(default)]
pub struct PrincipalSet {
    #[builder(setter(into, strip_option))]
    #[serde(rename = "Service", skip_serializing_if = "Option::is_none")]
    service: Option<StringList>,

    #[builder(setter(into, strip_option))]
    #[serde(rename = "AWS", skip_serializing_if = "Option::is_none")]
    aws: Option<StringList>,

    #[builder(setter(into, strip_option))]
    #[serde(rename = "Federated", skip_serializing_if = "Option::is_none")]
    federated: Option<StringList>,

    #[builder(setter(into, strip_option))]
    #[serde(rename = "CanonicalUser", skip_serializing_if = "Option::is_none")]
    canonical_user: Option<StringList>,

    #[builder(setter(into, strip_option))]
    #[serde(rename = "*", skip_serializing_if = "Option::is_none")]
    anonymous: Option<StringList>,
}

display_json!(PrincipalSet);

impl PrincipalSet {
    #[inline]
    pub fn builder() -> PrincipalSetBuilder {
        PrincipalSetBuilder::default()
    }

    #[inline]
    pub fn service(&self) -> Option<&StringList> {
        self.service.as_ref()
    }

    #[inline]
    pub fn aws(&self) -> Option<&StringList> {
        self.aws.as_ref()
    }

    #[inline]
    pub fn federated(&self) -> Option<&StringList> {
        self.federated.as_ref()
    }

    #[inline]
    pub fn canonical_user(&self) -> Option<&StringList> {
        self.canonical_user.as_ref()
    }

    #[inline]
    pub fn anonymous(&self) -> Option<&StringList> {
        self.anonymous.as_ref()
    }

    /// Iterate over every principal identifier in every category, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        [&self.service, &self.aws, &self.federated, &self.canonical_user, &self.anonymous]
            .into_iter()
            .flatten()
            .flat_map(|list| list.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The sorted, deduplicated principal identifiers across all categories.
    pub fn principals(&self) -> Vec<String> {
        self.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    }
}

struct PrincipalSetVisitor {}

impl<'de> Visitor<'de> for PrincipalSetVisitor {
    type Value = PrincipalSet;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "map of principal types to values or \"*\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == "*" {
            Ok(PrincipalSet {
                anonymous: Some(StringList::from("*")),
                ..Default::default()
            })
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PrincipalSet::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = PrincipalSet::default();

        // Category names match without regard to ASCII case; a repeated category replaces the earlier value.
        while let Some(key) = access.next_key::<String>()? {
            let category = match key.to_ascii_lowercase().as_str() {
                "service" => &mut result.service,
                "aws" => &mut result.aws,
                "federated" => &mut result.federated,
                "canonicaluser" => &mut result.canonical_user,
                "*" => &mut result.anonymous,
                _ => {
                    log::debug!("Ignoring unknown principal type: {}", key);
                    access.next_value::<IgnoredAny>()?;
                    continue;
                }
            };

            *category = access.next_value::<Option<StringList>>()?;
        }

        Ok(result)
    }
}

impl<'de> Deserialize<'de> for PrincipalSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PrincipalSetVisitor {})
    }
}
