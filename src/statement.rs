use {
    crate::{
        display_json, from_str_json,
        serutil::{MapList, StringList},
        PrincipalSet,
    },
    derive_builder::Builder,
    log::debug,
    serde::{
        de::{Deserializer, IgnoredAny, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

/// One entry of a trust policy.
///
/// Only the parts needed to find the principals are kept. `Sid`, `Condition`, `NotPrincipal` and friends are
/// accepted and discarded; effects are kept verbatim and never interpreted.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[builder(default)]
pub struct Statement {
    #[builder(setter(into))]
    #[serde(rename = "Effect")]
    effect: String,

    #[serde(rename = "Principal")]
    principal: PrincipalSet,

    #[builder(setter(into, strip_option))]
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    action: Option<StringList>,
}

impl Statement {
    #[inline]
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    #[inline]
    pub fn effect(&self) -> &str {
        &self.effect
    }

    #[inline]
    pub fn principal(&self) -> &PrincipalSet {
        &self.principal
    }

    #[inline]
    pub fn action(&self) -> Option<&StringList> {
        self.action.as_ref()
    }
}

display_json!(Statement);
from_str_json!(Statement);

struct StatementVisitor {}

impl<'de> Visitor<'de> for StatementVisitor {
    type Value = Statement;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "statement")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Statement, A::Error> {
        let mut result = Statement::default();

        // Keys match without regard to ASCII case and a repeated key replaces the earlier value. A null `Effect` or
        // `Principal` leaves the field as it was; a null `Action` clears it.
        while let Some(key) = access.next_key::<String>()? {
            match key.to_ascii_lowercase().as_str() {
                "effect" => {
                    if let Some(effect) = access.next_value::<Option<String>>()? {
                        result.effect = effect;
                    }
                }
                "principal" => {
                    if let Some(principal) = access.next_value::<Option<PrincipalSet>>()? {
                        result.principal = principal;
                    }
                }
                "action" => result.action = access.next_value::<Option<StringList>>()?,
                _ => {
                    debug!("Ignoring statement element: {}", key);
                    access.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(result)
    }
}

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatementVisitor {})
    }
}

pub type StatementList = MapList<Statement>;
