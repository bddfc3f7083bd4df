use {
    log::debug,
    serde::{
        de::{
            self,
            value::{MapAccessDeserializer, SeqAccessDeserializer},
            Deserializer, MapAccess, SeqAccess, Unexpected, Visitor,
        },
        ser::{SerializeSeq, Serializer},
        Deserialize, Serialize,
    },
    std::{
        fmt::{Debug, Formatter, Result as FmtResult},
        marker::PhantomData,
        ops::Deref,
    },
};

/// Implement Display for a given class by formatting it as pretty-printed JSON.
#[macro_export]
macro_rules! display_json {
    ($cls:ident) => {
        impl std::fmt::Display for $cls {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let buf = Vec::new();
                let serde_formatter = ::serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = ::serde_json::Serializer::with_formatter(buf, serde_formatter);
                match self.serialize(&mut ser) {
                    Ok(()) => (),
                    Err(e) => {
                        ::log::error!("Failed to serialize: {}", e);
                        return Err(::std::fmt::Error {});
                    }
                };
                match std::str::from_utf8(&ser.into_inner()) {
                    Ok(s) => write!(f, "{}", s),
                    Err(e) => {
                        ::log::error!("JSON serialization contained non-UTF-8 characters: {}", e);
                        Err(::std::fmt::Error {})
                    }
                }
            }
        }
    };
}

/// Implement FromStr for a given class by parsing it as JSON.
#[macro_export]
macro_rules! from_str_json {
    ($cls:ident) => {
        impl ::std::str::FromStr for $cls {
            type Err = ::serde_json::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match ::serde_json::from_str::<Self>(s) {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        ::log::debug!("Failed to parse: {}: {:?}", s, e);
                        Err(e)
                    }
                }
            }
        }
    };
}

/// StringList allows a JSON field to be a string or list of strings.
///
/// Whichever shape the document used, the value is held as an ordered list: a bare string becomes a one-element
/// list. An absent or `null` field is represented by the enclosing `Option` being `None`, which keeps it distinct
/// from an empty array.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StringList(Vec<String>);

impl StringList {
    /// Decode raw JSON text. Empty input and `null` yield `None`; a string or an array of strings yields the list.
    pub fn from_json(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return Ok(None);
        }

        serde_json::from_str::<Self>(trimmed).map(Some)
    }

    pub fn to_vec(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

impl Deref for StringList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for StringList {
    fn from(s: &str) -> Self {
        Self(vec![s.to_string()])
    }
}

impl From<String> for StringList {
    fn from(s: String) -> Self {
        Self(vec![s])
    }
}

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<Vec<&str>> for StringList {
    fn from(v: Vec<&str>) -> Self {
        Self(v.into_iter().map(str::to_string).collect())
    }
}

struct StringListVisitor {}

impl<'de> Visitor<'de> for StringListVisitor {
    type Value = StringList;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "string or list of strings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(StringList(vec![v.to_string()]))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(StringList(vec![v]))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        let deserializer = SeqAccessDeserializer::new(access);
        match Vec::<String>::deserialize(deserializer) {
            Ok(l) => Ok(StringList(l)),
            Err(e) => {
                debug!("Failed to deserialize string list: {:?}", e);
                Err(<A::Error as de::Error>::invalid_value(Unexpected::Seq, &self))
            }
        }
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringListVisitor {})
    }
}

/// MapList allows a JSON field to be a single element (represented as a JSON object) or a list of elements
/// (represented as a JSON array). Either way the elements are held as a list.
#[derive(Clone, Eq, PartialEq)]
pub struct MapList<E>(Vec<E>);

impl<E> MapList<E> {
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.0.iter()
    }
}

impl<E> Default for MapList<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<E> Deref for MapList<E> {
    type Target = [E];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E: Debug> Debug for MapList<E> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{:?}", self.0)
    }
}

impl<E> From<E> for MapList<E> {
    fn from(v: E) -> Self {
        Self(vec![v])
    }
}

impl<E> From<Vec<E>> for MapList<E> {
    fn from(v: Vec<E>) -> Self {
        Self(v)
    }
}

struct MapListVisitor<E> {
    phantom: PhantomData<E>,
}

impl<'de, E: Default + Deserialize<'de>> Visitor<'de> for MapListVisitor<E> {
    type Value = MapList<E>;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "map or list of maps")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        Ok(MapList(vec![E::deserialize(MapAccessDeserializer::new(access))?]))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result: Vec<E> = match access.size_hint() {
            None => Vec::new(),
            Some(size) => Vec::with_capacity(size),
        };

        // A null element is an element with every field at its default.
        while let Some(item) = access.next_element::<Option<E>>()? {
            result.push(item.unwrap_or_default());
        }
        Ok(MapList(result))
    }
}

impl<'de, E: Default + Deserialize<'de>> Deserialize<'de> for MapList<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapListVisitor {
            phantom: PhantomData,
        })
    }
}

impl<E: Serialize> Serialize for MapList<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for e in &self.0 {
            seq.serialize_element(e)?;
        }
        seq.end()
    }
}
