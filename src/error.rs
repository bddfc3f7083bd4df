use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug, Eq, PartialEq)]
pub enum VeilError {
    /// The caller's cancellation token fired (explicitly or through a scan timeout).
    Cancelled,

    /// A page of roles could not be retrieved.
    Enumeration(String),

    /// The trust policy document contained a malformed percent escape.
    InvalidEscape(String),

    /// The unescaped trust policy document was not valid JSON or violated the document shape.
    InvalidTrustPolicy(String),

    /// A trust policy failed to decode; carries the ARN of the role it belongs to.
    RoleTrust {
        role_arn: String,
        source: Box<VeilError>,
    },

    /// The principal map could not be rendered as JSON.
    Serialization(String),
}

impl VeilError {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[inline]
    pub fn is_enumeration(&self) -> bool {
        matches!(self, Self::Enumeration(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::InvalidEscape(_) | Self::InvalidTrustPolicy(_) | Self::RoleTrust { .. })
    }

    /// The ARN of the role whose trust policy failed to decode, if known.
    pub fn role_arn(&self) -> Option<&str> {
        match self {
            Self::RoleTrust {
                role_arn,
                ..
            } => Some(role_arn),
            _ => None,
        }
    }
}

impl Display for VeilError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Cancelled => f.write_str("Operation cancelled"),
            Self::Enumeration(reason) => write!(f, "Failed to list roles: {}", reason),
            Self::InvalidEscape(escape) => write!(f, "Invalid URL escape: {}", escape),
            Self::InvalidTrustPolicy(reason) => write!(f, "Invalid trust policy: {}", reason),
            Self::RoleTrust {
                role_arn,
                source,
            } => write!(f, "Failed to decode trust policy for role {}: {}", role_arn, source),
            Self::Serialization(reason) => write!(f, "Failed to serialize output: {}", reason),
        }
    }
}

impl Error for VeilError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RoleTrust {
                source,
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}
