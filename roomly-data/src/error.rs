/// Errors raised while turning a raw backend payload into a domain shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The payload shape does not fit the requested one (e.g. object where a list was expected).
    Shape(String),
    /// A `{s, e, d}` decimal object is malformed.
    Decimal(String),
    /// Typed deserialization of the unwrapped payload failed.
    Deserialize(String),
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::Shape(msg) => write!(f, "Unexpected payload shape: {msg}"),
            NormalizeError::Decimal(msg) => write!(f, "Invalid decimal: {msg}"),
            NormalizeError::Deserialize(msg) => write!(f, "Deserialization failed: {msg}"),
        }
    }
}

impl std::error::Error for NormalizeError {}

impl From<NormalizeError> for roomly_core::ApiError {
    fn from(err: NormalizeError) -> Self {
        roomly_core::ApiError::Decode(err.to_string())
    }
}
