use std::fmt;

/// A single `docker build --build-arg` flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildArgument {
    /// Value embedded in the build specification at synthesis time
    Literal { key: String, value: String },
    /// Value read from the same-named shell variable at build time
    SecretReference { key: String },
}

impl BuildArgument {
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Literal {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn secret_reference(key: impl Into<String>) -> Self {
        Self::SecretReference { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Literal { key, .. } | Self::SecretReference { key } => key,
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::SecretReference { .. })
    }
}

impl fmt::Display for BuildArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { key, value } => write!(f, "--build-arg={}=\"{}\"", key, value),
            Self::SecretReference { key } => write!(f, "--build-arg={}=\"${}\"", key, key),
        }
    }
}
