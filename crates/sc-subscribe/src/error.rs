//! Build error taxonomy.
//!
//! Every variant is terminal for the current build: nothing is retried and
//! there is no partial document on failure.

use thiserror::Error;

/// Why a single share link could not be turned into a proxy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("unsupported scheme in {0:?}")]
    UnknownScheme(String),
    #[error("invalid base64 payload")]
    Base64,
    #[error("invalid payload: {0}")]
    Payload(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid port: {0:?}")]
    Port(String),
}

#[derive(Debug, Error)]
pub enum BuildError {
    /// The loader could not produce bytes for a named source.
    #[error("load {source_id}: {cause}")]
    Load { source_id: String, cause: String },

    /// Bytes for a named source matched no descriptor grammar.
    #[error("parse {source_id}: {cause}")]
    Parse { source_id: String, cause: String },

    /// A user-supplied regex or rule line is malformed.
    #[error("invalid {field} {pattern:?}: {cause}")]
    Pattern {
        field: &'static str,
        pattern: String,
        cause: String,
    },

    /// The template document is not a valid Clash document.
    #[error("parse template: {0}")]
    Template(#[from] serde_yaml::Error),

    /// The options object is inconsistent.
    #[error("invalid options: {0}")]
    Options(String),
}

impl BuildError {
    pub fn load(source_id: impl Into<String>, cause: impl ToString) -> Self {
        Self::Load {
            source_id: source_id.into(),
            cause: cause.to_string(),
        }
    }

    pub fn parse(source_id: impl Into<String>, cause: impl ToString) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            cause: cause.to_string(),
        }
    }

    pub fn pattern(field: &'static str, pattern: impl Into<String>, cause: impl ToString) -> Self {
        Self::Pattern {
            field,
            pattern: pattern.into(),
            cause: cause.to_string(),
        }
    }

    /// Short class label used in logs and CLI exit reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Parse { .. } => "parse",
            Self::Pattern { .. } => "pattern",
            Self::Template(_) => "template",
            Self::Options(_) => "options",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = BuildError::parse("https://x/y#A", LinkError::Base64);
        assert_eq!(e.to_string(), "parse https://x/y#A: invalid base64 payload");
        assert_eq!(e.kind(), "parse");

        let e = BuildError::pattern("remove", "(", "unclosed group");
        assert!(e.to_string().contains("remove"));
        assert!(e.to_string().contains("\"(\""));
    }
}
