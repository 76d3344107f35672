// SPDX-License-Identifier: MIT
//! Errors shared by the JSON and XML codecs
//!
//! Decoding errors are chained explicitly: when a child constructor fails,
//! the parent wraps the child's error as its `caused_by` link instead of
//! discarding it, so the failsafe wrapper can render the whole path from the
//! offending construct up to the subtree that was dropped.

use crate::registry::UnknownToken;

/// Category of a decoding failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// A mandatory field, attribute, child or text is absent
    MissingField,
    /// A token is not part of the enumerated domain
    InvalidEnumToken,
    /// The discriminator is not valid in this context
    WrongElementKind,
    /// An Identifier occurs twice
    DuplicateIdentifier,
    /// A value is present but malformed (wrong JSON type, bad base64, bad boolean)
    InvalidValue,
    /// The document itself cannot be parsed or has an unknown top-level shape
    Syntax,
}

impl DecodeErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            DecodeErrorKind::MissingField => "MissingField",
            DecodeErrorKind::InvalidEnumToken => "InvalidEnumToken",
            DecodeErrorKind::WrongElementKind => "WrongElementKind",
            DecodeErrorKind::DuplicateIdentifier => "DuplicateIdentifier",
            DecodeErrorKind::InvalidValue => "InvalidValue",
            DecodeErrorKind::Syntax => "Syntax",
        }
    }
}

/// A decoding failure with an optional cause chain
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub message: String,
    #[source]
    pub caused_by: Option<Box<DecodeError>>,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            caused_by: None,
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::MissingField, message)
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::InvalidValue, message)
    }

    pub fn wrong_kind(message: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::WrongElementKind, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::Syntax, message)
    }

    pub fn invalid_token(err: UnknownToken, location: &str) -> Self {
        Self::new(
            DecodeErrorKind::InvalidEnumToken,
            format!("{} has invalid {} token: {}", location, err.domain, err.token),
        )
    }

    /// Wrap `cause` as the reason this error occurred.
    ///
    /// The wrapper takes the kind of the innermost cause, so callers can
    /// still match on what actually went wrong.
    pub fn wrap(cause: DecodeError, message: impl Into<String>) -> Self {
        Self {
            kind: cause.root().kind,
            message: message.into(),
            caused_by: Some(Box::new(cause)),
        }
    }

    /// Iterate from this error down to its innermost cause
    pub fn chain(&self) -> impl Iterator<Item = &DecodeError> {
        std::iter::successors(Some(self), |e| e.caused_by.as_deref())
    }

    /// Innermost cause
    pub fn root(&self) -> &DecodeError {
        self.chain().last().unwrap_or(self)
    }

    /// Render the chain innermost cause first, one link per line
    pub fn render_chain(&self) -> String {
        let messages: Vec<&str> = self.chain().map(|e| e.message.as_str()).collect();
        let mut rendered = format!("{}: ", self.kind.name());
        rendered.push_str(
            &messages
                .iter()
                .rev()
                .copied()
                .collect::<Vec<_>>()
                .join("\n -> "),
        );
        rendered
    }
}

/// Errors raised while serializing documents
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_root_kind() {
        let inner = DecodeError::missing("aas:identification on line 3 has no attribute with name idType!");
        let outer = DecodeError::wrap(inner, "Failed to create Identifier from aas:identification on line 3!");
        assert_eq!(outer.kind, DecodeErrorKind::MissingField);
        assert_eq!(outer.chain().count(), 2);
    }

    #[test]
    fn test_render_chain_innermost_first() {
        let inner = DecodeError::missing("inner");
        let middle = DecodeError::wrap(inner, "middle");
        let outer = DecodeError::wrap(middle, "outer");
        assert_eq!(outer.render_chain(), "MissingField: inner\n -> middle\n -> outer");
    }

    #[test]
    fn test_root_of_single_error() {
        let err = DecodeError::syntax("bad");
        assert_eq!(err.root().message, "bad");
    }

    #[test]
    fn test_invalid_token_message() {
        let err = DecodeError::invalid_token(
            UnknownToken {
                domain: "key type",
                token: "foo".into(),
            },
            "aas:key on line 7",
        );
        assert_eq!(err.kind, DecodeErrorKind::InvalidEnumToken);
        assert!(err.message.contains("foo"));
    }
}
