// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of compiling step templates.

use derive_more::with_trait::{Display, Error};

/// Malformed step template, fatal for the registering caller.
#[derive(Debug, Display, Error)]
pub enum PatternError {
    /// `{` without a matching `}`.
    #[display("Unclosed placeholder at {position} in step `{template}`")]
    UnclosedPlaceholder {
        /// Offending template.
        template: String,
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// Lone `}` or a `{` nested inside a placeholder.
    #[display("Unexpected brace at {position} in step `{template}`")]
    UnexpectedBrace {
        /// Offending template.
        template: String,
        /// Byte offset of the offending brace.
        position: usize,
    },

    /// Placeholder name is empty or not an identifier.
    #[display("Invalid placeholder name `{name}` in step `{template}`")]
    InvalidName {
        /// Offending template.
        template: String,
        /// Offending placeholder name.
        name: String,
    },

    /// Same placeholder name used twice.
    #[display("Duplicate placeholder `{name}` in step `{template}`")]
    DuplicateName {
        /// Offending template.
        template: String,
        /// Repeated placeholder name.
        name: String,
    },

    /// Placeholder annotated with a type nobody defined.
    #[display(
        "Unknown type `{ty}` of placeholder `{name}` in step `{template}`"
    )]
    UnknownType {
        /// Offending template.
        template: String,
        /// Placeholder name.
        name: String,
        /// Unknown type key.
        ty: String,
    },

    /// Resulting regex failed to build, usually due to a custom
    /// [`ParameterType`] sub-pattern.
    ///
    /// [`ParameterType`]: crate::ParameterType
    #[display("Failed to build matcher for step `{template}`: {source}")]
    Regex {
        /// Offending template.
        template: String,
        /// Underlying [`regex`] error.
        source: regex::Error,
    },
}

impl PatternError {
    /// Returns the template this [`PatternError`] relates to.
    #[must_use]
    pub fn template(&self) -> &str {
        match self {
            Self::UnclosedPlaceholder { template, .. }
            | Self::UnexpectedBrace { template, .. }
            | Self::InvalidName { template, .. }
            | Self::DuplicateName { template, .. }
            | Self::UnknownType { template, .. }
            | Self::Regex { template, .. } => template,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_names_template() {
        let err = PatternError::DuplicateName {
            template: "I have {a} and {a}".into(),
            name: "a".into(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate placeholder `a` in step `I have {a} and {a}`",
        );
        assert_eq!(err.template(), "I have {a} and {a}");
        assert!(err.source().is_none());
    }

    #[test]
    fn regex_error_is_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = PatternError::Regex { template: "x".into(), source };
        assert!(err.source().is_some());
    }
}
