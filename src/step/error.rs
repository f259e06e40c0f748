// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error of registering overlapping step templates.

use std::fmt;

use derive_more::with_trait::Error;

use super::location::Location;

/// Error of a newly registered template overlapping an already registered
/// one, so that some step text could match both.
///
/// Non-fatal: the new step is registered anyway and this error is collected.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct AmbiguousStepError {
    /// Template being registered.
    #[error(not(source))]
    pub new: String,

    /// [`Location`] of the registration being made, if known.
    pub new_location: Option<Location>,

    /// Already registered template.
    #[error(not(source))]
    pub existing: String,

    /// [`Location`] of the existing registration, if known.
    pub existing_location: Option<Location>,
}

impl fmt::Display for AmbiguousStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Similar step name was already declared: {} / {}",
            self.new, self.existing,
        )?;
        for (template, loc) in [
            (&self.new, self.new_location),
            (&self.existing, self.existing_location),
        ] {
            if let Some(loc) = loc {
                write!(f, "\n    {template} --> {loc}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_locations() {
        let err = AmbiguousStepError {
            new: "I have {x}".into(),
            new_location: None,
            existing: "I have {a} and {b}".into(),
            existing_location: None,
        };
        assert_eq!(
            err.to_string(),
            "Similar step name was already declared: \
             I have {x} / I have {a} and {b}",
        );
    }

    #[test]
    fn display_with_locations() {
        let err = AmbiguousStepError {
            new: "a".into(),
            new_location: Some(Location::new("tests/x.rs", 3, 5)),
            existing: "b".into(),
            existing_location: None,
        };
        let out = err.to_string();
        assert!(out.contains("\n    a --> tests/x.rs:3:5"), "{out}");
        assert!(!out.contains("b -->"), "{out}");
    }
}
