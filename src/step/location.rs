// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source [`Location`] of a step registration.

use std::panic;

use derive_more::with_trait::Display;

/// Location of the code registering a [`Step`], captured with
/// `#[track_caller]`.
///
/// [`Step`]: super::Step
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file registering the [`Step`].
    ///
    /// [`Step`]: super::Step
    pub path: &'static str,

    /// Line of the registration.
    pub line: u32,

    /// Column of the registration.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`] with the given path, line, and column.
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the [`Location`] of the caller of the function this is
    /// invoked in.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let loc = panic::Location::caller();
        Self::new(loc.file(), loc.line(), loc.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let location = Location::new("tests/calc.rs", 42, 10);
        assert_eq!(location.to_string(), "tests/calc.rs:42:10");
    }

    #[test]
    fn caller_points_here() {
        let location = Location::caller();
        assert!(location.path.ends_with("location.rs"), "{location}");
        assert_eq!(location.line, line!() - 2);
    }

    #[test]
    fn ordering() {
        let a = Location::new("a.rs", 1, 1);
        assert!(a < Location::new("b.rs", 1, 1));
        assert!(a < Location::new("a.rs", 2, 1));
        assert!(a < Location::new("a.rs", 1, 2));
    }
}
