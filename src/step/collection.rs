// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ordered [`Collection`] of registered [`StepDefinition`]s.

use std::sync::Arc;

use derive_more::with_trait::Debug;

use super::{definition::StepDefinition, error::AmbiguousStepError};

/// Collection of [`StepDefinition`]s, in registration order.
///
/// Append-only: a definition overlapping already registered ones is still
/// added, and the overlaps are returned to the caller to be collected.
///
/// Lookup is first-match-wins, so registration order is significant.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    /// Registered definitions.
    #[debug("{:?}",
        definitions.iter().map(|d| d.pattern().template()).collect::<Vec<_>>(),
    )]
    definitions: Vec<Arc<StepDefinition>>,
}

impl Collection {
    /// Creates a new empty [`Collection`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the given `definition`, returning an [`AmbiguousStepError`] for
    /// every already registered definition it overlaps with.
    pub fn add(
        &mut self,
        definition: StepDefinition,
    ) -> Vec<AmbiguousStepError> {
        let ambiguities = self
            .definitions
            .iter()
            .filter(|d| d.pattern().overlaps(definition.pattern()))
            .map(|existing| AmbiguousStepError {
                new: definition.pattern().template().to_owned(),
                new_location: definition.location(),
                existing: existing.pattern().template().to_owned(),
                existing_location: existing.location(),
            })
            .collect();
        self.definitions.push(Arc::new(definition));
        ambiguities
    }

    /// Returns the first registered [`StepDefinition`] matching the whole
    /// `text`, if any.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&Arc<StepDefinition>> {
        self.definitions.iter().find(|d| d.pattern().is_match(text))
    }

    /// Iterates over the registered [`StepDefinition`]s in registration
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<StepDefinition>> {
        self.definitions.iter()
    }

    /// Returns the number of registered [`StepDefinition`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Checks whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    fn def(template: &str) -> StepDefinition {
        Step::new(template, |_| Ok(())).compile().unwrap()
    }

    #[test]
    fn identical_templates_are_ambiguous() {
        let mut collection = Collection::new();
        assert!(collection.add(def("I have {a} and {b}")).is_empty());

        let errs = collection.add(def("I have {a} and {b}"));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].existing, "I have {a} and {b}");
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn identical_typed_or_escaped_templates_are_ambiguous() {
        for template in ["I have {n:d} as result", "price {{x}}"] {
            let mut collection = Collection::new();
            assert!(collection.add(def(template)).is_empty());
            assert_eq!(collection.add(def(template)).len(), 1, "`{template}`");
        }
    }

    #[test]
    fn distinct_templates_are_not_ambiguous() {
        let mut collection = Collection::new();
        assert!(collection.add(def("I add them")).is_empty());
        assert!(collection.add(def("I have {a} and {b}")).is_empty());
        assert!(collection.add(def("I have {a:d} as result")).is_empty());
    }

    #[test]
    fn overlap_is_checked_both_ways() {
        let mut collection = Collection::new();
        assert!(collection.add(def("I have {x}")).is_empty());
        // `I have x` is matched by `I have {x}` the other way around.
        assert_eq!(collection.add(def("I have x")).len(), 1);
    }

    #[test]
    fn every_overlapping_definition_is_reported() {
        let mut collection = Collection::new();
        _ = collection.add(def("I see {a}"));
        _ = collection.add(def("I see {b}"));
        assert_eq!(collection.add(def("I see {c}")).len(), 2);
    }

    #[test]
    fn find_is_first_match_wins() {
        let mut collection = Collection::new();
        _ = collection.add(def("I have {what}"));
        _ = collection.add(def("I have {n:d}"));

        let found = collection.find("I have 5").unwrap();
        assert_eq!(found.pattern().template(), "I have {what}");
        assert!(collection.find("You have 5").is_none());
        assert!(collection.find("I have").is_none());
    }

    #[test]
    fn find_matches_whole_text_only() {
        let mut collection = Collection::new();
        _ = collection.add(def("I add them"));
        assert!(collection.find("I add them").is_some());
        assert!(collection.find("I add them twice").is_none());
        assert!(collection.find("Then I add them").is_none());
        assert!(collection.find("i add them").is_none());
    }
}
