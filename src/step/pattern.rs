// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compilation of step templates into [`StepPattern`]s.
//!
//! Template syntax is literal text interspersed with `{name}` or
//! `{name:type}` placeholders. `{{` and `}}` stand for literal braces.

use std::fmt;

use lazy_regex::regex_is_match;
use linked_hash_map::LinkedHashMap;
use regex::Regex;

use crate::error::PatternError;

use super::parameter::ParameterType;

/// Named substrings captured by a successful [`StepPattern::captures()`], in
/// placeholder order.
pub type Captures = LinkedHashMap<String, String>;

/// Placeholder of a [`StepPattern`].
#[derive(Clone, Debug)]
pub struct Placeholder {
    /// Name of this placeholder, unique within its template.
    pub name: String,

    /// Type of this placeholder, if annotated.
    pub ty: Option<ParameterType>,
}

/// Compiled matcher of a step template.
///
/// Matching is total: the whole step text has to match, never a substring.
#[derive(Clone)]
pub struct StepPattern {
    /// Template this [`StepPattern`] was compiled from.
    template: String,

    /// Template with all the `{` and `}` stripped, compared against other
    /// patterns when looking for ambiguities.
    stripped: String,

    /// Text matched by this pattern: literals as is, placeholders replaced
    /// with their type's [`ParameterType::sample()`].
    sample: String,

    /// Anchored [`Regex`] with a named group per [`Placeholder`].
    regex: Regex,

    /// [`Placeholder`]s in template order.
    placeholders: Vec<Placeholder>,
}

impl fmt::Debug for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepPattern")
            .field("template", &self.template)
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Piece of a parsed template.
enum Segment {
    Literal(String),
    Placeholder { name: String, ty: Option<String> },
}

impl StepPattern {
    /// Compiles the given `template` using only the built-in
    /// [`ParameterType`]s.
    ///
    /// # Errors
    ///
    /// See [`PatternError`] for details.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        Self::compile_with(template, &[])
    }

    /// Compiles the given `template`, resolving placeholder types among
    /// `extra_types` first and the built-in [`ParameterType`]s then.
    ///
    /// # Errors
    ///
    /// See [`PatternError`] for details.
    pub fn compile_with(
        template: &str,
        extra_types: &[ParameterType],
    ) -> Result<Self, PatternError> {
        let builtins = ParameterType::builtins();
        let lookup = |key: &str| {
            extra_types
                .iter()
                .chain(&builtins)
                .find(|t| t.name() == key)
                .cloned()
        };

        let mut regex = String::from("^");
        let mut sample = String::new();
        let mut placeholders = Vec::<Placeholder>::new();
        for segment in parse(template)? {
            match segment {
                Segment::Literal(text) => {
                    regex.push_str(&regex::escape(&text));
                    sample.push_str(&text);
                }
                Segment::Placeholder { name, ty } => {
                    if !regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]*$", &name) {
                        return Err(PatternError::InvalidName {
                            template: template.to_owned(),
                            name,
                        });
                    }
                    if placeholders.iter().any(|p| p.name == name) {
                        return Err(PatternError::DuplicateName {
                            template: template.to_owned(),
                            name,
                        });
                    }
                    let ty = ty
                        .map(|key| {
                            lookup(&key).ok_or_else(|| {
                                PatternError::UnknownType {
                                    template: template.to_owned(),
                                    name: name.clone(),
                                    ty: key,
                                }
                            })
                        })
                        .transpose()?;

                    let sub = ty.as_ref().map_or(".+?", ParameterType::regex);
                    regex.push_str(&format!("(?P<{name}>{sub})"));
                    sample.push_str(
                        ty.as_ref().map_or("x", ParameterType::sample),
                    );
                    placeholders.push(Placeholder { name, ty });
                }
            }
        }
        regex.push('$');

        let regex = Regex::new(&regex).map_err(|source| PatternError::Regex {
            template: template.to_owned(),
            source,
        })?;

        Ok(Self {
            template: template.to_owned(),
            stripped: template.replace(['{', '}'], ""),
            sample,
            regex,
            placeholders,
        })
    }

    /// Returns the template this [`StepPattern`] was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the template with placeholder delimiters stripped.
    #[must_use]
    pub fn stripped(&self) -> &str {
        &self.stripped
    }

    /// Returns the [`Placeholder`]s of this [`StepPattern`].
    #[must_use]
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Returns the [`Placeholder`] with the given `name`, if any.
    #[must_use]
    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.name == name)
    }

    /// Checks whether the whole `text` matches this [`StepPattern`].
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches the whole `text`, returning the raw captured substrings.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Captures> {
        let caps = self.regex.captures(text)?;
        Some(
            self.placeholders
                .iter()
                .map(|p| {
                    let value = caps.name(&p.name).map_or("", |m| m.as_str());
                    (p.name.clone(), value.to_owned())
                })
                .collect(),
        )
    }

    /// Returns a text matched by this [`StepPattern`], with every
    /// placeholder replaced by a sample of its type.
    #[must_use]
    pub fn sample(&self) -> &str {
        &self.sample
    }

    /// Checks whether this [`StepPattern`] and the `other` one could match
    /// the same step text.
    ///
    /// Identical templates always overlap. Otherwise, each pattern is matched
    /// against the other's stripped template and sample text.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.template == other.template
            || [&other.stripped, &other.sample]
                .into_iter()
                .any(|text| self.is_match(text))
            || [&self.stripped, &self.sample]
                .into_iter()
                .any(|text| other.is_match(text))
    }
}

/// Splits a `template` into literal and placeholder [`Segment`]s.
fn parse(template: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                _ = chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                _ = chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(PatternError::UnexpectedBrace {
                    template: template.to_owned(),
                    position: pos,
                });
            }
            '{' => {
                let mut body = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(PatternError::UnexpectedBrace {
                                template: template.to_owned(),
                                position: pos,
                            });
                        }
                        c => body.push(c),
                    }
                }
                if !closed {
                    return Err(PatternError::UnclosedPlaceholder {
                        template: template.to_owned(),
                        position: pos,
                    });
                }
                if !literal.is_empty() {
                    let text = std::mem::take(&mut literal);
                    segments.push(Segment::Literal(text));
                }
                let (name, ty) = match body.split_once(':') {
                    Some((name, ty)) => (name, Some(ty.trim().to_owned())),
                    None => (body.as_str(), None),
                };
                segments.push(Segment::Placeholder {
                    name: name.trim().to_owned(),
                    ty,
                });
            }
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}
