// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structured step [`Argument`]s: data tables and multi-line text blocks.

use std::{collections::HashMap, fmt};

use crate::Value;

/// Reserved parameter name receiving a [`Argument::DataTable`].
pub const DATA_TABLE: &str = "data_table";

/// Reserved parameter name receiving a [`Argument::MultiLineText`].
pub const MULTI_LINE: &str = "multi_line";

/// Parameter names no template placeholder may use.
pub const RESERVED_NAMES: [&str; 2] = [DATA_TABLE, MULTI_LINE];

/// Structured argument attached to a step, pre-parsed by the `.feature`
/// parser.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Argument {
    /// Table as rows of cells.
    DataTable(DataTable),

    /// Multi-line text block split into lines.
    MultiLineText(Vec<String>),
}

impl Argument {
    /// Creates an [`Argument::DataTable`] out of the given `rows`.
    #[must_use]
    pub fn table<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self::DataTable(DataTable::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        ))
    }

    /// Creates an [`Argument::MultiLineText`] by splitting the `raw` block on
    /// line boundaries.
    #[must_use]
    pub fn multi_line(raw: &str) -> Self {
        Self::MultiLineText(raw.lines().map(str::to_owned).collect())
    }

    /// Returns the reserved parameter name receiving this [`Argument`].
    #[must_use]
    pub const fn slot(&self) -> &'static str {
        match self {
            Self::DataTable(_) => DATA_TABLE,
            Self::MultiLineText(_) => MULTI_LINE,
        }
    }
}

/// Data table of a step.
///
/// Offers convenient views over the raw rows of strings, similar to
/// cucumber-js.
///
/// # Example
///
/// ```rust
/// use cucumber_engine::DataTable;
///
/// let table = DataTable::from(vec![
///     vec!["name", "age"],
///     vec!["Alice", "30"],
///     vec!["Bob", "25"],
/// ]);
///
/// assert_eq!(table.hashes()[1].get("age"), Some(&"25".to_owned()));
/// assert_eq!(table.rows()[0], vec!["Alice", "30"]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a new [`DataTable`] from a vector of rows.
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns all the rows, including the header row (if present).
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the rows without the header row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Converts the table into maps keyed by the header row.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        let Some((headers, body)) = self.rows.split_first() else {
            return Vec::new();
        };
        body.iter()
            .map(|row| {
                headers.iter().cloned().zip(row.iter().cloned()).collect()
            })
            .collect()
    }

    /// Converts a two-column table into a map of the first column to the
    /// second one.
    ///
    /// Returns [`None`] if any row doesn't have exactly 2 columns.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [k, v] => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns a transposed copy of this table, padding ragged rows with
    /// empty cells.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let width = self.width();
        Self::new(
            (0..width)
                .map(|col| {
                    self.rows
                        .iter()
                        .map(|row| row.get(col).cloned().unwrap_or_default())
                        .collect()
                })
                .collect(),
        )
    }

    /// Returns the number of rows, header included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Checks whether this table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of columns of the widest row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Converts this table into a [`Value::List`] of rows, cells converted
    /// by the given function.
    ///
    /// # Errors
    ///
    /// The first failure of `convert`.
    pub fn to_value<E>(
        &self,
        mut convert: impl FnMut(&str) -> Result<Value, E>,
    ) -> Result<Value, E> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| convert(cell))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}

impl From<Vec<Vec<&str>>> for DataTable {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(str::to_owned).collect())
                .collect(),
        )
    }
}

impl From<Vec<Vec<String>>> for DataTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

impl TryFrom<&Value> for DataTable {
    type Error = &'static str;

    /// Restores a [`DataTable`] from a bound `data_table` parameter,
    /// formatting every cell with its default formatter.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value
            .as_list()
            .ok_or("data table is not a list of rows")?
            .iter()
            .map(|row| {
                row.as_list()
                    .map(|cells| {
                        cells.iter().map(ToString::to_string).collect()
                    })
                    .ok_or("data table row is not a list of cells")
            })
            .collect::<Result<_, _>>()
            .map(Self::new)
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "| {} |", row.join(" | "))?;
        }
        Ok(())
    }
}
