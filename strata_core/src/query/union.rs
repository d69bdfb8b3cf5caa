//! Union container for parallel query branches
//!
//! A custom object's items can reach a contact through independent
//! relationship branches (directly, or through a related item on either side
//! of an item-to-item link). Each branch is its own query builder; the
//! container combines them with SQL UNION. Every branch must receive an
//! equivalent predicate when a filter is applied, or the union's semantics
//! silently break.

use std::slice;

use super::builder::QueryBuilder;
use super::params::ParamValue;
use super::query_errors::QueryError;

#[derive(Debug, Clone, Default)]
pub struct UnionQueryContainer {
    queries: Vec<QueryBuilder>,
}

impl UnionQueryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, query: QueryBuilder) {
        self.queries.push(query);
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, QueryBuilder> {
        self.queries.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, QueryBuilder> {
        self.queries.iter_mut()
    }

    /// Render all branches combined with UNION (deduplicating)
    pub fn to_sql(&self) -> String {
        let parts: Vec<String> = self.queries.iter().map(QueryBuilder::to_sql).collect();
        parts.join("\nUNION\n")
    }

    /// Merge every branch's driver-level parameters.
    ///
    /// Branches sharing one filter bind the same names to the same values;
    /// those merge. A name bound to different values across branches fails
    /// with `DuplicateParameter`.
    pub fn bound_parameters(&self) -> Result<Vec<(String, ParamValue)>, QueryError> {
        let mut merged: Vec<(String, ParamValue)> = Vec::new();
        for query in &self.queries {
            for (name, value) in query.bound_parameters() {
                match merged.iter().find(|(n, _)| n == &name) {
                    Some((_, existing)) if existing == &value => {}
                    Some(_) => return Err(QueryError::DuplicateParameter { name }),
                    None => merged.push((name, value)),
                }
            }
        }
        Ok(merged)
    }
}

impl<'a> IntoIterator for &'a UnionQueryContainer {
    type Item = &'a QueryBuilder;
    type IntoIter = slice::Iter<'a, QueryBuilder>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}

impl<'a> IntoIterator for &'a mut UnionQueryContainer {
    type Item = &'a mut QueryBuilder;
    type IntoIter = slice::IterMut<'a, QueryBuilder>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter_mut()
    }
}
