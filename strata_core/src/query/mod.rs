//! Filter query engine for custom field values
//!
//! This module translates segment filters into parameterized SQL:
//! - An expression tree and query builder for assembling SELECTs
//! - Operator dispatch from filter symbols to SQL predicate shapes
//! - Union containers for parallel relationship branches
//! - A facade wiring field types, operators and joins together
//!
//! The engine performs no I/O; it only mutates in-memory query
//! representations that a separate execution layer sends to the database.

mod builder;
mod expression;
mod filter;
mod filter_query;
mod operator;
mod params;
mod query_errors;
mod union;

pub use builder::{JoinKind, QueryBuilder};
pub use expression::{Expr, escape_like_pattern};
pub use filter::{Binding, ExpressionSpec, FilterValue, SegmentFilter, operator_expression};
pub use filter_query::{
    CONTACT_XREF_TABLE, FilterQueryBuilder, ITEM_TABLE, ITEM_XREF_TABLE,
};
pub use operator::FilterOperator;
pub use params::{ParamValue, bind, bind_range};
pub use query_errors::QueryError;
pub use union::UnionQueryContainer;
