//! Minimal SQL query builder with named parameters
//!
//! The engine never executes SQL itself; it assembles a query representation
//! that renders to SQL text plus named bindings for whatever driver runs it.
//! A builder is exclusively owned by the call stack constructing one query.

use super::expression::Expr;
use super::params::ParamValue;
use super::query_errors::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    table: String,
    alias: String,
    on: String,
}

/// A mutable SELECT query under construction
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    select: Vec<String>,
    distinct: bool,
    from: Option<(String, String)>,
    joins: Vec<Join>,
    predicates: Vec<Expr>,
    parameters: Vec<(String, ParamValue)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, column: &str) -> &mut Self {
        self.select.push(column.to_string());
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn from(&mut self, table: &str, alias: &str) -> &mut Self {
        self.from = Some((table.to_string(), alias.to_string()));
        self
    }

    pub fn inner_join(&mut self, table: &str, alias: &str, on: &str) -> &mut Self {
        self.join(JoinKind::Inner, table, alias, on)
    }

    pub fn left_join(&mut self, table: &str, alias: &str, on: &str) -> &mut Self {
        self.join(JoinKind::Left, table, alias, on)
    }

    fn join(&mut self, kind: JoinKind, table: &str, alias: &str, on: &str) -> &mut Self {
        self.joins.push(Join {
            kind,
            table: table.to_string(),
            alias: alias.to_string(),
            on: on.to_string(),
        });
        self
    }

    /// Add a WHERE predicate; predicates combine with AND
    pub fn and_where(&mut self, expr: Expr) -> &mut Self {
        self.predicates.push(expr);
        self
    }

    /// The alias of the FROM table, if one is set
    pub fn from_alias(&self) -> Option<&str> {
        self.from.as_ref().map(|(_, alias)| alias.as_str())
    }

    /// Every alias joined into this query, including the FROM alias
    pub fn joined_aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.joins.iter().map(|j| j.alias.as_str()).collect();
        if let Some((_, alias)) = &self.from {
            aliases.push(alias.as_str());
        }
        aliases
    }

    /// Whether `alias` is already present among the joined tables
    pub fn has_join_alias(&self, alias: &str) -> bool {
        self.joined_aliases().contains(&alias)
    }

    /// Bind a named parameter.
    ///
    /// Re-binding a name to an identical value is a no-op so parallel union
    /// branches sharing one filter can merge their parameter sets; a
    /// differing value fails with `DuplicateParameter`.
    pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), QueryError> {
        if let Some((_, existing)) = self.parameters.iter().find(|(n, _)| n == name) {
            if existing == &value {
                return Ok(());
            }
            return Err(QueryError::DuplicateParameter {
                name: name.to_string(),
            });
        }
        self.parameters.push((name.to_string(), value));
        Ok(())
    }

    /// Look up a bound parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Render the query as SQL text.
    ///
    /// List-valued parameters expand into indexed placeholders
    /// (`IN (:name)` becomes `IN (:name_0, :name_1)`), matching the names
    /// returned by `bound_parameters`.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(", "));
        }

        if let Some((table, alias)) = &self.from {
            sql.push_str("\nFROM ");
            sql.push_str(table);
            sql.push(' ');
            sql.push_str(alias);
        }

        for join in &self.joins {
            let kind = match join.kind {
                JoinKind::Inner => "INNER",
                JoinKind::Left => "LEFT",
            };
            sql.push_str(&format!(
                "\n{} JOIN {} {} ON {}",
                kind, join.table, join.alias, join.on
            ));
        }

        if !self.predicates.is_empty() {
            let parts: Vec<String> = self.predicates.iter().map(Expr::to_sql).collect();
            sql.push_str("\nWHERE ");
            sql.push_str(&parts.join("\nAND "));
        }

        self.expand_list_placeholders(sql)
    }

    /// The parameters a driver must bind to execute `to_sql`'s output,
    /// with list values flattened into their indexed scalar names
    pub fn bound_parameters(&self) -> Vec<(String, ParamValue)> {
        let mut out = Vec::new();
        for (name, value) in &self.parameters {
            match value {
                ParamValue::TextList(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.push((format!("{}_{}", name, i), ParamValue::Text(item.clone())));
                    }
                }
                ParamValue::IntList(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.push((format!("{}_{}", name, i), ParamValue::Int(*item)));
                    }
                }
                scalar => out.push((name.clone(), scalar.clone())),
            }
        }
        out
    }

    fn expand_list_placeholders(&self, sql: String) -> String {
        let mut out = sql;
        for (name, value) in &self.parameters {
            let len = match value.list_len() {
                Some(len) => len,
                None => continue,
            };
            let replacement = if len == 0 {
                // Never render `IN ()`; the filter layer degrades empty lists
                // to constant predicates before this point
                "NULL".to_string()
            } else {
                (0..len)
                    .map(|i| format!(":{}_{}", name, i))
                    .collect::<Vec<String>>()
                    .join(", ")
            };
            out = replace_placeholder(&out, name, &replacement);
        }
        out
    }
}

/// Replace `:name` placeholders, leaving longer names sharing the prefix alone
fn replace_placeholder(sql: &str, name: &str, replacement: &str) -> String {
    let needle = format!(":{}", name);
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(pos) = rest.find(&needle) {
        let after = &rest[pos + needle.len()..];
        let at_boundary = after
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_');

        out.push_str(&rest[..pos]);
        if at_boundary {
            out.push_str(replacement);
        } else {
            out.push_str(&needle);
        }
        rest = after;
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn value_query() -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .select("m_contact.contact_id AS contact_id")
            .distinct()
            .from("custom_item_xref_contact", "m_contact")
            .left_join(
                "custom_item",
                "m_item",
                "m_item.id = m_contact.custom_item_id",
            );
        query
    }

    #[test]
    fn test_render_select_from_join() {
        let query = value_query();

        assert_eq!(
            query.to_sql(),
            "SELECT DISTINCT m_contact.contact_id AS contact_id\n\
             FROM custom_item_xref_contact m_contact\n\
             LEFT JOIN custom_item m_item ON m_item.id = m_contact.custom_item_id"
        );
    }

    #[test]
    fn test_render_where_predicates_and() {
        let mut query = value_query();
        query
            .and_where(Expr::eq("m_value.value", ":m_value_value"))
            .and_where(Expr::is_not_null("m_value.value"));

        let sql = query.to_sql();
        assert!(sql.contains("WHERE m_value.value = :m_value_value"));
        assert!(sql.contains("\nAND m_value.value IS NOT NULL"));
    }

    #[test]
    fn test_empty_select_renders_star() {
        let mut query = QueryBuilder::new();
        query.from("custom_item", "i");

        assert_eq!(query.to_sql(), "SELECT *\nFROM custom_item i");
    }

    #[test]
    fn test_joined_aliases_include_from() {
        let query = value_query();

        assert!(query.has_join_alias("m_contact"));
        assert!(query.has_join_alias("m_item"));
        assert!(!query.has_join_alias("m_value"));
    }

    #[test]
    fn test_set_parameter_duplicate() {
        let mut query = QueryBuilder::new();
        query
            .set_parameter("p", ParamValue::Text("a".to_string()))
            .unwrap();

        // Identical re-bind merges silently
        assert!(query
            .set_parameter("p", ParamValue::Text("a".to_string()))
            .is_ok());

        let result = query.set_parameter("p", ParamValue::Text("b".to_string()));
        assert_matches!(result, Err(QueryError::DuplicateParameter { name }) if name == "p");
    }

    #[test]
    fn test_list_parameter_expansion() {
        let mut query = QueryBuilder::new();
        query
            .from("custom_field_value_option", "o_value")
            .and_where(Expr::in_list("o_value.value", "o_value_value"));
        query
            .set_parameter(
                "o_value_value",
                ParamValue::TextList(vec!["red".to_string(), "blue".to_string()]),
            )
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("o_value.value IN (:o_value_value_0, :o_value_value_1)"));

        let params = query.bound_parameters();
        assert_eq!(
            params,
            vec![
                (
                    "o_value_value_0".to_string(),
                    ParamValue::Text("red".to_string())
                ),
                (
                    "o_value_value_1".to_string(),
                    ParamValue::Text("blue".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_int_list_expansion() {
        let mut query = QueryBuilder::new();
        query
            .from("custom_field_value_int", "n_value")
            .and_where(Expr::in_list("n_value.value", "n_value_value"));
        query
            .set_parameter("n_value_value", ParamValue::IntList(vec![1, 2, 3]))
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("IN (:n_value_value_0, :n_value_value_1, :n_value_value_2)"));
        assert_eq!(query.bound_parameters().len(), 3);
    }

    #[test]
    fn test_placeholder_prefix_not_clobbered() {
        // A list named "p" must not rewrite the scalar placeholder ":p2"
        let mut query = QueryBuilder::new();
        query
            .from("t", "t")
            .and_where(Expr::in_list("t.a", "p"))
            .and_where(Expr::eq("t.b", ":p2"));
        query
            .set_parameter("p", ParamValue::TextList(vec!["x".to_string()]))
            .unwrap();
        query
            .set_parameter("p2", ParamValue::Text("y".to_string()))
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("t.a IN (:p_0)"));
        assert!(sql.contains("t.b = :p2"));
    }

    #[test]
    fn test_scalar_parameters_pass_through() {
        let mut query = QueryBuilder::new();
        query
            .set_parameter("a", ParamValue::Int(5))
            .unwrap();
        query
            .set_parameter("b", ParamValue::Float(1.5))
            .unwrap();

        assert_eq!(
            query.bound_parameters(),
            vec![
                ("a".to_string(), ParamValue::Int(5)),
                ("b".to_string(), ParamValue::Float(1.5)),
            ]
        );
    }
}
