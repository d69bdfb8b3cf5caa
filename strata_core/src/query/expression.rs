//! SQL boolean expression tree
//!
//! A small composable expression model for WHERE and JOIN predicates.
//! Rendering produces SQL text with named placeholders (`:name`); values are
//! bound separately on the owning query builder.

/// A boolean SQL expression fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Direct comparison of a column against a raw right-hand side
    /// (a placeholder like `:name` or a literal like `''`)
    Comparison {
        column: String,
        op: &'static str,
        rhs: String,
    },
    IsNull(String),
    IsNotNull(String),
    In { column: String, param: String },
    NotIn { column: String, param: String },
    Like {
        column: String,
        param: String,
        /// Pattern was built with `escape_like_pattern`; render an ESCAPE clause
        escaped: bool,
    },
    Between {
        column: String,
        from: String,
        to: String,
        negated: bool,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// Constant predicate, for filters that degenerate to always/never match
    Constant(bool),
}

impl Expr {
    pub fn eq(column: impl Into<String>, rhs: impl Into<String>) -> Expr {
        Expr::cmp(column, "=", rhs)
    }

    pub fn neq(column: impl Into<String>, rhs: impl Into<String>) -> Expr {
        Expr::cmp(column, "<>", rhs)
    }

    pub fn cmp(column: impl Into<String>, op: &'static str, rhs: impl Into<String>) -> Expr {
        Expr::Comparison {
            column: column.into(),
            op,
            rhs: rhs.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Expr {
        Expr::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Expr {
        Expr::IsNotNull(column.into())
    }

    pub fn in_list(column: impl Into<String>, param: impl Into<String>) -> Expr {
        Expr::In {
            column: column.into(),
            param: param.into(),
        }
    }

    pub fn not_in_list(column: impl Into<String>, param: impl Into<String>) -> Expr {
        Expr::NotIn {
            column: column.into(),
            param: param.into(),
        }
    }

    pub fn like(column: impl Into<String>, param: impl Into<String>) -> Expr {
        Expr::Like {
            column: column.into(),
            param: param.into(),
            escaped: false,
        }
    }

    pub fn like_escaped(column: impl Into<String>, param: impl Into<String>) -> Expr {
        Expr::Like {
            column: column.into(),
            param: param.into(),
            escaped: true,
        }
    }

    pub fn between(
        column: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Expr {
        Expr::Between {
            column: column.into(),
            from: from.into(),
            to: to.into(),
            negated: false,
        }
    }

    pub fn not_between(
        column: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Expr {
        Expr::Between {
            column: column.into(),
            from: from.into(),
            to: to.into(),
            negated: true,
        }
    }

    pub fn and(parts: Vec<Expr>) -> Expr {
        Expr::And(parts)
    }

    pub fn or(parts: Vec<Expr>) -> Expr {
        Expr::Or(parts)
    }

    /// Render this expression as SQL text
    pub fn to_sql(&self) -> String {
        match self {
            Expr::Comparison { column, op, rhs } => format!("{} {} {}", column, op, rhs),
            Expr::IsNull(column) => format!("{} IS NULL", column),
            Expr::IsNotNull(column) => format!("{} IS NOT NULL", column),
            Expr::In { column, param } => format!("{} IN (:{})", column, param),
            Expr::NotIn { column, param } => format!("{} NOT IN (:{})", column, param),
            Expr::Like {
                column,
                param,
                escaped,
            } => {
                if *escaped {
                    format!("{} LIKE :{} ESCAPE '\\'", column, param)
                } else {
                    format!("{} LIKE :{}", column, param)
                }
            }
            Expr::Between {
                column,
                from,
                to,
                negated,
            } => {
                let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                format!("{} {} :{} AND :{}", column, keyword, from, to)
            }
            Expr::And(parts) => Expr::join_parts(parts, " AND "),
            Expr::Or(parts) => Expr::join_parts(parts, " OR "),
            Expr::Constant(true) => "1 = 1".to_string(),
            Expr::Constant(false) => "1 = 0".to_string(),
        }
    }

    fn join_parts(parts: &[Expr], separator: &str) -> String {
        let rendered: Vec<String> = parts.iter().map(Expr::to_sql).collect();
        format!("({})", rendered.join(separator))
    }
}

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Used when the engine itself builds a LIKE pattern from an operand, so the
/// operand matches literally instead of as a pattern.
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison() {
        let expr = Expr::eq("m_value.value", ":m_value_value");
        assert_eq!(expr.to_sql(), "m_value.value = :m_value_value");

        let expr = Expr::cmp("m_value.value", ">=", ":m_value_value");
        assert_eq!(expr.to_sql(), "m_value.value >= :m_value_value");
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(Expr::is_null("m_value.value").to_sql(), "m_value.value IS NULL");
        assert_eq!(
            Expr::is_not_null("m_value.value").to_sql(),
            "m_value.value IS NOT NULL"
        );
    }

    #[test]
    fn test_in_list() {
        let expr = Expr::in_list("m_value.value", "m_value_value");
        assert_eq!(expr.to_sql(), "m_value.value IN (:m_value_value)");

        let expr = Expr::not_in_list("m_value.value", "m_value_value");
        assert_eq!(expr.to_sql(), "m_value.value NOT IN (:m_value_value)");
    }

    #[test]
    fn test_like() {
        let expr = Expr::like("m_item.name", "m_value_value");
        assert_eq!(expr.to_sql(), "m_item.name LIKE :m_value_value");

        let expr = Expr::like_escaped("m_item.name", "m_value_value");
        assert_eq!(expr.to_sql(), "m_item.name LIKE :m_value_value ESCAPE '\\'");
    }

    #[test]
    fn test_between() {
        let expr = Expr::between("m_value.value", "m_from", "m_to");
        assert_eq!(expr.to_sql(), "m_value.value BETWEEN :m_from AND :m_to");

        let expr = Expr::not_between("m_value.value", "m_from", "m_to");
        assert_eq!(expr.to_sql(), "m_value.value NOT BETWEEN :m_from AND :m_to");
    }

    #[test]
    fn test_composed_or() {
        let expr = Expr::or(vec![
            Expr::neq("m_value.value", ":m_value_value"),
            Expr::is_null("m_value.value"),
        ]);

        assert_eq!(
            expr.to_sql(),
            "(m_value.value <> :m_value_value OR m_value.value IS NULL)"
        );
    }

    #[test]
    fn test_composed_and_with_literal() {
        let expr = Expr::and(vec![
            Expr::is_not_null("m_value.value"),
            Expr::neq("m_value.value", "''"),
        ]);

        assert_eq!(
            expr.to_sql(),
            "(m_value.value IS NOT NULL AND m_value.value <> '')"
        );
    }

    #[test]
    fn test_nested_composition() {
        let expr = Expr::or(vec![
            Expr::and(vec![
                Expr::is_not_null("a.value"),
                Expr::neq("a.value", "''"),
            ]),
            Expr::is_null("b.value"),
        ]);

        assert_eq!(
            expr.to_sql(),
            "((a.value IS NOT NULL AND a.value <> '') OR b.value IS NULL)"
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(Expr::Constant(true).to_sql(), "1 = 1");
        assert_eq!(Expr::Constant(false).to_sql(), "1 = 0");
    }

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("plain"), "plain");
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("foo_bar"), "foo\\_bar");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
    }
}
