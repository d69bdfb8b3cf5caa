//! Operator dispatch: from filter operator to SQL expression shape
//!
//! One total mapping from operator to expression, shared by value-column and
//! item-name filters. The null/empty semantics here are deliberate business
//! rules: a missing value row and an empty string are the same outcome for
//! `empty`/`notEmpty`, and absence counts as a match for the `notIn` family
//! but not for `in`.

use crate::query::expression::Expr;
use crate::query::operator::FilterOperator;
use crate::query::params::{range_param_names, value_param_name};

/// Parameter slots an expression requires
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    None,
    /// One scalar or list parameter under this name
    Value(String),
    /// A two-ended range
    Range { from: String, to: String },
}

/// The SQL shape of one applied operator plus the parameters it requires
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionSpec {
    pub expr: Expr,
    pub binding: Binding,
}

/// Build the boolean expression for `column` under `operator`.
///
/// Parameter names derive from `param_base` through the binder conventions,
/// so the rendered placeholders resolve once the caller binds under the same
/// base. The expression assumes the column's table is LEFT JOINed, which is
/// what makes the IS NULL arms observe absent rows.
pub fn operator_expression(
    column: &str,
    param_base: &str,
    operator: FilterOperator,
) -> ExpressionSpec {
    let param = value_param_name(param_base);
    let placeholder = format!(":{}", param);

    match operator {
        FilterOperator::Empty => ExpressionSpec {
            expr: Expr::or(vec![Expr::is_null(column), Expr::eq(column, "''")]),
            binding: Binding::None,
        },
        FilterOperator::NotEmpty => ExpressionSpec {
            expr: Expr::and(vec![Expr::is_not_null(column), Expr::neq(column, "''")]),
            binding: Binding::None,
        },
        FilterOperator::In | FilterOperator::Multiselect => ExpressionSpec {
            expr: Expr::in_list(column, param.as_str()),
            binding: Binding::Value(param),
        },
        FilterOperator::NotIn | FilterOperator::NotMultiselect => ExpressionSpec {
            // Absent rows satisfy "does not contain X"
            expr: Expr::or(vec![
                Expr::not_in_list(column, param.as_str()),
                Expr::is_null(column),
            ]),
            binding: Binding::Value(param),
        },
        FilterOperator::Neq => ExpressionSpec {
            expr: Expr::or(vec![
                Expr::neq(column, placeholder.as_str()),
                Expr::is_null(column),
            ]),
            binding: Binding::Value(param),
        },
        FilterOperator::Contains => ExpressionSpec {
            // Operand is wrapped in %...% with its wildcards escaped
            expr: Expr::like_escaped(column, param.as_str()),
            binding: Binding::Value(param),
        },
        FilterOperator::NotLike => ExpressionSpec {
            expr: Expr::or(vec![
                Expr::is_null(column),
                Expr::like(column, param.as_str()),
            ]),
            binding: Binding::Value(param),
        },
        FilterOperator::Between | FilterOperator::NotBetween => {
            let (from, to) = range_param_names(param_base);
            let expr = if operator == FilterOperator::Between {
                Expr::between(column, from.as_str(), to.as_str())
            } else {
                Expr::not_between(column, from.as_str(), to.as_str())
            };
            ExpressionSpec {
                expr,
                binding: Binding::Range { from, to },
            }
        }
        FilterOperator::Eq
        | FilterOperator::Gt
        | FilterOperator::Gte
        | FilterOperator::Lt
        | FilterOperator::Lte
        | FilterOperator::Like => {
            // sql_comparison covers exactly these operators
            let op = operator
                .sql_comparison()
                .expect("direct-comparison operator has an SQL form");
            ExpressionSpec {
                expr: Expr::cmp(column, op, placeholder.as_str()),
                binding: Binding::Value(param),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(operator: FilterOperator) -> String {
        operator_expression("m_value.value", "m_value", operator)
            .expr
            .to_sql()
    }

    #[test]
    fn test_empty_treats_null_and_blank_alike() {
        assert_eq!(
            sql_for(FilterOperator::Empty),
            "(m_value.value IS NULL OR m_value.value = '')"
        );
    }

    #[test]
    fn test_not_empty_excludes_null_and_blank() {
        assert_eq!(
            sql_for(FilterOperator::NotEmpty),
            "(m_value.value IS NOT NULL AND m_value.value <> '')"
        );
    }

    #[test]
    fn test_in_excludes_absent_rows() {
        assert_eq!(
            sql_for(FilterOperator::In),
            "m_value.value IN (:m_value_value)"
        );
        assert_eq!(sql_for(FilterOperator::Multiselect), sql_for(FilterOperator::In));
    }

    #[test]
    fn test_not_in_includes_absent_rows() {
        assert_eq!(
            sql_for(FilterOperator::NotIn),
            "(m_value.value NOT IN (:m_value_value) OR m_value.value IS NULL)"
        );
        assert_eq!(
            sql_for(FilterOperator::NotMultiselect),
            sql_for(FilterOperator::NotIn)
        );
    }

    #[test]
    fn test_neq_matches_null() {
        assert_eq!(
            sql_for(FilterOperator::Neq),
            "(m_value.value <> :m_value_value OR m_value.value IS NULL)"
        );
    }

    #[test]
    fn test_contains_is_escaped_like() {
        assert_eq!(
            sql_for(FilterOperator::Contains),
            "m_value.value LIKE :m_value_value ESCAPE '\\'"
        );
    }

    #[test]
    fn test_not_like_keeps_original_shape() {
        // The caller-supplied pattern combines with IS NULL, not NOT LIKE
        assert_eq!(
            sql_for(FilterOperator::NotLike),
            "(m_value.value IS NULL OR m_value.value LIKE :m_value_value)"
        );
    }

    #[test]
    fn test_direct_comparisons() {
        assert_eq!(sql_for(FilterOperator::Eq), "m_value.value = :m_value_value");
        assert_eq!(sql_for(FilterOperator::Gt), "m_value.value > :m_value_value");
        assert_eq!(
            sql_for(FilterOperator::Gte),
            "m_value.value >= :m_value_value"
        );
        assert_eq!(sql_for(FilterOperator::Lt), "m_value.value < :m_value_value");
        assert_eq!(
            sql_for(FilterOperator::Lte),
            "m_value.value <= :m_value_value"
        );
        assert_eq!(
            sql_for(FilterOperator::Like),
            "m_value.value LIKE :m_value_value"
        );
    }

    #[test]
    fn test_between_binds_both_ends() {
        let spec = operator_expression("m_value.value", "m_value", FilterOperator::Between);
        assert_eq!(
            spec.expr.to_sql(),
            "m_value.value BETWEEN :m_value_value_from AND :m_value_value_to"
        );
        assert_eq!(
            spec.binding,
            Binding::Range {
                from: "m_value_value_from".to_string(),
                to: "m_value_value_to".to_string(),
            }
        );
    }

    #[test]
    fn test_not_between() {
        let spec = operator_expression("m_value.value", "m_value", FilterOperator::NotBetween);
        assert_eq!(
            spec.expr.to_sql(),
            "m_value.value NOT BETWEEN :m_value_value_from AND :m_value_value_to"
        );
    }

    #[test]
    fn test_every_operator_yields_expression() {
        for operator in FilterOperator::ALL {
            let spec = operator_expression("m_value.value", "m_value", *operator);
            assert!(!spec.expr.to_sql().is_empty());

            // Operators that need no operand must not demand a binding
            if !operator.requires_value() {
                assert_eq!(spec.binding, Binding::None);
            } else {
                assert_ne!(spec.binding, Binding::None);
            }
        }
    }

    #[test]
    fn test_name_column_reuses_dispatch() {
        let spec = operator_expression("m_item.name", "m_value", FilterOperator::Empty);
        assert_eq!(
            spec.expr.to_sql(),
            "(m_item.name IS NULL OR m_item.name = '')"
        );
    }
}
