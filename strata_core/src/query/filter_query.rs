//! Filter facade: translate segment filters into joins and predicates
//!
//! The entry point for callers assembling contact queries. One segment
//! filter becomes a union of value-table branches (direct contact-item
//! links plus item-to-item relation branches), each receiving an equivalent
//! predicate, folded into the caller's query as a derived-table join.

use log::debug;

use super::builder::QueryBuilder;
use super::expression::Expr;
use super::filter::{Binding, FilterValue, SegmentFilter, operator_expression};
use super::operator::FilterOperator;
use super::params::{self, ParamValue};
use super::query_errors::QueryError;
use super::union::UnionQueryContainer;
use crate::schema::{ContactId, FieldId, FieldType, FieldTypeRegistry};

pub const CONTACT_XREF_TABLE: &str = "custom_item_xref_contact";
pub const ITEM_TABLE: &str = "custom_item";
pub const ITEM_XREF_TABLE: &str = "custom_item_xref_custom_item";

/// Which side of an item-to-item link the filtered item sits on
#[derive(Debug, Clone, Copy)]
enum RelationSide {
    Lower,
    Higher,
}

/// A validated filter, ready to attach: its expression plus operand values
#[derive(Debug, Clone)]
struct FilterPlan {
    expr: Expr,
    binding: BoundOperand,
}

#[derive(Debug, Clone)]
enum BoundOperand {
    None,
    Value(ParamValue),
    Range(ParamValue, ParamValue),
}

impl FilterPlan {
    /// The (name, value) pairs this plan will bind under `param_base`
    fn param_entries(&self, param_base: &str) -> Vec<(String, ParamValue)> {
        match &self.binding {
            BoundOperand::None => Vec::new(),
            BoundOperand::Value(value) => {
                vec![(params::value_param_name(param_base), value.clone())]
            }
            BoundOperand::Range(from, to) => {
                let (from_name, to_name) = params::range_param_names(param_base);
                vec![(from_name, from.clone()), (to_name, to.clone())]
            }
        }
    }
}

/// Translates segment filters into SQL across the per-type value tables
#[derive(Debug, Clone)]
pub struct FilterQueryBuilder {
    registry: FieldTypeRegistry,
    /// How many item-to-item relation levels the value union covers
    relation_level_limit: usize,
}

impl FilterQueryBuilder {
    pub fn new(registry: FieldTypeRegistry) -> Self {
        Self {
            registry,
            relation_level_limit: 1,
        }
    }

    /// Limit relation traversal; 0 restricts matching to directly linked items
    pub fn with_relation_level_limit(mut self, limit: usize) -> Self {
        self.relation_level_limit = limit;
        self
    }

    /// Build the value union for one filter: a direct branch plus one branch
    /// per relation direction, all carrying the filter's predicate.
    pub fn create_value_query(
        &self,
        alias: &str,
        filter: &SegmentFilter,
    ) -> Result<UnionQueryContainer, QueryError> {
        let field_type = self.registry.resolve(&filter.field_type)?;
        self.ensure_operator_allowed(field_type, filter.operator)?;

        debug!(
            "Creating value query for field {} under alias '{}'",
            filter.field_id, alias
        );

        let mut union = UnionQueryContainer::new();
        union.add(self.direct_value_branch(alias, field_type, filter.field_id)?);
        if self.relation_level_limit > 0 {
            union.add(self.related_value_branch(
                alias,
                field_type,
                filter.field_id,
                RelationSide::Lower,
            )?);
            union.add(self.related_value_branch(
                alias,
                field_type,
                filter.field_id,
                RelationSide::Higher,
            )?);
        }

        self.apply_value_filter(&mut union, alias, filter)?;
        Ok(union)
    }

    /// Apply one filter consistently to every branch of a union.
    ///
    /// Validation, coercion and parameter-conflict checks all happen before
    /// any branch is touched, so a failure leaves the union unchanged.
    pub fn apply_value_filter(
        &self,
        union: &mut UnionQueryContainer,
        alias: &str,
        filter: &SegmentFilter,
    ) -> Result<(), QueryError> {
        let field_type = self.registry.resolve(&filter.field_type)?;
        self.ensure_operator_allowed(field_type, filter.operator)?;

        let param_base = format!("{}_value", alias);
        let column = format!("{}_value.value", alias);
        let plan = plan_column_filter(&column, &param_base, field_type, filter.operator, &filter.value)?;

        let field_param = field_join_param(alias);
        let field_param_value = ParamValue::Int(filter.field_id.value() as i64);

        for query in union.iter() {
            for (name, value) in plan.param_entries(&param_base) {
                if let Some(existing) = query.parameter(&name) {
                    if existing != &value {
                        return Err(QueryError::DuplicateParameter { name });
                    }
                }
            }
            if let Some(existing) = query.parameter(&field_param) {
                if existing != &field_param_value {
                    return Err(QueryError::DuplicateParameter { name: field_param });
                }
            }
        }

        for query in union.iter_mut() {
            self.ensure_value_join(query, alias, field_type, filter.field_id)?;
            self.attach_plan(query, &param_base, &plan)?;
        }

        debug!(
            "Applied '{}' filter for field {} under alias '{}'",
            filter.operator, filter.field_id, alias
        );
        Ok(())
    }

    /// The basic item query shape for name-based filtering
    pub fn create_item_name_query(&self, alias: &str) -> QueryBuilder {
        let contact_alias = format!("{}_contact", alias);
        let item_alias = format!("{}_item", alias);

        let mut query = QueryBuilder::new();
        query
            .select("*")
            .from(CONTACT_XREF_TABLE, &contact_alias)
            .left_join(
                ITEM_TABLE,
                &item_alias,
                &format!("{}.id = {}.custom_item_id", item_alias, contact_alias),
            );
        query
    }

    /// Filter on the item's name column instead of a typed value column.
    ///
    /// Names behave like text fields; the operator dispatch is shared.
    pub fn apply_item_name_filter(
        &self,
        query: &mut QueryBuilder,
        alias: &str,
        operator: FilterOperator,
        value: &FilterValue,
    ) -> Result<(), QueryError> {
        self.ensure_operator_allowed(FieldType::Text, operator)?;

        let param_base = format!("{}_value", alias);
        let column = format!("{}_item.name", alias);
        let plan = plan_column_filter(&column, &param_base, FieldType::Text, operator, value)?;
        self.attach_plan(query, &param_base, &plan)
    }

    /// Restrict a query to one contact.
    ///
    /// Requires a contact or value join under `alias`; anything else is a
    /// query shape that cannot support the restriction.
    pub fn add_contact_restriction(
        &self,
        query: &mut QueryBuilder,
        alias: &str,
        contact_id: ContactId,
    ) -> Result<(), QueryError> {
        let contact_alias = format!("{}_contact", alias);
        let value_alias = format!("{}_value", alias);
        if !query.has_join_alias(&contact_alias) && !query.has_join_alias(&value_alias) {
            return Err(QueryError::NoUsableJoin {
                alias: alias.to_string(),
            });
        }

        let param = format!("contact_id_{}", contact_id);
        query.and_where(Expr::eq(
            format!("{}.contact_id", contact_alias),
            format!(":{}", param),
        ));
        query.set_parameter(&param, ParamValue::Int(contact_id.value() as i64))
    }

    /// Fold one filter into a contact query (`FROM <contacts> <alias>`):
    /// the value union joins as a derived table on the contact id, and its
    /// parameters merge into the outer query.
    ///
    /// The derived alias is `cfwq_<field id>`, so one contact query takes at
    /// most one folded filter per field; further conditions on the same field
    /// go through `create_value_query` under a caller-chosen alias.
    pub fn apply_to_contact_query(
        &self,
        query: &mut QueryBuilder,
        filter: &SegmentFilter,
    ) -> Result<(), QueryError> {
        let alias = format!("cfwq_{}", filter.field_id);
        let outer_alias = match query.from_alias() {
            Some(outer_alias) => outer_alias.to_string(),
            None => {
                return Err(QueryError::NoUsableJoin { alias });
            }
        };
        if query.has_join_alias(&alias) {
            return Err(QueryError::DuplicateParameter { name: alias });
        }

        let union = self.create_value_query(&alias, filter)?;
        let parameters = union.bound_parameters()?;

        for (name, value) in &parameters {
            if let Some(existing) = query.parameter(name) {
                if existing != value {
                    return Err(QueryError::DuplicateParameter { name: name.clone() });
                }
            }
        }

        query.inner_join(
            &format!("({})", union.to_sql()),
            &alias,
            &format!("{}.id = {}.contact_id", outer_alias, alias),
        );
        for (name, value) in parameters {
            query.set_parameter(&name, value)?;
        }

        debug!(
            "Folded filter on field {} into contact query as '{}'",
            filter.field_id, alias
        );
        Ok(())
    }

    fn ensure_operator_allowed(
        &self,
        field_type: FieldType,
        operator: FilterOperator,
    ) -> Result<(), QueryError> {
        if field_type.supports(operator) {
            return Ok(());
        }
        Err(QueryError::UnsupportedOperator {
            field_type: field_type.key().to_string(),
            operator: operator.symbol().to_string(),
            supported: field_type
                .allowed_operators()
                .iter()
                .map(|op| op.symbol().to_string())
                .collect(),
        })
    }

    /// Join the field's value table under `<alias>_value` if not yet joined.
    /// Repeated calls for one alias are a no-op, so filter order never
    /// duplicates joins.
    fn ensure_value_join(
        &self,
        query: &mut QueryBuilder,
        alias: &str,
        field_type: FieldType,
        field_id: FieldId,
    ) -> Result<(), QueryError> {
        let value_alias = format!("{}_value", alias);
        if query.has_join_alias(&value_alias) {
            return Ok(());
        }

        let item_alias = format!("{}_item", alias);
        let field_param = field_join_param(alias);
        query.left_join(
            field_type.table(),
            &value_alias,
            &format!(
                "{}.custom_item_id = {}.id AND {}.custom_field_id = :{}",
                value_alias, item_alias, value_alias, field_param
            ),
        );
        query.set_parameter(&field_param, ParamValue::Int(field_id.value() as i64))
    }

    fn attach_plan(
        &self,
        query: &mut QueryBuilder,
        param_base: &str,
        plan: &FilterPlan,
    ) -> Result<(), QueryError> {
        for (name, value) in plan.param_entries(param_base) {
            if let Some(existing) = query.parameter(&name) {
                if existing != &value {
                    return Err(QueryError::DuplicateParameter { name });
                }
            }
        }

        match &plan.binding {
            BoundOperand::None => {}
            BoundOperand::Value(value) => {
                params::bind(query, param_base, value.clone())?;
            }
            BoundOperand::Range(from, to) => {
                params::bind_range(query, param_base, from.clone(), to.clone())?;
            }
        }

        query.and_where(plan.expr.clone());
        Ok(())
    }

    fn direct_value_branch(
        &self,
        alias: &str,
        field_type: FieldType,
        field_id: FieldId,
    ) -> Result<QueryBuilder, QueryError> {
        let contact_alias = format!("{}_contact", alias);
        let item_alias = format!("{}_item", alias);

        let mut query = QueryBuilder::new();
        query
            .select(&format!("{}.contact_id AS contact_id", contact_alias))
            .distinct()
            .from(CONTACT_XREF_TABLE, &contact_alias)
            .left_join(
                ITEM_TABLE,
                &item_alias,
                &format!("{}.id = {}.custom_item_id", item_alias, contact_alias),
            );
        self.ensure_value_join(&mut query, alias, field_type, field_id)?;
        Ok(query)
    }

    fn related_value_branch(
        &self,
        alias: &str,
        field_type: FieldType,
        field_id: FieldId,
        side: RelationSide,
    ) -> Result<QueryBuilder, QueryError> {
        let contact_alias = format!("{}_contact", alias);
        let item_alias = format!("{}_item", alias);
        let xref_alias = format!("{}_item_xref", alias);

        // The contact's item is on the opposite side of the link
        let (near_column, far_column) = match side {
            RelationSide::Lower => ("custom_item_id_higher", "custom_item_id_lower"),
            RelationSide::Higher => ("custom_item_id_lower", "custom_item_id_higher"),
        };

        let mut query = QueryBuilder::new();
        query
            .select(&format!("{}.contact_id AS contact_id", contact_alias))
            .distinct()
            .from(CONTACT_XREF_TABLE, &contact_alias)
            .inner_join(
                ITEM_XREF_TABLE,
                &xref_alias,
                &format!(
                    "{}.{} = {}.custom_item_id",
                    xref_alias, near_column, contact_alias
                ),
            )
            .left_join(
                ITEM_TABLE,
                &item_alias,
                &format!("{}.id = {}.{}", item_alias, xref_alias, far_column),
            );
        self.ensure_value_join(&mut query, alias, field_type, field_id)?;
        Ok(query)
    }
}

fn field_join_param(alias: &str) -> String {
    format!("{}_custom_field_id", alias)
}

/// Validate and coerce one filter against a column, producing the expression
/// and operand values without touching any query
fn plan_column_filter(
    column: &str,
    param_base: &str,
    field_type: FieldType,
    operator: FilterOperator,
    value: &FilterValue,
) -> Result<FilterPlan, QueryError> {
    let set_operator = matches!(
        operator,
        FilterOperator::In
            | FilterOperator::NotIn
            | FilterOperator::Multiselect
            | FilterOperator::NotMultiselect
    );

    // An empty value set degenerates to a constant predicate; never render IN ()
    if set_operator {
        if let FilterValue::List(items) = value {
            if items.is_empty() {
                let matches_everything = matches!(
                    operator,
                    FilterOperator::NotIn | FilterOperator::NotMultiselect
                );
                debug!(
                    "Empty value set for '{}' on {}; degrading to constant",
                    operator, column
                );
                return Ok(FilterPlan {
                    expr: Expr::Constant(matches_everything),
                    binding: BoundOperand::None,
                });
            }
        }
    }

    let spec = operator_expression(column, param_base, operator);
    let binding = match spec.binding {
        Binding::None => BoundOperand::None,
        Binding::Value(_) => BoundOperand::Value(coerce_operand(field_type, operator, value)?),
        Binding::Range { .. } => match value {
            FilterValue::Range { from, to } => BoundOperand::Range(
                field_type.coerce_scalar(from)?,
                field_type.coerce_scalar(to)?,
            ),
            other => {
                return Err(invalid_operand(field_type, other, "a from/to range"));
            }
        },
    };

    Ok(FilterPlan {
        expr: spec.expr,
        binding,
    })
}

fn coerce_operand(
    field_type: FieldType,
    operator: FilterOperator,
    value: &FilterValue,
) -> Result<ParamValue, QueryError> {
    match operator {
        FilterOperator::In
        | FilterOperator::NotIn
        | FilterOperator::Multiselect
        | FilterOperator::NotMultiselect => match value {
            FilterValue::List(items) => field_type.coerce_list(items),
            // A lone scalar is a one-element set
            FilterValue::Scalar(item) => field_type.coerce_list(std::slice::from_ref(item)),
            other => Err(invalid_operand(field_type, other, "a value list")),
        },
        FilterOperator::Contains => match value {
            FilterValue::Scalar(needle) => Ok(ParamValue::Text(format!(
                "%{}%",
                super::expression::escape_like_pattern(needle)
            ))),
            other => Err(invalid_operand(field_type, other, "a text value")),
        },
        FilterOperator::Like | FilterOperator::NotLike => match value {
            FilterValue::Scalar(pattern) => Ok(ParamValue::Text(pattern.clone())),
            other => Err(invalid_operand(field_type, other, "a pattern")),
        },
        _ => match value {
            FilterValue::Scalar(scalar) => field_type.coerce_scalar(scalar),
            other => Err(invalid_operand(field_type, other, "a scalar value")),
        },
    }
}

fn invalid_operand(field_type: FieldType, value: &FilterValue, expected: &str) -> QueryError {
    let shown = match value {
        FilterValue::None => "none".to_string(),
        FilterValue::Scalar(s) => s.clone(),
        FilterValue::List(_) => "[list]".to_string(),
        FilterValue::Range { .. } => "[range]".to_string(),
    };
    QueryError::InvalidFieldValue {
        field_type: field_type.key().to_string(),
        value: shown,
        expected: expected.to_string(),
    }
}
