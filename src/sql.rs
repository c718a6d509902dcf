//! PostgreSQL JSONB SQL generation
//!
//! Compiles [`QuerySet`]s into sea-query statements. Keys inside JSON
//! columns are addressed with the `#>` (JSON) and `#>>` (text) path
//! operators, for example `"data__a__b"` becomes `"data" #>> '{a,b}'`.

use crate::error::{JsonAdminError, JsonAdminResult};
use crate::model::{ModelMeta, PK_ALIAS};
use crate::path::JsonFieldPath;
use crate::query::{FieldRef, Filter, FilterCondition, Lookup, OrderingExpr, QuerySet};
use sea_query::{
	Alias, Asterisk, Condition, Expr, ExprTrait, Order, PostgresQueryBuilder, Query as SeaQuery,
	SelectStatement, SimpleExpr,
};
use serde_json::Value;

/// Column alias of the projected value in distinct-value queries
pub const FIELD_DATA_ALIAS: &str = "field_data";

/// Column alias of the row document in row queries
pub const ROW_ALIAS: &str = "row";

/// Validate a name for use as a double-quoted identifier
pub fn quote_ident(name: &str) -> JsonAdminResult<String> {
	let mut chars = name.chars();
	let valid = chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
	if valid {
		Ok(format!("\"{name}\""))
	} else {
		Err(JsonAdminError::InvalidIdentifier(name.to_string()))
	}
}

/// Escape LIKE wildcards so the term matches literally
fn like_escape(term: &str) -> String {
	let mut escaped = String::with_capacity(term.len());
	for c in term.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

/// Convert a JSON scalar to a sea-query value
fn json_to_sea_value(value: &Value) -> sea_query::Value {
	match value {
		Value::String(s) => s.clone().into(),
		Value::Bool(b) => (*b).into(),
		Value::Number(n) => match n.as_i64() {
			Some(i) => i.into(),
			None => n.as_f64().unwrap_or_default().into(),
		},
		Value::Null => sea_query::Value::String(None),
		other => other.to_string().into(),
	}
}

/// `("data" #>> '{a,b}')`: the text value at a JSON path
pub fn json_text_expr(path: &JsonFieldPath) -> JsonAdminResult<SimpleExpr> {
	let field = quote_ident(path.field())?;
	Ok(Expr::cust_with_values(format!("({field} #>> $1)"), [path.pg_text_array()]).into())
}

/// SQL text of a target compared as text, with its bound values
///
/// JSON targets bind the path as `$1`; columns bind nothing.
fn text_target(target: &FieldRef) -> JsonAdminResult<(String, Vec<String>)> {
	match target {
		FieldRef::Column(column) => Ok((format!("CAST({} AS TEXT)", quote_ident(column)?), vec![])),
		FieldRef::Json(path) => Ok((
			format!("({} #>> $1)", quote_ident(path.field())?),
			vec![path.pg_text_array()],
		)),
	}
}

fn ilike(target: &FieldRef, pattern: String) -> JsonAdminResult<SimpleExpr> {
	let (sql, mut values) = text_target(target)?;
	values.push(pattern);
	let placeholder = values.len();
	Ok(Expr::cust_with_values(format!("{sql} ILIKE ${placeholder}"), values).into())
}

/// Build the expression for a single filter
pub fn build_filter_expr(filter: &Filter) -> JsonAdminResult<SimpleExpr> {
	let expr = match (&filter.target, &filter.lookup) {
		(FieldRef::Column(column), Lookup::Exact(Value::Null)) => {
			Expr::col(Alias::new(column)).is_null()
		}
		(FieldRef::Column(column), Lookup::Exact(value)) => {
			Expr::col(Alias::new(column)).eq(json_to_sea_value(value))
		}
		(FieldRef::Column(column), Lookup::IsNotNull) => Expr::col(Alias::new(column)).is_not_null(),
		(FieldRef::Json(path), Lookup::Exact(value)) => {
			let field = quote_ident(path.field())?;
			Expr::cust_with_values(
				format!("({field} #> $1) = $2::jsonb"),
				[path.pg_text_array(), value.to_string()],
			)
			.into()
		}
		(FieldRef::Json(path), Lookup::IsNotNull) => {
			let field = quote_ident(path.field())?;
			Expr::cust_with_values(
				format!("({field} #>> $1) IS NOT NULL"),
				[path.pg_text_array()],
			)
			.into()
		}
		(target, Lookup::IExact(term)) => ilike(target, like_escape(term))?,
		(target, Lookup::IContains(term)) => ilike(target, format!("%{}%", like_escape(term)))?,
		(target, Lookup::IStartsWith(term)) => ilike(target, format!("{}%", like_escape(term)))?,
	};
	Ok(expr)
}

/// Build a sea-query condition from a composite filter
///
/// Empty AND/OR groups render as `TRUE`/`FALSE` so they keep their meaning
/// when nested.
pub fn build_condition(condition: &FilterCondition) -> JsonAdminResult<Condition> {
	match condition {
		FilterCondition::Single(filter) => Ok(Condition::all().add(build_filter_expr(filter)?)),
		FilterCondition::And(conditions) if conditions.is_empty() => {
			Ok(Condition::all().add(Expr::cust("TRUE")))
		}
		FilterCondition::Or(conditions) if conditions.is_empty() => {
			Ok(Condition::all().add(Expr::cust("FALSE")))
		}
		FilterCondition::And(conditions) => {
			let mut and_condition = Condition::all();
			for cond in conditions {
				and_condition = and_condition.add(build_condition(cond)?);
			}
			Ok(and_condition)
		}
		FilterCondition::Or(conditions) => {
			let mut or_condition = Condition::any();
			for cond in conditions {
				or_condition = or_condition.add(build_condition(cond)?);
			}
			Ok(or_condition)
		}
	}
}

fn apply_queryset(
	query: &mut SelectStatement,
	meta: &ModelMeta,
	queryset: &QuerySet,
) -> JsonAdminResult<()> {
	if let Some(condition) = queryset.condition() {
		query.cond_where(build_condition(condition)?);
	}

	for ordering in queryset.ordering() {
		let order = if ordering.is_descending() {
			Order::Desc
		} else {
			Order::Asc
		};
		match ordering {
			OrderingExpr::Field { name, .. } => {
				let column = if name == PK_ALIAS {
					meta.pk_field()
				} else {
					name.as_str()
				};
				quote_ident(column)?;
				query.order_by(Alias::new(column), order);
			}
			OrderingExpr::JsonPath { path, .. } => {
				query.order_by_expr(json_text_expr(path)?, order);
			}
		}
	}
	Ok(())
}

/// `SELECT * FROM table WHERE ... ORDER BY ...`
pub fn select_statement(meta: &ModelMeta, queryset: &QuerySet) -> JsonAdminResult<SelectStatement> {
	let table = meta.table_name();
	quote_ident(&table)?;
	let mut query = SeaQuery::select()
		.column(Asterisk)
		.from(Alias::new(table))
		.to_owned();
	apply_queryset(&mut query, meta, queryset)?;
	Ok(query)
}

/// Like [`select_statement`] but projects each row as one JSONB document
pub fn select_rows_statement(
	meta: &ModelMeta,
	queryset: &QuerySet,
) -> JsonAdminResult<SelectStatement> {
	let table = meta.table_name();
	quote_ident(&table)?;
	let mut query = SeaQuery::select()
		.expr_as(Expr::cust("to_jsonb(\"t\")"), Alias::new(ROW_ALIAS))
		.from_as(Alias::new(table), Alias::new("t"))
		.to_owned();
	apply_queryset(&mut query, meta, queryset)?;
	Ok(query)
}

/// Distinct non-null text values at a JSON path, sorted ascending by bytes
pub fn distinct_values_statement(
	meta: &ModelMeta,
	path: &JsonFieldPath,
) -> JsonAdminResult<SelectStatement> {
	let table = meta.table_name();
	quote_ident(&table)?;
	let field = quote_ident(path.field())?;
	let query = SeaQuery::select()
		.distinct()
		.expr_as(json_text_expr(path)?, Alias::new(FIELD_DATA_ALIAS))
		.from(Alias::new(table))
		.and_where(Expr::cust_with_values(
			format!("({field} #>> $1) IS NOT NULL"),
			[path.pg_text_array()],
		))
		.order_by_expr(
			Expr::cust(format!("\"{FIELD_DATA_ALIAS}\" COLLATE \"C\"")),
			Order::Asc,
		)
		.to_owned();
	Ok(query)
}

/// Render a statement as PostgreSQL with inlined values
pub fn to_postgres(query: &SelectStatement) -> String {
	query.to_string(PostgresQueryBuilder)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::FieldKind;
	use rstest::rstest;
	use serde_json::json;

	fn meta() -> ModelMeta {
		ModelMeta::new("people", "person")
			.with_field("name", FieldKind::Text)
			.with_field("data", FieldKind::Json)
	}

	#[rstest]
	#[case("data", true)]
	#[case("_private", true)]
	#[case("people_person", true)]
	#[case("1abc", false)]
	#[case("da\"ta", false)]
	#[case("", false)]
	#[case("data; DROP TABLE x", false)]
	fn test_quote_ident(#[case] name: &str, #[case] valid: bool) {
		assert_eq!(quote_ident(name).is_ok(), valid);
	}

	#[test]
	fn test_like_escape() {
		assert_eq!(like_escape("50%_off\\"), "50\\%\\_off\\\\");
	}

	#[test]
	fn test_distinct_values_sql() {
		let sql = to_postgres(
			&distinct_values_statement(&meta(), &JsonFieldPath::parse("data__a__b")).unwrap(),
		);
		assert!(sql.starts_with("SELECT DISTINCT"), "{sql}");
		assert!(sql.contains("(\"data\" #>> '{a,b}') AS \"field_data\""), "{sql}");
		assert!(sql.contains("FROM \"people_person\""), "{sql}");
		assert!(sql.contains("WHERE (\"data\" #>> '{a,b}') IS NOT NULL"), "{sql}");
		assert!(sql.contains("ORDER BY \"field_data\" COLLATE \"C\" ASC"), "{sql}");
		assert!(!sql.contains('?'), "{sql}");
	}

	#[test]
	fn test_json_exact_sql() {
		let filter = Filter::json(JsonFieldPath::parse("data__active"), Lookup::Exact(json!(true)));
		let qs = QuerySet::all().filter(filter);
		let sql = to_postgres(&select_statement(&meta(), &qs).unwrap());
		assert!(sql.contains("(\"data\" #> '{active}') = 'true'::jsonb"), "{sql}");
	}

	#[test]
	fn test_json_icontains_sql() {
		let filter = Filter::json(
			JsonFieldPath::parse("data__name__full"),
			Lookup::IContains("ada".into()),
		);
		let sql = to_postgres(&select_statement(&meta(), &QuerySet::all().filter(filter)).unwrap());
		assert!(sql.contains("(\"data\" #>> '{name,full}') ILIKE '%ada%'"), "{sql}");
	}

	#[rstest]
	#[case(Lookup::IExact("Ada".into()), "ILIKE 'Ada'")]
	#[case(Lookup::IStartsWith("ad".into()), "ILIKE 'ad%'")]
	fn test_column_ilike_binds_pattern_first(#[case] lookup: Lookup, #[case] expected: &str) {
		let filter = Filter::column("name", lookup);
		let sql = to_postgres(&select_statement(&meta(), &QuerySet::all().filter(filter)).unwrap());
		assert!(sql.contains(&format!("CAST(\"name\" AS TEXT) {expected}")), "{sql}");
	}

	#[test]
	fn test_json_ordering_sql() {
		let qs = QuerySet::all().order_by(vec![
			OrderingExpr::JsonPath {
				path: JsonFieldPath::parse("data__name__full"),
				descending: true,
			},
			OrderingExpr::field("pk"),
		]);
		let sql = to_postgres(&select_statement(&meta(), &qs).unwrap());
		assert!(sql.contains("ORDER BY (\"data\" #>> '{name,full}') DESC"), "{sql}");
		assert!(sql.contains("\"id\" ASC"), "{sql}");
	}

	#[test]
	fn test_rows_statement_projects_jsonb() {
		let sql = to_postgres(&select_rows_statement(&meta(), &QuerySet::all()).unwrap());
		assert!(sql.contains("to_jsonb(\"t\") AS \"row\""), "{sql}");
		assert!(sql.contains("FROM \"people_person\" AS \"t\""), "{sql}");
	}

	#[test]
	fn test_invalid_field_is_rejected() {
		let filter = Filter::json(JsonFieldPath::parse("da-ta__a"), Lookup::IsNotNull);
		let err = select_statement(&meta(), &QuerySet::all().filter(filter)).unwrap_err();
		assert!(matches!(err, JsonAdminError::InvalidIdentifier(_)));
	}

	#[test]
	fn test_empty_or_renders_false() {
		let qs = QuerySet::all().filter(FilterCondition::Or(vec![]));
		let sql = to_postgres(&select_statement(&meta(), &qs).unwrap());
		assert!(sql.contains("FALSE"), "{sql}");
	}
}
