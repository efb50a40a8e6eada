//! SQL construction for the generic Postgres repository.
//!
//! Identifiers come from `Record` metadata only; every user-supplied value
//! goes through `push_bind`.

use sqlx::{Postgres, QueryBuilder};

use taskhub_core::PageRequest;

use super::{Criterion, Filter, Record, Scope, Value};

pub(crate) fn select_list<T: Record>() -> String {
    let mut columns = Vec::with_capacity(T::COLUMNS.len() + 4);
    columns.push("id");
    columns.extend_from_slice(T::COLUMNS);
    columns.extend_from_slice(&["created_at", "updated_at", "deleted_at"]);
    columns.join(", ")
}

/// Escape LIKE metacharacters so user text matches literally.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: Value) {
    match value {
        Value::Text(s) => qb.push_bind(s),
        Value::OptText(s) => qb.push_bind(s),
        Value::Bool(b) => qb.push_bind(b),
    };
}

/// ` WHERE <scope> AND <criteria...>`; the single source of the search
/// predicate for both the count and the page query.
pub(crate) fn push_filter(qb: &mut QueryBuilder<'static, Postgres>, scope: Scope, filter: &Filter) {
    qb.push(" WHERE ").push(scope.predicate());

    for criterion in filter.criteria() {
        match criterion {
            Criterion::Contains { columns, value } => {
                let pattern = format!("%{}%", escape_like(value));
                qb.push(" AND (");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column)
                        .push(" ILIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\'");
                }
                qb.push(")");
            }
            Criterion::Equals { column, value } => {
                qb.push(" AND ").push(*column).push(" = ").push_bind(value.clone());
            }
        }
    }
}

pub(crate) fn count_query<T: Record>(scope: Scope, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
    push_filter(&mut qb, scope, filter);
    qb
}

pub(crate) fn page_query<T: Record>(
    scope: Scope,
    filter: &Filter,
    page: PageRequest,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", select_list::<T>(), T::TABLE));
    push_filter(&mut qb, scope, filter);
    qb.push(" ORDER BY created_at ASC, id ASC LIMIT ")
        .push_bind(page.limit() as i64)
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);
    qb
}
