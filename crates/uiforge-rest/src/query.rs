//! Query parameter parsing.
//!
//! List requests carry reserved parameters (`_fields`, `_sortBy`,
//! `_sortDir`, `_page`, `_pageSize`); every remaining parameter
//! becomes an equality filter on the model. The filter surface is a
//! deliberate pass-through: the host application must constrain it
//! externally.

use serde_json::Value;
use std::collections::HashMap;

use uiforge_core::{FieldType, ModelSchema};

use crate::error::RestError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// Predicate + ordering + window for a list request.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Equality filters, field name to expected value.
    pub filters: Vec<(String, Value)>,
    /// Field to order by.
    pub sort_by: String,
    /// Order direction.
    pub sort_dir: SortDir,
    /// 1-based page number.
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
}

/// Parsed list request: requested projection plus the query.
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Fields to project. Empty means primary key only.
    pub fields: Vec<String>,
    pub query: ListQuery,
}

/// Parse the reserved parameters and fold the rest into equality
/// filters. Sorting by a field the model does not have fails loudly.
pub fn parse_list_params(
    mut params: HashMap<String, String>,
    model: &ModelSchema,
) -> Result<ListParams, RestError> {
    let fields = take_projection(&mut params);

    let sort_by = match params.remove("_sortBy") {
        Some(field) => {
            if !model.has_field(&field) {
                return Err(RestError::unknown_sort_field(&model.name, &field));
            }
            field
        }
        None => model.primary_key.clone(),
    };

    let sort_dir = match params.remove("_sortDir").as_deref() {
        Some("desc") => SortDir::Desc,
        _ => SortDir::Asc,
    };

    let page = parse_positive(&mut params, "_page", 1)?;
    let page_size = parse_positive(&mut params, "_pageSize", 10)?;

    let filters = params
        .into_iter()
        .map(|(name, value)| {
            let coerced = coerce_filter_value(model, &name, value);
            (name, coerced)
        })
        .collect();

    Ok(ListParams {
        fields,
        query: ListQuery {
            filters,
            sort_by,
            sort_dir,
            page,
            page_size,
        },
    })
}

/// Parse the `_fields` projection for single-item requests.
pub fn parse_projection(mut params: HashMap<String, String>) -> Vec<String> {
    take_projection(&mut params)
}

fn take_projection(params: &mut HashMap<String, String>) -> Vec<String> {
    // The renderer's format parameter is not a filter.
    params.remove("format");
    params
        .remove("_fields")
        .map(|s| {
            s.split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_positive(
    params: &mut HashMap<String, String>,
    name: &str,
    default: u64,
) -> Result<u64, RestError> {
    match params.remove(name) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| RestError::invalid_parameter(name, &raw)),
        None => Ok(default),
    }
}

/// Coerce a filter string to the field's type when the field is
/// known; unknown fields keep the raw string.
fn coerce_filter_value(model: &ModelSchema, name: &str, raw: String) -> Value {
    let Some(meta) = model.field(name) else {
        return Value::String(raw);
    };
    match meta.field_type {
        FieldType::Boolean => match raw.as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(raw),
        },
        t if t.is_numeric() => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<f64>().map(Value::from))
            .unwrap_or(Value::String(raw)),
        _ => Value::String(raw),
    }
}
