//! Plan computation.
//!
//! Planning compares the prior state of a resource with the state proposed by
//! configuration and works out what applying it would change. Attributes the
//! API computes keep their prior value when configuration leaves them unset,
//! so planning an unchanged configuration again yields no changes.

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::{AttributeType, Block, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed` for a resource with the
/// given schema.
///
/// A `null` (or absent) prior means the resource is being created. A `null`
/// proposal with a prior present plans deletion, reporting every attribute
/// that had a value as removed.
pub fn plan_resource(
    schema: &Schema,
    prior: Option<&Value>,
    proposed: &Value,
) -> Result<PlanResult, ProviderError> {
    let prior = match prior {
        Some(Value::Object(map)) => Some(map),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(ProviderError::Validation(
                "prior state must be an object".to_string(),
            ))
        },
    };

    let proposed = match proposed {
        Value::Null => return Ok(plan_delete(schema, prior)),
        Value::Object(map) => map,
        _ => {
            return Err(ProviderError::Validation(
                "proposed state must be an object".to_string(),
            ))
        },
    };

    let mut planned = Map::new();
    let mut changes = Vec::new();
    let mut requires_replace = false;

    for (name, attr) in &schema.block.attributes {
        let before = prior
            .and_then(|p| p.get(name))
            .filter(|v| !v.is_null())
            .map(|v| normalize(&attr.attr_type, v));

        let mut value = proposed
            .get(name)
            .map(|v| normalize(&attr.attr_type, v))
            .unwrap_or(Value::Null);

        if value.is_null() && attr.flags.computed {
            if let Some(before) = &before {
                value = before.clone();
            }
        }
        if value.is_null() {
            if let Some(default) = &attr.default {
                value = default.clone();
            }
        }

        let after = (!value.is_null()).then(|| value.clone());
        planned.insert(name.clone(), value);

        let change = match (before, after) {
            (None, None) => None,
            (None, Some(after)) => Some(AttributeChange::added(name.as_str(), after)),
            (Some(before), None) => Some(AttributeChange::removed(name.as_str(), before)),
            (Some(before), Some(after)) => {
                if values_equal(&attr.attr_type, &before, &after) {
                    None
                } else {
                    Some(AttributeChange::modified(name.as_str(), before, after))
                }
            },
        };

        if let Some(change) = change {
            if prior.is_some() && attr.requires_replace && change.after.is_some() {
                requires_replace = true;
            }
            changes.push(change);
        }
    }

    Ok(PlanResult::with_changes(
        Value::Object(planned),
        changes,
        requires_replace,
    ))
}

fn plan_delete(schema: &Schema, prior: Option<&Map<String, Value>>) -> PlanResult {
    let Some(prior) = prior else {
        return PlanResult::no_change(Value::Null);
    };

    let changes = schema
        .block
        .attributes
        .keys()
        .filter_map(|name| {
            prior
                .get(name)
                .filter(|v| !v.is_null())
                .map(|v| AttributeChange::removed(name.as_str(), v.clone()))
        })
        .collect();

    PlanResult::with_changes(Value::Null, changes, false)
}

/// Bring nested objects to the shape their block declares: every declared
/// attribute present, nothing else.
fn normalize(attr_type: &AttributeType, value: &Value) -> Value {
    match (attr_type, value) {
        (AttributeType::NestedSet(block), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| normalize_object(block, item)).collect())
        },
        (AttributeType::List(inner), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| normalize(inner, item)).collect())
        },
        _ => value.clone(),
    }
}

fn normalize_object(block: &Block, value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    let normalized = block
        .attributes
        .iter()
        .map(|(name, attr)| {
            let v = map
                .get(name)
                .map(|v| normalize(&attr.attr_type, v))
                .unwrap_or(Value::Null);
            (name.clone(), v)
        })
        .collect();
    Value::Object(normalized)
}

/// Compare two values, ignoring element order for sets.
pub fn values_equal(attr_type: &AttributeType, a: &Value, b: &Value) -> bool {
    match (attr_type, a, b) {
        (AttributeType::NestedSet(block), Value::Array(xs), Value::Array(ys)) => {
            same_elements(xs, ys, |x, y| objects_equal(block, x, y))
        },
        (AttributeType::List(inner), Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(inner, x, y))
        },
        _ => a == b,
    }
}

fn objects_equal(block: &Block, a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => block.attributes.iter().all(|(name, attr)| {
            let xv = x.get(name).unwrap_or(&Value::Null);
            let yv = y.get(name).unwrap_or(&Value::Null);
            values_equal(&attr.attr_type, xv, yv)
        }),
        _ => a == b,
    }
}

/// Multiset equality under `eq`.
fn same_elements<F>(xs: &[Value], ys: &[Value], eq: F) -> bool
where
    F: Fn(&Value, &Value) -> bool,
{
    if xs.len() != ys.len() {
        return false;
    }

    let mut used = vec![false; ys.len()];
    xs.iter().all(|x| {
        let found = ys
            .iter()
            .enumerate()
            .find(|(i, y)| !used[*i] && eq(x, y))
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                used[i] = true;
                true
            },
            None => false,
        }
    })
}
