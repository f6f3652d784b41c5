use serde::Deserialize;
use serde_json::Value;

use beadstock_core::{DomainError, DomainResult};
use beadstock_inventory::{AdjustDirection, Quantity};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub code: String,
    /// Number or numeric string; anything unparseable counts as zero.
    #[serde(default)]
    pub quantity: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    #[serde(default)]
    pub quantity: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    #[serde(default, alias = "operation")]
    pub direction: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
}

impl AdjustRequest {
    pub fn direction(&self) -> DomainResult<AdjustDirection> {
        self.direction
            .as_deref()
            .ok_or_else(|| DomainError::invalid_input("direction is required"))?
            .parse()
    }
}

// -------------------------
// Value helpers
// -------------------------

/// Best-effort integer: numbers are truncated, strings parsed leniently,
/// anything else is zero.
pub fn lenient_quantity(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => number_to_i64(n).unwrap_or(0),
        Some(Value::String(s)) => Quantity::parse_lenient(s).value(),
        _ => 0,
    }
}

/// Integer from a JSON number or a numeric string; `None` when absent or null.
pub fn strict_integer(field: &str, value: Option<&Value>) -> DomainResult<Option<i64>> {
    let invalid = || DomainError::invalid_input(format!("{field} must be an integer"));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => number_to_i64(n).map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn number_to_i64(n: &serde_json::Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f.trunc() as i64)
}
