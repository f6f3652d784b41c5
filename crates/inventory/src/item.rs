use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beadstock_core::{DomainError, DomainResult, ItemId};

use crate::category::category_of;

/// User-facing unique item code (e.g. `"A1"`).
///
/// Surrounding whitespace is trimmed; an empty code is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemCode(String);

impl ItemCode {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_input("code cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category label derived from the code's letter prefix.
    pub fn category(&self) -> &str {
        category_of(&self.0)
    }
}

impl TryFrom<String> for ItemCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemCode> for String {
    fn from(value: ItemCode) -> Self {
        value.0
    }
}

impl core::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stock quantity; never negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Strict constructor: negative values are rejected.
    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::invalid_input(format!(
                "quantity cannot be negative (got {value})"
            )));
        }
        Ok(Self(value))
    }

    /// Lenient constructor used on create: negative values become zero.
    pub fn normalized(value: i64) -> Self {
        Self(value.max(0))
    }

    /// Lenient parse of free-form input.
    ///
    /// Reads an optional sign and the leading digits, ignoring anything after
    /// them (`"12abc"` is 12, `"3.7"` is 3). Input without leading digits,
    /// and negative input, normalizes to zero.
    pub fn parse_lenient(raw: &str) -> Self {
        let s = raw.trim();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        if negative || end == 0 {
            return Self::ZERO;
        }
        // Digit runs too long for i64 saturate.
        Self(digits[..end].parse::<i64>().unwrap_or(i64::MAX))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of a relative stock adjustment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustDirection {
    Increase,
    Decrease,
}

impl AdjustDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustDirection::Increase => "increase",
            AdjustDirection::Decrease => "decrease",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            AdjustDirection::Increase => AdjustDirection::Decrease,
            AdjustDirection::Decrease => AdjustDirection::Increase,
        }
    }
}

impl core::str::FromStr for AdjustDirection {
    type Err = DomainError;

    /// Accepts `increase`/`decrease` and the older `add`/`subtract` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increase" | "add" => Ok(AdjustDirection::Increase),
            "decrease" | "subtract" => Ok(AdjustDirection::Decrease),
            other => Err(DomainError::invalid_input(format!(
                "unrecognized adjust direction: {other:?}"
            ))),
        }
    }
}

/// Validated relative adjustment: a direction and a strictly positive amount.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Adjustment {
    direction: AdjustDirection,
    amount: i64,
}

impl Adjustment {
    pub fn new(direction: AdjustDirection, amount: Option<i64>) -> DomainResult<Self> {
        match amount {
            Some(amount) if amount > 0 => Ok(Self { direction, amount }),
            Some(amount) => Err(DomainError::invalid_input(format!(
                "amount must be positive (got {amount})"
            ))),
            None => Err(DomainError::invalid_input("amount is required")),
        }
    }

    pub fn direction(&self) -> AdjustDirection {
        self.direction
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// The adjustment that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            direction: self.direction.opposite(),
            amount: self.amount,
        }
    }

    /// Resulting quantity, or `InsufficientStock` when a decrease would go negative.
    pub fn apply_to(&self, current: Quantity) -> DomainResult<Quantity> {
        match self.direction {
            AdjustDirection::Increase => current
                .value()
                .checked_add(self.amount)
                .map(Quantity)
                .ok_or_else(|| DomainError::invalid_input("quantity overflow")),
            AdjustDirection::Decrease => {
                if self.amount > current.value() {
                    return Err(DomainError::insufficient_stock(current.value(), self.amount));
                }
                Ok(Quantity(current.value() - self.amount))
            }
        }
    }
}

/// A tracked inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: ItemId,
    code: ItemCode,
    quantity: Quantity,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// A freshly created record (both timestamps set to `now`).
    pub fn new(id: ItemId, code: ItemCode, quantity: Quantity, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a record loaded from storage.
    pub fn restore(
        id: ItemId,
        code: ItemCode,
        quantity: Quantity,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            quantity,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn code(&self) -> &ItemCode {
        &self.code
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Overwrite the quantity.
    pub fn set_quantity(&mut self, quantity: Quantity, at: DateTime<Utc>) {
        self.quantity = quantity;
        self.updated_at = at;
    }

    /// Apply a relative adjustment. On error the record is left untouched.
    pub fn adjust(&mut self, adjustment: Adjustment, at: DateTime<Utc>) -> DomainResult<()> {
        self.quantity = adjustment.apply_to(self.quantity)?;
        self.updated_at = at;
        Ok(())
    }
}
