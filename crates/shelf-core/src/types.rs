//! Core types for shelf-core.
//!
//! This module defines the data structures shared by every layer: the
//! selectable [`Entity`], its normalised [`EntityId`], the [`EntityKind`]
//! presets that describe how each back-office endpoint shapes its JSON, and
//! the [`Scope`] filters a caller attaches to remote searches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SearchError;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Stable identifier of a selectable entity.
///
/// Backends return ids as JSON numbers or strings and parents pass them back
/// either way, so identity is always compared on the trimmed string form.
/// An empty id means "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// The empty id passed to change callbacks when a selection is cleared.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an id from a JSON scalar. Objects, arrays and `null` have no
    /// identity and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s)),
            Value::Number(n) => Some(Self::new(n.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        EntityId::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("entity id must be a string or a number"))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A record the user can pick: product, customer, supplier, warehouse, …
///
/// Only `id` and `name` are mandatory. The remaining fields are filled from
/// whichever JSON keys the [`EntityKind`] preset lists for them; everything
/// else the backend sent is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    /// Human-readable label shown in the trigger and the result list.
    pub name: String,
    /// SKU, article, internal code.
    pub code: Option<String>,
    /// Phone number, barcode, e-mail: whatever identifies the record besides
    /// its code.
    pub secondary: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    /// Always numeric, even when the backend sends `"12.000"`.
    pub stock: Option<f64>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: None,
            secondary: None,
            category: None,
            price: None,
            stock: None,
            extra: Map::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: f64) -> Self {
        self.stock = Some(stock);
        self
    }

    /// True when the entity has a positive stock figure. Entities without a
    /// stock field count as out of stock.
    pub fn in_stock(&self) -> bool {
        self.stock.is_some_and(|s| s > 0.0)
    }

    /// Map one JSON object from a search response onto an entity, using the
    /// key priorities of `kind`.
    pub fn from_json(kind: EntityKind, value: &Value) -> Result<Self, SearchError> {
        let Value::Object(obj) = value else {
            return Err(SearchError::Decode(format!(
                "expected a JSON object for a {}, got {}",
                kind.singular(),
                json_type(value)
            )));
        };

        let id = obj
            .get("id")
            .and_then(EntityId::from_json)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SearchError::Decode(format!("{} without an id", kind.singular())))?;

        let fields = kind.fields();
        let name = first_text(obj, fields.name).unwrap_or_else(|| id.to_string());

        let consumed: Vec<&str> = std::iter::once("id")
            .chain(fields.name.iter().copied())
            .chain(fields.code.iter().copied())
            .chain(fields.secondary.iter().copied())
            .chain(fields.category.iter().copied())
            .chain(PRICE_KEYS.iter().copied())
            .chain(STOCK_KEYS.iter().copied())
            .collect();
        let extra = obj
            .iter()
            .filter(|(k, _)| !consumed.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            id,
            name,
            code: first_text(obj, fields.code),
            secondary: first_text(obj, fields.secondary),
            category: first_text(obj, fields.category),
            price: first_number(obj, PRICE_KEYS),
            stock: first_number(obj, STOCK_KEYS),
            extra,
        })
    }
}

const PRICE_KEYS: &[&str] = &["price", "sale_price", "retail_price"];
const STOCK_KEYS: &[&str] = &["stock", "quantity", "qty", "balance"];

/// First non-empty textual value among `keys`. Numbers are accepted and
/// rendered as text (barcodes often arrive as numbers).
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First numeric value among `keys`, coercing numeric strings.
fn first_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// JSON keys feeding each [`Entity`] field, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldKeys {
    pub name: &'static [&'static str],
    pub code: &'static [&'static str],
    pub secondary: &'static [&'static str],
    pub category: &'static [&'static str],
}

/// Which back-office entity a selector picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Customer,
    Supplier,
    Warehouse,
    Employee,
    Branch,
    Vehicle,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Product,
        EntityKind::Customer,
        EntityKind::Supplier,
        EntityKind::Warehouse,
        EntityKind::Employee,
        EntityKind::Branch,
        EntityKind::Vehicle,
    ];

    pub fn singular(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Customer => "customer",
            EntityKind::Supplier => "supplier",
            EntityKind::Warehouse => "warehouse",
            EntityKind::Employee => "employee",
            EntityKind::Branch => "branch",
            EntityKind::Vehicle => "vehicle",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Customer => "customers",
            EntityKind::Supplier => "suppliers",
            EntityKind::Warehouse => "warehouses",
            EntityKind::Employee => "employees",
            EntityKind::Branch => "branches",
            EntityKind::Vehicle => "vehicles",
        }
    }

    /// Default search endpoint path, relative to the configured base URL.
    pub fn endpoint_path(self) -> String {
        format!("/api/{}/search", self.plural())
    }

    /// Whether price and stock columns mean anything for this kind.
    pub fn has_pricing(self) -> bool {
        matches!(self, EntityKind::Product)
    }

    pub fn fields(self) -> FieldKeys {
        match self {
            EntityKind::Product => FieldKeys {
                name: &["name", "title"],
                code: &["sku", "code", "article"],
                secondary: &["barcode", "ean"],
                category: &["category_name", "category"],
            },
            EntityKind::Customer | EntityKind::Supplier => FieldKeys {
                name: &["name", "full_name", "company_name"],
                code: &["code", "tax_id"],
                secondary: &["phone", "mobile", "email"],
                category: &["group_name", "type"],
            },
            EntityKind::Employee => FieldKeys {
                name: &["full_name", "name"],
                code: &["code", "employee_number"],
                secondary: &["phone", "email"],
                category: &["position", "department"],
            },
            EntityKind::Warehouse | EntityKind::Branch => FieldKeys {
                name: &["name"],
                code: &["code"],
                secondary: &["phone", "address"],
                category: &["city"],
            },
            EntityKind::Vehicle => FieldKeys {
                name: &["plate_number", "name"],
                code: &["vin", "code"],
                secondary: &["model", "owner_phone"],
                category: &["make", "brand"],
            },
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.singular())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.singular() == s || k.plural() == s)
            .ok_or_else(|| format!("unknown entity kind: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Caller-supplied filters that narrow a remote search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Extra query parameters, e.g. `("service_type", "repair")`.
    pub params: Vec<(String, String)>,
    /// Only keep entities with positive stock.
    pub in_stock_only: bool,
}

impl Scope {
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    /// Query parameters to send, including the stock flag.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if self.in_stock_only {
            pairs.push(("in_stock", "1"));
        }
        pairs
    }

    /// Apply the client-side part of the scope to a response.
    pub fn retain(&self, entities: &mut Vec<Entity>) {
        if self.in_stock_only {
            entities.retain(Entity::in_stock);
        }
    }
}

/// Normalise a query for comparison or transmission: trimmed, lowercase.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
