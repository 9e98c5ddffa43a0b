use serde::{Deserialize, Deserializer, Serialize};

use crate::config::CutConfig;

/// Bucket key shared by every demand or stock record without a usable type.
pub const UNSPECIFIED: &str = "unspecified";

/// Accepts any JSON number that is a non-negative whole value fitting in `u32`
/// (`1000` and `1000.0` both work; `-1` and `12.5` do not).
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_u64() {
        return u32::try_from(n).map_err(|_| D::Error::custom(format!("{n} is out of range")));
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative whole number, got {number}"
        ))),
    }
}

/// A need for `qty` cut pieces of `length`, of material `tube_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    #[serde(rename = "type", default)]
    pub tube_type: String,
    #[serde(alias = "len", deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
}

impl Demand {
    pub fn new(tube_type: impl Into<String>, length: u32, qty: u32) -> Self {
        Self {
            tube_type: tube_type.into(),
            length,
            qty,
        }
    }
}

/// `qty` raw pieces of `length` available for cutting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(rename = "type", default)]
    pub tube_type: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
}

impl Stock {
    pub fn new(tube_type: impl Into<String>, length: u32, qty: u32) -> Self {
        Self {
            tube_type: tube_type.into(),
            length,
            qty,
        }
    }
}

/// One physical stock piece. Default units stand for an unlimited supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockUnit {
    pub length: u32,
    pub is_default: bool,
}

impl StockUnit {
    pub fn new(length: u32) -> Self {
        Self {
            length,
            is_default: false,
        }
    }

    pub fn default_length(length: u32) -> Self {
        Self {
            length,
            is_default: true,
        }
    }
}

/// Items chosen for a single container by the optimizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub items: Vec<u32>,
    pub used: u32,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_group(self, stock_length: u32) -> Group {
        Group {
            items: self.items,
            used: self.used,
            stock_length,
        }
    }
}

/// The cutting plan of one physical stock piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub items: Vec<u32>,
    pub used: u32,
    pub stock_length: u32,
}

impl Group {
    pub fn new(stock_length: u32) -> Self {
        Self {
            items: Vec::new(),
            used: 0,
            stock_length,
        }
    }

    pub fn push(&mut self, length: u32) {
        self.items.push(length);
        self.used += length;
    }

    /// Offcut left on the piece, zero for over-capacity groups.
    pub fn remainder(&self) -> u32 {
        self.stock_length.saturating_sub(self.used)
    }

    /// True when a single demand was longer than any stock that could take it.
    pub fn is_over_capacity(&self) -> bool {
        self.used > self.stock_length
    }
}

/// All groups formed for one tube type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutResult {
    pub stock_type: String,
    /// Representative length for display; individual groups carry their own.
    pub stock_length: u32,
    pub groups: Vec<Group>,
}

impl CutResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn piece_count(&self) -> usize {
        self.groups.len()
    }
}

/// A complete allocation request as read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub stocks: Vec<Stock>,
    pub demands: Vec<Demand>,
    #[serde(default)]
    pub config: CutConfig,
}

/// Type-keyed collection that remembers the order keys were first seen in,
/// so runs over the same input always visit buckets in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Buckets<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.position(key).map(|i| self.entries[i].1.as_slice())
    }

    /// Returns the bucket for `key`, appending an empty one if it is new.
    pub fn entry(&mut self, key: &str) -> &mut Vec<T> {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<T>> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<T>)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Inserts `key` at `index` (clamped), or replaces its items in place.
    pub(crate) fn insert_at(&mut self, index: usize, key: &str, items: Vec<T>) {
        match self.position(key) {
            Some(i) => self.entries[i].1 = items,
            None => {
                let index = index.min(self.entries.len());
                self.entries.insert(index, (key.to_string(), items));
            }
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}
