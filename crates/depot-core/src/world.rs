//! The world-state value model shared by actions, goals, and the state store.
//!
//! A [`WorldState`] is an ordered map from state key to [`StateValue`]. Goals and
//! action preconditions are expressed as [`Requirement`]s over those keys: either
//! a plain value (equality) or a [`Predicate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// A single fact in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Ordered list of identifiers (SKUs, order ids, ...).
    List(Vec<String>),
}

impl StateValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view used by ordering predicates: numbers compare by value,
    /// lists by length.
    fn magnitude(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::List(items) => Some(items.len() as f64),
            _ => None,
        }
    }

    fn is_empty_value(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&StateValue> for StateValue {
    fn from(v: &StateValue) -> Self {
        v.clone()
    }
}

impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for StateValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for StateValue {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for StateValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for StateValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<String>> for StateValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for StateValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(String::from).collect())
    }
}

/// A predicate over a single state value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    Eq { value: StateValue },
    Ne { value: StateValue },
    /// Number (or list length) at least `value`.
    Gte { value: f64 },
    /// Number (or list length) at most `value`.
    Lte { value: f64 },
    /// Empty list/string, or key absent.
    Empty,
    NotEmpty,
}

/// What a goal or precondition demands of one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirement {
    Predicate(Predicate),
    /// Plain value: equality.
    Value(StateValue),
}

impl Requirement {
    /// Check the requirement against the current value of its key (`None` when
    /// the key is absent).
    pub fn is_satisfied_by(&self, current: Option<&StateValue>) -> bool {
        match self {
            Self::Value(expected) | Self::Predicate(Predicate::Eq { value: expected }) => {
                current == Some(expected)
            }
            Self::Predicate(Predicate::Ne { value }) => current != Some(value),
            Self::Predicate(Predicate::Gte { value }) => current
                .and_then(StateValue::magnitude)
                .is_some_and(|m| m >= *value),
            Self::Predicate(Predicate::Lte { value }) => current
                .and_then(StateValue::magnitude)
                .is_some_and(|m| m <= *value),
            Self::Predicate(Predicate::Empty) => current.is_none_or(StateValue::is_empty_value),
            Self::Predicate(Predicate::NotEmpty) => {
                current.is_some_and(|v| !v.is_empty_value())
            }
        }
    }

    /// Whether setting the key to `value` satisfies this requirement.
    pub fn accepts(&self, value: &StateValue) -> bool {
        self.is_satisfied_by(Some(value))
    }

    /// The single value this requirement pins the key to, if any.
    pub fn exact_value(&self) -> Option<&StateValue> {
        match self {
            Self::Value(v) | Self::Predicate(Predicate::Eq { value: v }) => Some(v),
            _ => None,
        }
    }

    /// Two requirements on the same key that can never hold together.
    ///
    /// Only detected when at least one side pins an exact value; predicate pairs
    /// are assumed compatible.
    pub fn conflicts_with(&self, other: &Requirement) -> bool {
        match (self.exact_value(), other.exact_value()) {
            (Some(a), _) => !other.accepts(a),
            (None, Some(b)) => !self.accepts(b),
            (None, None) => false,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) | Self::Predicate(Predicate::Eq { value: v }) => write!(f, "== {v}"),
            Self::Predicate(Predicate::Ne { value }) => write!(f, "!= {value}"),
            Self::Predicate(Predicate::Gte { value }) => write!(f, ">= {value}"),
            Self::Predicate(Predicate::Lte { value }) => write!(f, "<= {value}"),
            Self::Predicate(Predicate::Empty) => write!(f, "is empty"),
            Self::Predicate(Predicate::NotEmpty) => write!(f, "is not empty"),
        }
    }
}

impl From<Predicate> for Requirement {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

macro_rules! requirement_from_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Requirement {
                fn from(v: $t) -> Self {
                    Self::Value(v.into())
                }
            }
        )*
    };
}

requirement_from_value!(StateValue, bool, f64, i64, &str, String, Vec<String>, Vec<&str>);

/// A requirement bound to its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub requirement: Requirement,
}

impl Condition {
    pub fn new(key: impl Into<String>, requirement: impl Into<Requirement>) -> Self {
        Self {
            key: key.into(),
            requirement: requirement.into(),
        }
    }

    pub fn is_satisfied_by(&self, state: &WorldState) -> bool {
        self.requirement.is_satisfied_by(state.get(&self.key))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.requirement)
    }
}

/// A (possibly partial) world state: the canonical store contents, an action's
/// effects, or a snapshot held by an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldState(BTreeMap<String, StateValue>);

impl WorldState {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, StateValue> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Merge `effects` into this state, last writer wins per key.
    pub fn merge(&mut self, effects: &WorldState) {
        for (key, value) in effects.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// A copy of this state with `effects` merged in.
    pub fn merged(&self, effects: &WorldState) -> WorldState {
        let mut next = self.clone();
        next.merge(effects);
        next
    }

    /// Whether every requirement in `target` holds.
    pub fn satisfies(&self, target: &BTreeMap<String, Requirement>) -> bool {
        target
            .iter()
            .all(|(key, req)| req.is_satisfied_by(self.get(key)))
    }

    /// The first requirement in `target` that does not hold.
    pub fn first_unsatisfied(&self, target: &BTreeMap<String, Requirement>) -> Option<Condition> {
        target
            .iter()
            .find(|(key, req)| !req.is_satisfied_by(self.get(key)))
            .map(|(key, req)| Condition::new(key.clone(), req.clone()))
    }
}

impl FromIterator<(String, StateValue)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (String, StateValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, StateValue>> for WorldState {
    fn from(map: BTreeMap<String, StateValue>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a WorldState {
    type Item = (&'a String, &'a StateValue);
    type IntoIter = btree_map::Iter<'a, String, StateValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
