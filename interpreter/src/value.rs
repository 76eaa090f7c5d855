use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Not, Sub};
use std::rc::Rc;

use ahash::AHasher;
use fro_core::Type;
use indexmap::IndexMap;

use crate::callable::{Builtin, Function};

/// Entries of a hash value, in insertion order.
pub type Pairs = IndexMap<HashKey, HashPair>;

// Arrays and hashes are never mutated after construction, builtins like `push` build new ones.
// Sharing them through an `Rc` makes copying a value cheap and gives `==` its identity semantics.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Str(Rc<String>),
    Boolean(bool),
    Array(Rc<Vec<Value>>),
    Hash(Rc<Pairs>),
    Null,
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
    Error(Rc<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Float,
    String,
    Boolean,
    Array,
    Hash,
    Null,
    Function,
    Builtin,
    Error,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Integer => "INTEGER",
            Kind::Float => "FLOAT",
            Kind::String => "STRING",
            Kind::Boolean => "BOOLEAN",
            Kind::Array => "ARRAY",
            Kind::Hash => "HASH",
            Kind::Null => "NULL",
            Kind::Function => "FUNCTION",
            Kind::Builtin => "BUILTIN",
            Kind::Error => "ERROR",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form of a hashable value. Values that are `==` produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    kind: Kind,
    hash: u64,
}

impl HashKey {
    fn new(kind: Kind, hash: u64) -> Self {
        HashKey { kind, hash }
    }
}

/// The original key is kept next to the value so `keys` and rendering can show it.
#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

// Float that holds an integer representable as i64, compared and hashed as that integer
fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::String,
            Value::Boolean(_) => Kind::Boolean,
            Value::Array(_) => Kind::Array,
            Value::Hash(_) => Kind::Hash,
            Value::Null => Kind::Null,
            Value::Function(_) => Kind::Function,
            Value::Builtin(_) => Kind::Builtin,
            Value::Error(_) => Kind::Error,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(value) => *value,
            Value::Integer(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::Array(elements) => !elements.is_empty(),
            Value::Hash(pairs) => !pairs.is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
            Value::Null | Value::Error(_) => false,
        }
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(value) => Some(HashKey::new(Kind::Integer, *value as u64)),
            Value::Float(value) => match integral(*value) {
                Some(value) => Some(HashKey::new(Kind::Integer, value as u64)),
                None => Some(HashKey::new(Kind::Float, value.to_bits())),
            },
            Value::Str(value) => {
                let mut hasher = AHasher::default();
                value.hash(&mut hasher);
                Some(HashKey::new(Kind::String, hasher.finish()))
            }
            Value::Boolean(value) => Some(HashKey::new(Kind::Boolean, *value as u64)),
            _ => None,
        }
    }

    /// Elements visited by a `for` loop: characters of a string, items of an array or keys of a
    /// hash. `None` for values that cannot be iterated.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Str(value) => Some(value.chars().map(Value::from).collect()),
            Value::Array(elements) => Some(elements.as_ref().clone()),
            Value::Hash(pairs) => Some(pairs.values().map(|pair| pair.key.clone()).collect()),
            _ => None,
        }
    }

    pub(crate) fn error(msg: impl Into<String>) -> Self {
        Value::Error(Rc::new(msg.into()))
    }

    pub(crate) fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(elements))
    }

    pub(crate) fn hash(pairs: Pairs) -> Self {
        Value::Hash(Rc::new(pairs))
    }

    /// Implements `in`. Hashes test for the key, strings and arrays for an element `==` to the
    /// needle.
    pub(crate) fn contains(&self, needle: &Value) -> Result<bool, String> {
        match self {
            Value::Hash(pairs) => Ok(needle
                .hash_key()
                .map_or(false, |key| pairs.contains_key(&key))),
            Value::Array(elements) => Ok(elements.iter().any(|element| element == needle)),
            Value::Str(haystack) => Ok(matches!(
                needle,
                Value::Str(needle) if needle.chars().count() == 1 && haystack.contains(needle.as_str())
            )),
            _ => Err(format!("Invalid operand: in {}", self.kind())),
        }
    }

    pub(crate) fn index(&self, index: &Value) -> Result<Value, String> {
        match (self, index) {
            (Value::Array(elements), Value::Integer(idx)) => Ok(usize::try_from(*idx)
                .ok()
                .and_then(|idx| elements.get(idx))
                .cloned()
                .unwrap_or(Value::Null)),
            (Value::Str(value), Value::Integer(idx)) => Ok(usize::try_from(*idx)
                .ok()
                .and_then(|idx| value.chars().nth(idx))
                .map_or(Value::Null, Value::from)),
            (Value::Hash(pairs), key) => match key.hash_key() {
                Some(hash_key) => Ok(pairs
                    .get(&hash_key)
                    .map_or(Value::Null, |pair| pair.value.clone())),
                None => Err(format!("Key: {} cannot be hashed", key.kind())),
            },
            _ => Err(format!(
                "Index operation not supported for: {}[{}]",
                self.kind(),
                index.kind()
            )),
        }
    }

    /// Ordering operators, defined for numbers only.
    pub(crate) fn compare(&self, operator: Type, other: &Value) -> Result<Value, String> {
        let ordering = match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs.partial_cmp(rhs),
            (Value::Integer(lhs), Value::Float(rhs)) => (*lhs as f64).partial_cmp(rhs),
            (Value::Float(lhs), Value::Integer(rhs)) => lhs.partial_cmp(&(*rhs as f64)),
            (Value::Float(lhs), Value::Float(rhs)) => lhs.partial_cmp(rhs),
            _ => return Err(self.operator_error(operator.as_str(), other)),
        };

        // NaN is not ordered against anything
        let result = ordering.map_or(false, |ordering| match operator {
            Type::Less => ordering.is_lt(),
            Type::LessEqual => ordering.is_le(),
            Type::Greater => ordering.is_gt(),
            _ => ordering.is_ge(),
        });
        Ok(Value::Boolean(result))
    }

    pub(crate) fn operator_error(&self, operator: &str, other: &Value) -> String {
        if self.kind() != other.kind() {
            format!(
                "Type mismatch: {} {} {}",
                self.kind(),
                operator,
                other.kind()
            )
        } else {
            format!(
                "Unknown operator: {} {} {}",
                self.kind(),
                operator,
                other.kind()
            )
        }
    }

    fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    // Both operands as floats, used once at least one of them is a float
    fn promote(&self, other: &Value) -> Option<(f64, f64)> {
        let as_float = |value: &Value| match value {
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        };

        if self.is_number() && other.is_number() {
            Some((as_float(self)?, as_float(other)?))
        } else {
            None
        }
    }
}

fn overflow(lhs: i64, operator: &str, rhs: i64) -> String {
    format!("Integer overflow: {} {} {}", lhs, operator, rhs)
}

impl PartialEq for Value {
    // This is the language's `==`: numbers by value across kinds, strings by content and the
    // remaining compound values by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs == rhs,
            (Value::Float(lhs), Value::Float(rhs)) => lhs == rhs,
            (Value::Integer(lhs), Value::Float(rhs)) | (Value::Float(rhs), Value::Integer(lhs)) => {
                integral(*rhs) == Some(*lhs)
            }
            (Value::Str(lhs), Value::Str(rhs)) => lhs == rhs,
            (Value::Boolean(lhs), Value::Boolean(rhs)) => lhs == rhs,
            (Value::Null, Value::Null) => true,
            (Value::Array(lhs), Value::Array(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Hash(lhs), Value::Hash(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Builtin(lhs), Value::Builtin(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Error(lhs), Value::Error(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

impl Add for Value {
    type Output = Result<Value, String>;

    fn add(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_add(*rhs)
                .map(Value::Integer)
                .ok_or_else(|| overflow(*lhs, "+", *rhs)),
            (Value::Str(lhs), Value::Str(rhs)) => Ok(Value::from(format!("{}{}", lhs, rhs))),
            _ => match self.promote(&rhs) {
                Some((lhs, rhs)) => Ok(Value::Float(lhs + rhs)),
                None => Err(self.operator_error("+", &rhs)),
            },
        }
    }
}

impl Sub for Value {
    type Output = Result<Value, String>;

    fn sub(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_sub(*rhs)
                .map(Value::Integer)
                .ok_or_else(|| overflow(*lhs, "-", *rhs)),
            _ => match self.promote(&rhs) {
                Some((lhs, rhs)) => Ok(Value::Float(lhs - rhs)),
                None => Err(self.operator_error("-", &rhs)),
            },
        }
    }
}

impl Mul for Value {
    type Output = Result<Value, String>;

    fn mul(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_mul(*rhs)
                .map(Value::Integer)
                .ok_or_else(|| overflow(*lhs, "*", *rhs)),
            _ => match self.promote(&rhs) {
                Some((lhs, rhs)) => Ok(Value::Float(lhs * rhs)),
                None => Err(self.operator_error("*", &rhs)),
            },
        }
    }
}

impl Div for Value {
    type Output = Result<Value, String>;

    fn div(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Integer(_), Value::Integer(0)) => Err(String::from("Division by zero")),
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_div(*rhs)
                .map(Value::Integer)
                .ok_or_else(|| overflow(*lhs, "/", *rhs)),
            _ => match self.promote(&rhs) {
                Some((_, rhs)) if rhs == 0.0 => Err(String::from("Division by zero")),
                Some((lhs, rhs)) => Ok(Value::Float(lhs / rhs)),
                None => Err(self.operator_error("/", &rhs)),
            },
        }
    }
}

impl Neg for Value {
    type Output = Result<Value, String>;

    fn neg(self) -> Self::Output {
        match self {
            Value::Integer(value) => value
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| format!("Integer overflow: -({})", value)),
            Value::Float(value) => Ok(Value::Float(-value)),
            _ => Err(format!("Invalid operand: -{}", self.kind())),
        }
    }
}

impl Not for Value {
    type Output = Value;

    fn not(self) -> Self::Output {
        Value::Boolean(!self.is_truthy())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(Rc::new(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::new(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Rc::new(String::from(value)))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::array(value)
    }
}

macro_rules! impl_from_int_for_value {
    ( $( $t:ident )* ) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Value {
                    Value::Integer(n as i64)
                }
            }
        )*
    }
}

impl_from_int_for_value!(u8 i8 u16 i16 u32 i32 i64 usize);

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            // Debug keeps the fractional part of whole floats, `2.0` rather than `2`
            Value::Float(value) => write!(f, "{:?}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Hash(pairs) => {
                write!(f, "{{")?;
                for (idx, pair) in pairs.values().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Value::Null => write!(f, "null"),
            Value::Function(function) => write!(f, "{}", function),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
            Value::Error(msg) => write!(f, "ERROR: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use fro_core::Type;
    use indexmap::IndexMap;

    use crate::value::{HashPair, Kind, Value};

    fn hash_of(entries: &[(Value, Value)]) -> Value {
        let mut pairs = IndexMap::new();
        for (key, value) in entries {
            pairs.insert(
                key.hash_key().unwrap(),
                HashPair {
                    key: key.clone(),
                    value: value.clone(),
                },
            );
        }
        Value::hash(pairs)
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::from(2), Value::from(2.0));
        assert_ne!(Value::from(2), Value::from(2.1));
        assert_eq!(Value::from("abc"), Value::from("abc"));
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::from(1), Value::from(true));
        assert_ne!(Value::from("1"), Value::from(1));

        let array = Value::from(vec![Value::from(1), Value::from(2)]);
        assert_eq!(array, array.clone());
        assert_ne!(array, Value::from(vec![Value::from(1), Value::from(2)]));
    }

    #[test]
    fn test_equal_values_share_hash_keys() {
        assert_eq!(Value::from(2).hash_key(), Value::from(2.0).hash_key());
        assert_eq!(Value::from(-7).hash_key(), Value::from(-7.0).hash_key());
        assert_ne!(Value::from(2).hash_key(), Value::from(2.5).hash_key());
        assert_eq!(Value::from("key").hash_key(), Value::from("key").hash_key());
        assert_ne!(Value::from("key").hash_key(), Value::from("yek").hash_key());
        assert_ne!(Value::from(1).hash_key(), Value::from(true).hash_key());
        assert_eq!(Value::Null.hash_key(), None);
        assert_eq!(Value::array(vec![]).hash_key(), None);
    }

    #[test]
    fn test_truthiness() {
        let tests = [
            (Value::from(true), true),
            (Value::from(false), false),
            (Value::from(0), false),
            (Value::from(-3), true),
            (Value::from(0.0), false),
            (Value::from(""), false),
            (Value::from("a"), true),
            (Value::array(vec![]), false),
            (Value::from(vec![Value::Null]), true),
            (hash_of(&[]), false),
            (Value::Null, false),
            (Value::error("boom"), false),
        ];

        for (value, expected) in tests {
            assert_eq!(value.is_truthy(), expected, "{}", value);
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!((Value::from(7) / Value::from(2)).unwrap(), Value::from(3));
        assert!(matches!(
            Value::from(7) / Value::from(2.0),
            Ok(Value::Float(value)) if value == 3.5
        ));
        assert!(matches!(
            Value::from(1.5) + Value::from(1),
            Ok(Value::Float(value)) if value == 2.5
        ));
        assert_eq!(
            (Value::from("foo") + Value::from("bar")).unwrap(),
            Value::from("foobar")
        );
        assert_eq!(
            (Value::from(1) / Value::from(0)).unwrap_err(),
            "Division by zero"
        );
        assert_eq!(
            (Value::from(1.0) / Value::from(0)).unwrap_err(),
            "Division by zero"
        );
        assert_eq!(
            (Value::from(i64::MAX) + Value::from(1)).unwrap_err(),
            format!("Integer overflow: {} + 1", i64::MAX)
        );
        assert_eq!(
            (Value::from(1) + Value::from("a")).unwrap_err(),
            "Type mismatch: INTEGER + STRING"
        );
        assert_eq!(
            (Value::from(true) * Value::from(false)).unwrap_err(),
            "Unknown operator: BOOLEAN * BOOLEAN"
        );
        assert_eq!(
            (-Value::from("a")).unwrap_err(),
            "Invalid operand: -STRING"
        );
        assert_eq!(!Value::from(""), Value::from(true));
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::from(1).compare(Type::Less, &Value::from(1.5)),
            Ok(Value::from(true))
        );
        assert_eq!(
            Value::from(2).compare(Type::GreaterEqual, &Value::from(2)),
            Ok(Value::from(true))
        );
        assert_eq!(
            Value::from(f64::NAN).compare(Type::Less, &Value::from(1)),
            Ok(Value::from(false))
        );
        assert_eq!(
            Value::from("a").compare(Type::Less, &Value::from("b")),
            Err(String::from("Unknown operator: STRING < STRING"))
        );
    }

    #[test]
    fn test_index() {
        let array = Value::from(vec![Value::from(1), Value::from(2)]);
        assert_eq!(array.index(&Value::from(1)), Ok(Value::from(2)));
        assert_eq!(array.index(&Value::from(2)), Ok(Value::Null));
        assert_eq!(array.index(&Value::from(-1)), Ok(Value::Null));

        let string = Value::from("héllo");
        assert_eq!(string.index(&Value::from(1)), Ok(Value::from("é")));
        assert_eq!(string.index(&Value::from(10)), Ok(Value::Null));

        let hash = hash_of(&[(Value::from(1), Value::from("one"))]);
        assert_eq!(hash.index(&Value::from(1.0)), Ok(Value::from("one")));
        assert_eq!(hash.index(&Value::from(2)), Ok(Value::Null));
        assert_eq!(
            hash.index(&Value::array(vec![])),
            Err(String::from("Key: ARRAY cannot be hashed"))
        );
        assert_eq!(
            Value::from(1).index(&Value::from(0)),
            Err(String::from("Index operation not supported for: INTEGER[INTEGER]"))
        );
    }

    #[test]
    fn test_contains() {
        let hash = hash_of(&[(Value::from("a"), Value::from(1))]);
        assert_eq!(hash.contains(&Value::from("a")), Ok(true));
        assert_eq!(hash.contains(&Value::array(vec![])), Ok(false));
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from(2)]).contains(&Value::from(2.0)),
            Ok(true)
        );
        assert_eq!(Value::from("abc").contains(&Value::from("b")), Ok(true));
        assert_eq!(Value::from("abc").contains(&Value::from("ab")), Ok(false));
        assert_eq!(
            Value::from(1).contains(&Value::from(1)),
            Err(String::from("Invalid operand: in INTEGER"))
        );
    }

    #[test]
    fn test_elements() {
        let hash = hash_of(&[
            (Value::from("b"), Value::from(1)),
            (Value::from("a"), Value::from(2)),
        ]);
        assert_eq!(
            hash.elements().unwrap(),
            vec![Value::from("b"), Value::from("a")]
        );
        assert_eq!(
            Value::from("ab").elements().unwrap(),
            vec![Value::from("a"), Value::from("b")]
        );
        assert!(Value::from(1).elements().is_none());
    }

    #[test]
    fn test_display() {
        let hash = hash_of(&[
            (Value::from("a"), Value::from(1)),
            (Value::from(2), Value::from(vec![Value::from(true)])),
        ]);

        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from(0.1).to_string(), "0.1");
        assert_eq!(Value::from("raw").to_string(), "raw");
        assert_eq!(hash.to_string(), "{a: 1, 2: [true]}");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::error("boom").to_string(), "ERROR: boom");
        assert_eq!(Value::array(vec![]).kind(), Kind::Array);
    }
}
