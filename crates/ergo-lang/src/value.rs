use std::collections::BTreeMap;
use std::fmt;

/// A concrete value produced by literal evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

/// Outcome of resolving an expression. `Unknown` is contagious: anything
/// computed from it is `Unknown` as well.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResolvedValue {
    #[default]
    Unknown,
    Known(Literal),
}

/// Resolved variables of one document, keyed by variable name.
pub type ConfigDict = BTreeMap<String, Literal>;

impl Literal {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
        }
    }

    /// Lookup in a mapping with string keys.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        let Self::Dict(pairs) = self else {
            return None;
        };
        pairs
            .iter()
            .rev()
            .find(|(candidate, _)| candidate.as_str() == Some(key))
            .map(|(_, value)| value)
    }

    /// True when a string anywhere inside still carries a `%(...)s`
    /// placeholder.
    pub fn contains_template(&self) -> bool {
        match self {
            Self::Str(value) => has_template_placeholder(value),
            Self::List(items) | Self::Tuple(items) => items.iter().any(Literal::contains_template),
            Self::Dict(pairs) => pairs
                .iter()
                .any(|(key, value)| key.contains_template() || value.contains_template()),
            _ => false,
        }
    }

    /// Approximate in-memory size: string bytes plus one per scalar and
    /// per container slot.
    pub fn weight(&self) -> usize {
        match self {
            Self::Str(value) => value.len().max(1),
            Self::List(items) | Self::Tuple(items) => Self::weight_of(items).saturating_add(1),
            Self::Dict(pairs) => pairs.iter().fold(1usize, |total, (key, value)| {
                total
                    .saturating_add(key.weight())
                    .saturating_add(value.weight())
            }),
            _ => 1,
        }
    }

    pub fn weight_of(items: &[Literal]) -> usize {
        items
            .iter()
            .fold(0usize, |total, item| total.saturating_add(item.weight()))
    }

    /// Python `repr()`.
    pub fn repr(&self) -> String {
        match self {
            Self::Str(value) => {
                let escaped = value
                    .replace('\\', "\\\\")
                    .replace('\'', "\\'")
                    .replace('\n', "\\n")
                    .replace('\t', "\\t");
                format!("'{escaped}'")
            }
            Self::List(items) => format!("[{}]", join_repr(items)),
            Self::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Self::Tuple(items) => format!("({})", join_repr(items)),
            Self::Dict(pairs) => {
                let body = pairs
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.repr(), value.repr()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{body}}}")
            }
            other => other.to_string(),
        }
    }
}

fn join_repr(items: &[Literal]) -> String {
    items.iter().map(Literal::repr).collect::<Vec<_>>().join(", ")
}

pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        value.to_string()
    }
}

/// Python `str()`.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_float(*value)),
            Self::Str(value) => f.write_str(value),
            other => f.write_str(&other.repr()),
        }
    }
}

pub fn has_template_placeholder(text: &str) -> bool {
    let Some(open) = text.find("%(") else {
        return false;
    };
    text[open + 2..].contains(")s")
}

impl ResolvedValue {
    pub fn known(&self) -> Option<&Literal> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.known().and_then(Literal::as_str)
    }
}

impl TryFrom<toml::Value> for Literal {
    type Error = toml::Value;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            toml::Value::String(raw) => Self::Str(raw),
            toml::Value::Integer(raw) => Self::Int(raw),
            toml::Value::Float(raw) => Self::Float(raw),
            toml::Value::Boolean(raw) => Self::Bool(raw),
            toml::Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Literal::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            toml::Value::Table(table) => Self::Dict(
                table
                    .into_iter()
                    .map(|(key, value)| Ok((Literal::Str(key), Literal::try_from(value)?)))
                    .collect::<Result<Vec<_>, toml::Value>>()?,
            ),
            other @ toml::Value::Datetime(_) => return Err(other),
        })
    }
}
