//! Constrained literal evaluation.
//!
//! Only literal construction (strings, numbers, lists, tuples, mappings),
//! name lookup in the resolved environment, arithmetic on those literals
//! and `%` string formatting are understood. Anything else is an
//! [`EvalError`] and resolves to [`ResolvedValue::Unknown`].

use std::collections::BTreeMap;

use thiserror::Error;
use tree_sitter::Node;

use crate::extract::AssignmentMap;
use crate::query::StructuralQuery;
use crate::syntax::{SyntaxTree, kind, operands};
use crate::value::{ConfigDict, Literal, ResolvedValue};

/// Named constants available to every expression, such as `SYSTEM`.
pub type Constants = BTreeMap<String, Literal>;

const MAX_DEPTH: usize = 128;
const MAX_REPEAT_LEN: usize = 1 << 20;
/// Largest width or precision a `%` conversion may ask for.
const MAX_FORMAT_WIDTH: usize = u16::MAX as usize;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("unsupported expression `{0}`")]
    Unsupported(String),
    #[error("name `{0}` is not defined")]
    Unbound(String),
    #[error("unsupported operand types for {op}: {left} and {right}")]
    Operands {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("malformed literal `{0}`")]
    Malformed(String),
    #[error("arithmetic overflow or division by zero")]
    Arithmetic,
    #[error("string formatting failed: {0}")]
    Format(String),
    #[error("expression nested too deeply")]
    TooDeep,
}

/// The safety gate between syntax and concrete values.
pub struct Resolver<'a> {
    tree: &'a SyntaxTree,
    constants: &'a Constants,
    assigned: &'a AssignmentMap<'a>,
    identifiers: &'a StructuralQuery,
}

impl<'a> Resolver<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        constants: &'a Constants,
        assigned: &'a AssignmentMap<'a>,
        identifiers: &'a StructuralQuery,
    ) -> Self {
        Self {
            tree,
            constants,
            assigned,
            identifiers,
        }
    }

    pub fn resolve(&self, node: Node<'_>, env: &ConfigDict) -> ResolvedValue {
        let source = self.tree.source().as_bytes();
        let blocked = self
            .identifiers
            .captures(node, source, "id")
            .into_iter()
            .map(|id| self.tree.text(id))
            .find(|name| self.assigned.contains_key(*name) && !env.contains_key(*name));
        if let Some(name) = blocked {
            tracing::trace!(name, "expression depends on an unresolved variable");
            return ResolvedValue::Unknown;
        }

        match evaluate(self.tree, node, env, self.constants) {
            Ok(value) if value.contains_template() => ResolvedValue::Unknown,
            Ok(value) => ResolvedValue::Known(value),
            Err(err) => {
                tracing::trace!(%err, text = self.tree.text(node), "expression left unresolved");
                ResolvedValue::Unknown
            }
        }
    }
}

/// Evaluate `node` with `env` and `constants` as the only bindings.
pub fn evaluate(
    tree: &SyntaxTree,
    node: Node<'_>,
    env: &ConfigDict,
    constants: &Constants,
) -> Result<Literal, EvalError> {
    Evaluator {
        tree,
        env,
        constants,
    }
    .eval(node, 0)
}

struct Evaluator<'a> {
    tree: &'a SyntaxTree,
    env: &'a ConfigDict,
    constants: &'a Constants,
}

impl Evaluator<'_> {
    fn eval(&self, node: Node<'_>, depth: usize) -> Result<Literal, EvalError> {
        if depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        let text = self.tree.text(node);
        match node.kind() {
            kind::STRING => parse_string(text),
            kind::CONCATENATED_STRING => {
                let mut out = String::new();
                for part in operands(node) {
                    match self.eval(part, depth + 1)? {
                        Literal::Str(value) => out.push_str(&value),
                        _ => return Err(EvalError::Malformed(text.to_string())),
                    }
                }
                Ok(Literal::Str(out))
            }
            kind::INTEGER => parse_int(text),
            kind::FLOAT => parse_float(text),
            kind::TRUE => Ok(Literal::Bool(true)),
            kind::FALSE => Ok(Literal::Bool(false)),
            kind::NONE => Ok(Literal::None),
            kind::LIST => Ok(Literal::List(self.eval_all(node, depth)?)),
            kind::TUPLE => Ok(Literal::Tuple(self.eval_all(node, depth)?)),
            kind::DICTIONARY => {
                let mut pairs = Vec::new();
                for pair in operands(node) {
                    if pair.kind() != kind::PAIR {
                        return Err(EvalError::Unsupported(self.tree.text(pair).to_string()));
                    }
                    let key = self.field(pair, "key", depth)?;
                    let value = self.field(pair, "value", depth)?;
                    pairs.push((key, value));
                }
                Ok(Literal::Dict(pairs))
            }
            kind::PARENTHESIZED_EXPRESSION => match operands(node).as_slice() {
                [inner] => self.eval(*inner, depth + 1),
                _ => Err(EvalError::Unsupported(text.to_string())),
            },
            kind::IDENTIFIER => self
                .env
                .get(text)
                .or_else(|| self.constants.get(text))
                .cloned()
                .ok_or_else(|| EvalError::Unbound(text.to_string())),
            kind::BINARY_OPERATOR => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|op| op.kind())
                    .ok_or_else(|| EvalError::Malformed(text.to_string()))?;
                let left = self.field(node, "left", depth)?;
                let right = self.field(node, "right", depth)?;
                binary(op, left, right)
            }
            kind::UNARY_OPERATOR => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|op| op.kind())
                    .ok_or_else(|| EvalError::Malformed(text.to_string()))?;
                let argument = self.field(node, "argument", depth)?;
                unary(op, argument)
            }
            kind::CALL => self.eval_call(node, depth),
            _ => Err(EvalError::Unsupported(text.to_string())),
        }
    }

    fn field(&self, node: Node<'_>, name: &str, depth: usize) -> Result<Literal, EvalError> {
        let child = node
            .child_by_field_name(name)
            .ok_or_else(|| EvalError::Malformed(self.tree.text(node).to_string()))?;
        self.eval(child, depth + 1)
    }

    fn eval_all(&self, node: Node<'_>, depth: usize) -> Result<Vec<Literal>, EvalError> {
        operands(node)
            .into_iter()
            .map(|item| self.eval(item, depth + 1))
            .collect()
    }

    /// Only `dict(...)` is callable: it builds a mapping.
    fn eval_call(&self, node: Node<'_>, depth: usize) -> Result<Literal, EvalError> {
        let text = self.tree.text(node);
        let function = node
            .child_by_field_name("function")
            .filter(|function| function.kind() == kind::IDENTIFIER)
            .map(|function| self.tree.text(function));
        let arguments = node.child_by_field_name("arguments");
        let (Some("dict"), Some(arguments)) = (function, arguments) else {
            return Err(EvalError::Unsupported(text.to_string()));
        };

        let mut pairs = Vec::new();
        for (index, argument) in operands(arguments).into_iter().enumerate() {
            if argument.kind() == kind::KEYWORD_ARGUMENT {
                let name = argument
                    .child_by_field_name("name")
                    .map(|name| self.tree.text(name).to_string())
                    .ok_or_else(|| EvalError::Malformed(text.to_string()))?;
                let value = self.field(argument, "value", depth)?;
                pairs.push((Literal::Str(name), value));
                continue;
            }
            match (index, self.eval(argument, depth + 1)?) {
                (0, Literal::Dict(initial)) => pairs.extend(initial),
                _ => return Err(EvalError::Unsupported(text.to_string())),
            }
        }
        Ok(Literal::Dict(pairs))
    }
}

fn binary(op: &str, left: Literal, right: Literal) -> Result<Literal, EvalError> {
    use Literal::{Bool, Float, Int, List, Str, Tuple};

    match (op, left, right) {
        ("+", Str(left), Str(right)) => {
            bounded_sum(left.len(), right.len())?;
            Ok(Str(left + &right))
        }
        ("+", List(mut left), List(right)) => {
            bounded_sum(Literal::weight_of(&left), Literal::weight_of(&right))?;
            left.extend(right);
            Ok(List(left))
        }
        ("+", Tuple(mut left), Tuple(right)) => {
            bounded_sum(Literal::weight_of(&left), Literal::weight_of(&right))?;
            left.extend(right);
            Ok(Tuple(left))
        }
        ("%", Str(template), args) => format_percent(&template, &args).map(Str),
        ("*", Str(text), Int(count)) | ("*", Int(count), Str(text)) => {
            let count = repeat_count(count, text.len())?;
            Ok(Str(text.repeat(count)))
        }
        ("*", List(items), Int(count)) | ("*", Int(count), List(items)) => {
            let count = repeat_count(count, Literal::weight_of(&items))?;
            Ok(List(items.iter().cloned().cycle().take(items.len() * count).collect()))
        }
        (op, left @ (Int(_) | Float(_) | Bool(_)), right @ (Int(_) | Float(_) | Bool(_))) => {
            arithmetic(op, left, right)
        }
        (op, left, right) => Err(EvalError::Operands {
            op: op.to_string(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

fn bounded_sum(left: usize, right: usize) -> Result<(), EvalError> {
    if left.saturating_add(right) > MAX_REPEAT_LEN {
        return Err(EvalError::Arithmetic);
    }
    Ok(())
}

fn repeat_count(count: i64, unit: usize) -> Result<usize, EvalError> {
    let count = usize::try_from(count.max(0)).map_err(|_| EvalError::Arithmetic)?;
    if count.saturating_mul(unit.max(1)) > MAX_REPEAT_LEN {
        return Err(EvalError::Arithmetic);
    }
    Ok(count)
}

fn arithmetic(op: &str, left: Literal, right: Literal) -> Result<Literal, EvalError> {
    let as_int = |value: &Literal| match value {
        Literal::Int(raw) => Some(*raw),
        Literal::Bool(raw) => Some(i64::from(*raw)),
        _ => None,
    };

    if let (Some(lhs), Some(rhs)) = (as_int(&left), as_int(&right)) {
        let result = match op {
            "+" => lhs.checked_add(rhs),
            "-" => lhs.checked_sub(rhs),
            "*" => lhs.checked_mul(rhs),
            "//" => floor_div(lhs, rhs),
            "%" => python_mod(lhs, rhs),
            "/" if rhs != 0 => return Ok(Literal::Float(lhs as f64 / rhs as f64)),
            "/" => None,
            _ => {
                return Err(EvalError::Operands {
                    op: op.to_string(),
                    left: left.type_name(),
                    right: right.type_name(),
                });
            }
        };
        return result.map(Literal::Int).ok_or(EvalError::Arithmetic);
    }

    let as_float = |value: &Literal| match value {
        Literal::Float(raw) => *raw,
        other => as_int(other).map(|raw| raw as f64).unwrap_or(f64::NAN),
    };
    let (lhs, rhs) = (as_float(&left), as_float(&right));
    let result = match op {
        "+" => lhs + rhs,
        "-" => lhs - rhs,
        "*" => lhs * rhs,
        "/" if rhs != 0.0 => lhs / rhs,
        "//" if rhs != 0.0 => (lhs / rhs).floor(),
        "%" if rhs != 0.0 => lhs - rhs * (lhs / rhs).floor(),
        "/" | "//" | "%" => return Err(EvalError::Arithmetic),
        _ => {
            return Err(EvalError::Operands {
                op: op.to_string(),
                left: left.type_name(),
                right: right.type_name(),
            });
        }
    };
    Ok(Literal::Float(result))
}

fn floor_div(lhs: i64, rhs: i64) -> Option<i64> {
    let quotient = lhs.checked_div(rhs)?;
    if (lhs % rhs != 0) && ((lhs < 0) != (rhs < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn python_mod(lhs: i64, rhs: i64) -> Option<i64> {
    let remainder = lhs.checked_rem(rhs)?;
    if remainder != 0 && ((remainder < 0) != (rhs < 0)) {
        remainder.checked_add(rhs)
    } else {
        Some(remainder)
    }
}

fn unary(op: &str, argument: Literal) -> Result<Literal, EvalError> {
    match (op, argument) {
        ("-", Literal::Int(value)) => value.checked_neg().map(Literal::Int).ok_or(EvalError::Arithmetic),
        ("-", Literal::Float(value)) => Ok(Literal::Float(-value)),
        ("-", Literal::Bool(value)) => Ok(Literal::Int(-i64::from(value))),
        ("+", value @ (Literal::Int(_) | Literal::Float(_))) => Ok(value),
        ("+", Literal::Bool(value)) => Ok(Literal::Int(i64::from(value))),
        ("~", Literal::Int(value)) => Ok(Literal::Int(!value)),
        (op, value) => Err(EvalError::Operands {
            op: op.to_string(),
            left: value.type_name(),
            right: value.type_name(),
        }),
    }
}

fn parse_int(text: &str) -> Result<Literal, EvalError> {
    let cleaned = text.replace('_', "").to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = cleaned.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = cleaned.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = cleaned.strip_prefix("0b") {
        (rest, 2)
    } else {
        (cleaned.as_str(), 10)
    };
    i64::from_str_radix(digits, radix)
        .map(Literal::Int)
        .map_err(|_| EvalError::Malformed(text.to_string()))
}

fn parse_float(text: &str) -> Result<Literal, EvalError> {
    let cleaned = text.replace('_', "");
    if cleaned.ends_with(['j', 'J']) {
        return Err(EvalError::Unsupported(text.to_string()));
    }
    cleaned
        .parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| EvalError::Malformed(text.to_string()))
}

fn parse_string(text: &str) -> Result<Literal, EvalError> {
    let malformed = || EvalError::Malformed(text.to_string());
    let prefix_len = text.find(['\'', '"']).ok_or_else(malformed)?;
    let prefix = text[..prefix_len].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return Err(EvalError::Unsupported(text.to_string()));
    }

    let body = &text[prefix_len..];
    let quote_len = if body.starts_with("\"\"\"") || body.starts_with("'''") {
        3
    } else {
        1
    };
    if body.len() < quote_len * 2 || !body.ends_with(&body[..quote_len]) {
        return Err(malformed());
    }
    let inner = &body[quote_len..body.len() - quote_len];
    if prefix.contains('r') {
        Ok(Literal::Str(inner.to_string()))
    } else {
        unescape(inner).map(Literal::Str).ok_or_else(malformed)
    }
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let escaped = chars.next()?;
        match escaped {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(escaped),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = escaped.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|next| next.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits = (0..width).map(|_| chars.next()).collect::<Option<String>>()?;
                out.push(char::from_u32(u32::from_str_radix(&digits, 16).ok()?)?);
            }
            'N' => return None,
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

#[derive(Debug, Default)]
struct FormatSpec {
    key: Option<String>,
    flags: String,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Python `template % args`.
pub fn format_percent(template: &str, args: &Literal) -> Result<String, EvalError> {
    let positional = match args {
        Literal::Tuple(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    };
    let is_mapping = matches!(args, Literal::Dict(_));

    let mut out = String::with_capacity(template.len());
    let mut next = 0usize;
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let spec = read_spec(&mut chars)?;
        if spec.conversion == '%' && spec.key.is_none() {
            out.push('%');
            continue;
        }

        let value = match spec.key.as_deref() {
            Some(key) => {
                if !is_mapping {
                    return Err(EvalError::Format("format requires a mapping".to_string()));
                }
                args.get(key)
                    .ok_or_else(|| EvalError::Format(format!("missing key `{key}`")))?
            }
            None => {
                let value = positional.get(next).copied().ok_or_else(|| {
                    EvalError::Format("not enough arguments for format string".to_string())
                })?;
                next += 1;
                value
            }
        };
        out.push_str(&render(&spec, value)?);
        if out.len() > MAX_REPEAT_LEN {
            return Err(EvalError::Format("formatted string is too long".to_string()));
        }
    }

    if !is_mapping && next < positional.len() {
        return Err(EvalError::Format(
            "not all arguments converted during string formatting".to_string(),
        ));
    }
    Ok(out)
}

fn read_spec(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<FormatSpec, EvalError> {
    let mut spec = FormatSpec::default();
    if chars.peek() == Some(&'(') {
        chars.next();
        let mut depth = 1usize;
        let mut key = String::new();
        loop {
            let ch = chars
                .next()
                .ok_or_else(|| EvalError::Format("incomplete format key".to_string()))?;
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            key.push(ch);
        }
        spec.key = Some(key);
    }
    while let Some(&flag) = chars.peek().filter(|ch| "-+ #0".contains(**ch)) {
        spec.flags.push(flag);
        chars.next();
    }
    spec.width = read_number(chars)?;
    if chars.peek() == Some(&'.') {
        chars.next();
        spec.precision = Some(read_number(chars)?.unwrap_or(0));
    }
    spec.conversion = chars
        .next()
        .ok_or_else(|| EvalError::Format("incomplete format".to_string()))?;
    Ok(spec)
}

fn read_number(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<Option<usize>, EvalError> {
    let mut digits = String::new();
    while let Some(&digit) = chars.peek().filter(|ch| ch.is_ascii_digit()) {
        digits.push(digit);
        chars.next();
    }
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.parse::<usize>() {
        Ok(number) if number <= MAX_FORMAT_WIDTH => Ok(Some(number)),
        _ => Err(EvalError::Format(format!(
            "width or precision `{digits}` is too large"
        ))),
    }
}

fn render(spec: &FormatSpec, value: &Literal) -> Result<String, EvalError> {
    let integer = || match value {
        Literal::Int(raw) => Ok(*raw),
        Literal::Bool(raw) => Ok(i64::from(*raw)),
        Literal::Float(raw) if raw.is_finite() => Ok(raw.trunc() as i64),
        other => Err(EvalError::Format(format!(
            "%{} format: a number is required, not {}",
            spec.conversion,
            other.type_name()
        ))),
    };
    let sign = |text: String, negative: bool| {
        if negative {
            text
        } else if spec.flags.contains('+') {
            format!("+{text}")
        } else if spec.flags.contains(' ') {
            format!(" {text}")
        } else {
            text
        }
    };

    let (body, numeric) = match spec.conversion {
        's' => {
            let text = value.to_string();
            match spec.precision {
                Some(limit) => (text.chars().take(limit).collect::<String>(), false),
                None => (text, false),
            }
        }
        'r' | 'a' => (value.repr(), false),
        'd' | 'i' | 'u' => {
            let raw = integer()?;
            (sign(raw.to_string(), raw < 0), true)
        }
        'x' | 'X' | 'o' => {
            let raw = integer()?;
            let magnitude = raw.unsigned_abs();
            let digits = match spec.conversion {
                'x' => format!("{magnitude:x}"),
                'X' => format!("{magnitude:X}"),
                _ => format!("{magnitude:o}"),
            };
            let digits = if raw < 0 { format!("-{digits}") } else { digits };
            (sign(digits, raw < 0), true)
        }
        'f' | 'F' => {
            let raw = match value {
                Literal::Float(raw) => *raw,
                _ => integer()? as f64,
            };
            let text = format!("{:.*}", spec.precision.unwrap_or(6), raw);
            (sign(text, raw.is_sign_negative()), true)
        }
        other => {
            return Err(EvalError::Format(format!(
                "unsupported format character `{other}`"
            )));
        }
    };

    let width = spec.width.unwrap_or(0);
    let len = body.chars().count();
    if len >= width {
        return Ok(body);
    }
    let fill = width - len;
    Ok(if spec.flags.contains('-') {
        format!("{body}{}", " ".repeat(fill))
    } else if numeric && spec.flags.contains('0') {
        let first = body.chars().next();
        let (sign, digits) = match first {
            Some(first @ ('-' | '+' | ' ')) => (first.to_string(), body[1..].to_string()),
            _ => (String::new(), body),
        };
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{body}", " ".repeat(fill))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> Literal {
        Literal::Dict(
            pairs
                .iter()
                .map(|(key, value)| (Literal::str(*key), Literal::str(*value)))
                .collect(),
        )
    }

    #[test]
    fn percent_formats_named_and_positional() {
        let args = mapping(&[("name", "zlib"), ("version", "1.3")]);
        assert_eq!(
            format_percent("%(name)s-%(version)s.tar.gz", &args).expect("format"),
            "zlib-1.3.tar.gz"
        );
        let args = Literal::Tuple(vec![Literal::str("a"), Literal::Int(7)]);
        assert_eq!(format_percent("%s/%03d %%", &args).expect("format"), "a/007 %");
        assert_eq!(
            format_percent("v%s", &Literal::str("1.0")).expect("format"),
            "v1.0"
        );
    }

    fn eval_right_side(source: &str) -> Result<Literal, EvalError> {
        let tree = SyntaxTree::parse(source).expect("parse");
        let statement = tree.root().named_child(0).expect("statement");
        let assignment = statement.named_child(0).expect("assignment");
        let right = assignment.child_by_field_name("right").expect("right");
        evaluate(&tree, right, &ConfigDict::new(), &Constants::new())
    }

    #[test]
    fn oversized_format_width_or_precision_is_rejected() {
        assert!(matches!(
            eval_right_side("description = '%99999999999999s' % 'a'\n"),
            Err(EvalError::Format(_))
        ));
        assert!(matches!(
            eval_right_side("x = '%.99999999999999f' % 1.0\n"),
            Err(EvalError::Format(_))
        ));
        assert!(matches!(
            format_percent("%999999999999999999999999s", &Literal::str("a")),
            Err(EvalError::Format(_))
        ));
        assert_eq!(
            format_percent("%8s|%-4s|%.3f", &Literal::Tuple(vec![
                Literal::str("ab"),
                Literal::str("c"),
                Literal::Float(1.5),
            ]))
            .expect("format"),
            "      ab|c   |1.500"
        );
    }

    #[test]
    fn repetition_is_bounded_by_literal_size() {
        assert_eq!(
            eval_right_side("x = ['a' * 1000000] * 1000000\n"),
            Err(EvalError::Arithmetic)
        );
        assert_eq!(
            eval_right_side("x = ['ab'] * 3\n"),
            Ok(Literal::List(vec![Literal::str("ab"); 3]))
        );
        assert_eq!(
            eval_right_side("x = 'a' * 1000000 + 'b' * 1000000\n"),
            Err(EvalError::Arithmetic)
        );
    }

    #[test]
    fn percent_reports_argument_mismatch() {
        let args = Literal::Tuple(vec![Literal::str("a"), Literal::str("b")]);
        assert!(format_percent("%s", &args).is_err());
        assert!(format_percent("%s %s %s", &args).is_err());
        assert!(format_percent("%(name)s", &args).is_err());
    }

    #[test]
    fn string_literals_follow_python_escapes() {
        assert_eq!(parse_string(r#"'a\tb'"#), Ok(Literal::str("a\tb")));
        assert_eq!(parse_string(r#"r'a\tb'"#), Ok(Literal::str("a\\tb")));
        assert_eq!(parse_string(r#""""x""""#), Ok(Literal::str("x")));
        assert_eq!(parse_string(r#"'\x41\101'"#), Ok(Literal::str("AA")));
        assert!(parse_string("f'{x}'").is_err());
        assert!(parse_string("b'raw'").is_err());
    }

    #[test]
    fn integer_forms() {
        assert_eq!(parse_int("1_000"), Ok(Literal::Int(1000)));
        assert_eq!(parse_int("0x1F"), Ok(Literal::Int(31)));
        assert!(parse_int("99999999999999999999999").is_err());
    }

    #[test]
    fn python_modulo_and_floor_division() {
        assert_eq!(python_mod(-7, 3), Some(2));
        assert_eq!(python_mod(7, -3), Some(-2));
        assert_eq!(floor_div(-7, 2), Some(-4));
        assert_eq!(floor_div(1, 0), None);
    }
}
