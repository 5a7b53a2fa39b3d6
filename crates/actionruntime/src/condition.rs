//! Edge-condition evaluation.
//!
//! The grammar is deliberately tiny: `||` splits first, then `&&`, then a
//! single comparison (`===`, `!==`, `>=`, `<=`, `>`, `<`) or a bare token
//! tested for truthiness. There is no parenthesization and no precedence
//! beyond that two-level split; flows authored against this grouping rely on
//! it, so it must not be "fixed".

use actioncore::{ExecutionContext, Value};
use thiserror::Error;

/// Why a condition could not be evaluated. [`evaluate`] treats these as false.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("Operator '{operator}' is missing an operand")]
    EmptyOperand { operator: &'static str },

    #[error("Unterminated string literal: {0}")]
    UnterminatedString(String),
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    StrictEq,
    StrictNe,
    Ge,
    Le,
    Gt,
    Lt,
}

/// Checked in this order; the first operator found anywhere wins.
const OPERATORS: [(&str, Operator); 6] = [
    ("===", Operator::StrictEq),
    ("!==", Operator::StrictNe),
    (">=", Operator::Ge),
    ("<=", Operator::Le),
    (">", Operator::Gt),
    ("<", Operator::Lt),
];

/// Evaluate `condition` against `ctx`. Never fails: malformed conditions
/// evaluate to `false`.
pub fn evaluate(condition: &str, ctx: &ExecutionContext) -> bool {
    match evaluate_detailed(condition, ctx) {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(condition, error = %e, "Condition could not be evaluated, treating as false");
            false
        }
    }
}

/// Like [`evaluate`], but reports malformed conditions instead of collapsing
/// them to `false`.
pub fn evaluate_detailed(condition: &str, ctx: &ExecutionContext) -> Result<bool, ConditionError> {
    let condition = condition.trim();
    match condition {
        "" | "true" => return Ok(true),
        "false" => return Ok(false),
        _ => {}
    }

    // A malformed segment counts as false; it only surfaces if no other
    // segment is true.
    if condition.contains("||") {
        let mut failure = None;
        for segment in condition.split("||") {
            match evaluate_detailed(segment, ctx) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(segment, error = %e, "Condition segment treated as false");
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }
        return failure.map_or(Ok(false), Err);
    }

    if condition.contains("&&") {
        for segment in condition.split("&&") {
            if !evaluate_detailed(segment, ctx)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    evaluate_comparison(condition, ctx)
}

fn evaluate_comparison(expr: &str, ctx: &ExecutionContext) -> Result<bool, ConditionError> {
    for (symbol, operator) in OPERATORS {
        let Some(idx) = expr.find(symbol) else {
            continue;
        };
        let left = expr[..idx].trim();
        let right = expr[idx + symbol.len()..].trim();
        if left.is_empty() || right.is_empty() {
            return Err(ConditionError::EmptyOperand { operator: symbol });
        }
        let left = resolve_token(left, ctx)?;
        let right = resolve_token(right, ctx)?;
        return Ok(compare(operator, left.as_ref(), right.as_ref()));
    }

    Ok(resolve_token(expr, ctx)?.is_some_and(|value| value.is_truthy()))
}

/// `None` plays the role of `undefined`: distinct from `null` under strict
/// equality, NaN under numeric cast.
fn compare(operator: Operator, left: Option<&Value>, right: Option<&Value>) -> bool {
    match operator {
        Operator::StrictEq => strict_equals(left, right),
        Operator::StrictNe => !strict_equals(left, right),
        Operator::Ge => to_number(left) >= to_number(right),
        Operator::Le => to_number(left) <= to_number(right),
        Operator::Gt => to_number(left) > to_number(right),
        Operator::Lt => to_number(left) < to_number(right),
    }
}

fn strict_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

fn to_number(value: Option<&Value>) -> f64 {
    value.map_or(f64::NAN, Value::to_number)
}

fn resolve_token(token: &str, ctx: &ExecutionContext) -> Result<Option<Value>, ConditionError> {
    match token {
        "true" => return Ok(Some(Value::Bool(true))),
        "false" => return Ok(Some(Value::Bool(false))),
        "null" => return Ok(Some(Value::Null)),
        _ => {}
    }

    if let Some(quote) = token.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let closed = token.len() >= 2 && token.ends_with(quote);
        if !closed {
            return Err(ConditionError::UnterminatedString(token.to_string()));
        }
        return Ok(Some(Value::String(token[1..token.len() - 1].to_string())));
    }

    if is_numeric_literal(token) {
        return Ok(token.parse::<f64>().ok().map(Value::Number));
    }

    if let Some(path) = token.strip_prefix("variables.") {
        return Ok(ctx.lookup_variable(path));
    }
    if let Some(path) = token.strip_prefix("context.") {
        return Ok(ctx.lookup(path));
    }
    if let Some(value) = ctx.variable(token) {
        return Ok(Some(value));
    }
    Ok(ctx.lookup(token))
}

/// `-?digits(.digits)?`
fn is_numeric_literal(token: &str) -> bool {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.map_or(true, all_digits)
}
