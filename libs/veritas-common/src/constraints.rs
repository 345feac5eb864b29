//! LeetCode-style constraint checks against a test case's input bindings.
//!
//! Understands `lo <= var <= hi`, `lo <= var` and `var <= hi` (and the `>=`
//! mirror), with `10^k` and `a * b` in bounds. `var` is `name`,
//! `name.length` or `name[i]` / `name[j]`. Anything else is skipped.

use serde::{Deserialize, Serialize};

use crate::literal::{parse_bindings, Bindings, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Access {
    Plain,
    Length,
    Element,
}

#[derive(Debug, Clone, PartialEq)]
struct Rule {
    variable: String,
    name: String,
    access: Access,
    min: Option<f64>,
    max: Option<f64>,
}

/// Validate `input` against every constraint.
pub fn validate<S: AsRef<str>>(input: &str, constraints: &[S]) -> ConstraintReport {
    let bindings = match parse_bindings(input) {
        Ok(bindings) if !bindings.is_empty() => bindings,
        _ => {
            return ConstraintReport {
                valid: false,
                errors: vec!["Could not parse input".to_string()],
            }
        }
    };

    let errors: Vec<String> = constraints
        .iter()
        .filter_map(|c| {
            let c = c.as_ref();
            parse_rule(c).and_then(|rule| check(&bindings, &rule, c))
        })
        .collect();

    ConstraintReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn check(bindings: &Bindings, rule: &Rule, constraint: &str) -> Option<String> {
    let value = bindings.get(&rule.name)?;
    let out_of_range = |n: f64| rule.min.is_some_and(|m| n < m) || rule.max.is_some_and(|m| n > m);

    match rule.access {
        Access::Element => {
            let items = value.as_list()?;
            items.iter().enumerate().find_map(|(i, item)| {
                let n = item.as_f64()?;
                out_of_range(n).then(|| {
                    format!(
                        "Element {}[{}] = {} violates constraint: {}",
                        rule.name, i, item, constraint
                    )
                })
            })
        }
        Access::Length | Access::Plain => {
            let measured = match (value, &rule.access) {
                (Value::List(items), _) => items.len() as f64,
                (Value::Str(s), Access::Length) => s.chars().count() as f64,
                (Value::Int(_) | Value::Float(_), Access::Plain) => value.as_f64()?,
                _ => return None,
            };
            if let Some(min) = rule.min.filter(|m| measured < *m) {
                return Some(format!(
                    "{} = {} violates constraint: {} (minimum is {})",
                    rule.variable,
                    format_number(measured),
                    constraint,
                    format_number(min)
                ));
            }
            rule.max.filter(|m| measured > *m).map(|max| {
                format!(
                    "{} = {} violates constraint: {} (maximum is {})",
                    rule.variable,
                    format_number(measured),
                    constraint,
                    format_number(max)
                )
            })
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Replace every `10^k` with its decimal expansion.
fn expand_powers(constraint: &str) -> String {
    let mut out = String::with_capacity(constraint.len());
    let mut rest = constraint;
    while let Some(at) = rest.find("10^") {
        out.push_str(&rest[..at]);
        let after = &rest[at + 3..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            out.push_str("10^");
            rest = after;
            continue;
        }
        let exp: u32 = after[..digits].parse().unwrap_or(u32::MAX);
        match 10i64.checked_pow(exp) {
            Some(n) => out.push_str(&n.to_string()),
            None => out.push_str(&format!("1e{}", exp)),
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}

fn parse_bound(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.split('*')
        .map(|factor| factor.trim().parse::<f64>().ok())
        .try_fold(1.0, |acc, factor| factor.map(|f| acc * f))
}

fn parse_variable(text: &str) -> Option<(String, Access)> {
    let text = text.trim();
    let is_ident = |s: &str| {
        let mut chars = s.chars();
        matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    };

    if let Some(base) = text.strip_suffix("[i]").or_else(|| text.strip_suffix("[j]")) {
        return is_ident(base).then(|| (base.to_string(), Access::Element));
    }
    if let Some(base) = text.strip_suffix(".length") {
        return is_ident(base).then(|| (base.to_string(), Access::Length));
    }
    is_ident(text).then(|| (text.to_string(), Access::Plain))
}

fn parse_rule(constraint: &str) -> Option<Rule> {
    let expanded = expand_powers(constraint);
    let mut parts: Vec<&str> = if expanded.contains("<=") {
        expanded.split("<=").collect()
    } else if expanded.contains(">=") {
        let mut parts: Vec<&str> = expanded.split(">=").collect();
        parts.reverse();
        parts
    } else {
        return None;
    };
    parts.iter_mut().for_each(|p| *p = p.trim());

    let (variable, min, max) = match parts.as_slice() {
        [lo, var, hi] => (*var, Some(parse_bound(lo)?), Some(parse_bound(hi)?)),
        [left, right] => match parse_bound(left) {
            Some(lo) => (*right, Some(lo), None),
            None => (*left, None, Some(parse_bound(right)?)),
        },
        _ => return None,
    };

    let (name, access) = parse_variable(variable)?;
    Some(Rule {
        variable: variable.to_string(),
        name,
        access,
        min,
        max,
    })
}
