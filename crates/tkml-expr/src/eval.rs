//! Tree-walking interpreter for parsed expressions.

use indexmap::IndexMap;

use crate::ast::{BinaryOp, ExprKind, Expression, UnaryOp};
use crate::{EvalError, Scope, Value};

/// Evaluate `expr` against `scope`.
pub fn eval(expr: &Expression, scope: &Scope<'_>) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Null => Ok(Value::Null),
        ExprKind::Bool(b) => Ok(Value::Bool(*b)),
        ExprKind::Int(n) => Ok(Value::Int(*n)),
        ExprKind::Float(n) => Ok(Value::Float(*n)),
        ExprKind::Str(s) => Ok(Value::Str(s.clone())),
        ExprKind::Identifier(name) => {
            scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownName { name: name.clone() })
        }
        ExprKind::List(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        ExprKind::Map(entries) => {
            let mut map = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), eval(value, scope)?);
            }
            Ok(Value::Map(map))
        }
        ExprKind::Unary { op, operand } => unary(*op, eval(operand, scope)?),
        ExprKind::Binary { left, op, right } => match op {
            BinaryOp::And => {
                let left = eval(left, scope)?;
                if left.is_truthy() {
                    eval(right, scope)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                let left = eval(left, scope)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    eval(right, scope)
                }
            }
            _ => binary(*op, eval(left, scope)?, eval(right, scope)?),
        },
        ExprKind::Ternary {
            condition,
            consequent,
            alternate,
        } => {
            if eval(condition, scope)?.is_truthy() {
                eval(consequent, scope)
            } else {
                eval(alternate, scope)
            }
        }
        ExprKind::Member { object, property } => member(eval(object, scope)?, property),
        ExprKind::Index { object, index } => {
            let object = eval(object, scope)?;
            let index = eval(index, scope)?;
            index_value(object, index)
        }
        ExprKind::Call { callee, arguments } => {
            let callee = eval(callee, scope)?;
            let args = arguments
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            match callee {
                Value::Function(func) => func.call(&args),
                other => Err(EvalError::NotCallable {
                    value: other.type_name(),
                }),
            }
        }
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::Overflow { operator: "-" }),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Neg, other) => Err(EvalError::BadOperand {
            operator: op.symbol(),
            operand: other.type_name(),
        }),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let mismatch = |left: &Value, right: &Value| EvalError::TypeMismatch {
        operator: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };

    match op {
        BinaryOp::Eq => Ok(Value::Bool(left.loose_eq(&right))),
        BinaryOp::Neq => Ok(Value::Bool(!left.loose_eq(&right))),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte => {
            let ordering = match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
                (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
                _ => match (left.as_float(), right.as_float()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => return Err(mismatch(&left, &right)),
                },
            };
            // NaN compares false on every side
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Gt => ordering.is_gt(),
                BinaryOp::Lte => ordering.is_le(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::Add => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (left, right) => arithmetic(op, left, right),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right)
        }
        // short-circuited in `eval`
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators are short-circuited"),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let overflow = EvalError::Overflow {
        operator: op.symbol(),
    };

    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        let (a, b) = (*a, *b);
        return match op {
            BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or(overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or(overflow),
            BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or(overflow),
            BinaryOp::Div if b == 0 => Err(EvalError::DivisionByZero),
            BinaryOp::Div => Ok(Value::Float(a as f64 / b as f64)),
            BinaryOp::Mod if b == 0 => Err(EvalError::DivisionByZero),
            BinaryOp::Mod => a.checked_rem_euclid(b).map(Value::Int).ok_or(overflow),
            _ => unreachable!("non-arithmetic operator"),
        };
    }

    let (Some(a), Some(b)) = (left.as_float(), right.as_float()) else {
        return Err(EvalError::TypeMismatch {
            operator: op.symbol(),
            left: left.type_name(),
            right: right.type_name(),
        });
    };

    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => Err(EvalError::DivisionByZero),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Mod => Ok(Value::Float(a.rem_euclid(b))),
        _ => unreachable!("non-arithmetic operator"),
    }
}

fn member(object: Value, property: &str) -> Result<Value, EvalError> {
    match object {
        Value::Map(mut entries) => {
            entries
                .swap_remove(property)
                .ok_or_else(|| EvalError::NoMember {
                    value: "map",
                    member: property.to_string(),
                })
        }
        Value::List(items) if property == "length" => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) if property == "length" => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(EvalError::NoMember {
            value: other.type_name(),
            member: property.to_string(),
        }),
    }
}

fn index_value(object: Value, index: Value) -> Result<Value, EvalError> {
    match (object, index) {
        (Value::List(mut items), Value::Int(i)) => {
            let len = items.len();
            let resolved = if i < 0 { len as i64 + i } else { i };
            if resolved < 0 || resolved as usize >= len {
                return Err(EvalError::IndexOutOfRange { index: i, len });
            }
            Ok(items.swap_remove(resolved as usize))
        }
        (Value::Map(entries), Value::Str(key)) => member(Value::Map(entries), &key),
        (object, index) => Err(EvalError::BadIndex {
            value: object.type_name(),
            index: index.type_name(),
        }),
    }
}
