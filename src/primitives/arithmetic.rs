// ABOUTME: Arithmetic and numeric-comparison primitives with Integer/Real contagion

use crate::error::EvalError;
use crate::value::Value;

#[derive(Clone, Copy)]
enum Num {
    Integer(i64),
    Real(f64),
}

fn as_num(function: &str, v: &Value) -> Result<Num, EvalError> {
    match v {
        Value::Integer(n) => Ok(Num::Integer(*n)),
        Value::Real(n) => Ok(Num::Real(*n)),
        _ => Err(EvalError::type_error(function, "number", v)),
    }
}

fn to_value(n: Num) -> Value {
    match n {
        Num::Integer(i) => Value::Integer(i),
        Num::Real(r) => Value::Real(r),
    }
}

fn to_f64(n: Num) -> f64 {
    match n {
        Num::Integer(i) => i as f64,
        Num::Real(r) => r,
    }
}

fn fold(function: &str, args: &[Value], identity: Num, op_i: fn(i64, i64) -> i64, op_f: fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    let mut acc = identity;
    for a in args {
        let n = as_num(function, a)?;
        acc = match (acc, n) {
            (Num::Integer(a), Num::Integer(b)) => Num::Integer(op_i(a, b)),
            (a, b) => Num::Real(op_f(to_f64(a), to_f64(b))),
        };
    }
    Ok(to_value(acc))
}

pub fn add(args: &[Value]) -> Result<Value, EvalError> {
    fold("+", args, Num::Integer(0), |a, b| a + b, |a, b| a + b)
}

pub fn mul(args: &[Value]) -> Result<Value, EvalError> {
    fold("*", args, Num::Integer(1), |a, b| a * b, |a, b| a * b)
}

pub fn sub(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [] => Err(EvalError::arity("-", "at least 1", 0)),
        [single] => {
            let n = as_num("-", single)?;
            Ok(to_value(match n {
                Num::Integer(i) => Num::Integer(-i),
                Num::Real(r) => Num::Real(-r),
            }))
        }
        [first, rest @ ..] => {
            let mut acc = as_num("-", first)?;
            for a in rest {
                let n = as_num("-", a)?;
                acc = match (acc, n) {
                    (Num::Integer(a), Num::Integer(b)) => Num::Integer(a - b),
                    (a, b) => Num::Real(to_f64(a) - to_f64(b)),
                };
            }
            Ok(to_value(acc))
        }
    }
}

pub fn div(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [] => Err(EvalError::arity("/", "at least 1", 0)),
        [single] => divide_pair("/", &Value::Integer(1), single),
        [first, rest @ ..] => {
            let mut acc = first.clone();
            for a in rest {
                acc = divide_pair("/", &acc, a)?;
            }
            Ok(acc)
        }
    }
}

fn divide_pair(function: &str, a: &Value, b: &Value) -> Result<Value, EvalError> {
    let x = as_num(function, a)?;
    let y = as_num(function, b)?;
    match (x, y) {
        (_, Num::Integer(0)) => Err(EvalError::Arithmetic("division by zero".into())),
        (_, Num::Real(r)) if r == 0.0 => Err(EvalError::Arithmetic("division by zero".into())),
        (Num::Integer(a), Num::Integer(b)) if a % b == 0 => Ok(Value::Integer(a / b)),
        (a, b) => Ok(Value::Real(to_f64(a) / to_f64(b))),
    }
}

fn as_int(function: &str, v: &Value) -> Result<i64, EvalError> {
    match v {
        Value::Integer(n) => Ok(*n),
        _ => Err(EvalError::type_error(function, "integer", v)),
    }
}

pub fn quotient(args: &[Value]) -> Result<Value, EvalError> {
    let [a, b] = require_two("quotient", args)?;
    let (a, b) = (as_int("quotient", a)?, as_int("quotient", b)?);
    if b == 0 {
        return Err(EvalError::Arithmetic("division by zero".into()));
    }
    Ok(Value::Integer(a / b))
}

pub fn remainder(args: &[Value]) -> Result<Value, EvalError> {
    let [a, b] = require_two("remainder", args)?;
    let (a, b) = (as_int("remainder", a)?, as_int("remainder", b)?);
    if b == 0 {
        return Err(EvalError::Arithmetic("division by zero".into()));
    }
    Ok(Value::Integer(a % b))
}

pub fn modulo(args: &[Value]) -> Result<Value, EvalError> {
    let [a, b] = require_two("modulo", args)?;
    let (a, b) = (as_int("modulo", a)?, as_int("modulo", b)?);
    if b == 0 {
        return Err(EvalError::Arithmetic("division by zero".into()));
    }
    Ok(Value::Integer(((a % b) + b) % b))
}

pub fn abs(args: &[Value]) -> Result<Value, EvalError> {
    let [v] = require_one("abs", args)?;
    Ok(match as_num("abs", v)? {
        Num::Integer(i) => Value::Integer(i.abs()),
        Num::Real(r) => Value::Real(r.abs()),
    })
}

fn require_one<'a>(function: &str, args: &'a [Value]) -> Result<[&'a Value; 1], EvalError> {
    match args {
        [a] => Ok([a]),
        _ => Err(EvalError::arity(function, "1", args.len())),
    }
}

fn require_two<'a>(function: &str, args: &'a [Value]) -> Result<[&'a Value; 2], EvalError> {
    match args {
        [a, b] => Ok([a, b]),
        _ => Err(EvalError::arity(function, "2", args.len())),
    }
}

fn compare(function: &str, args: &[Value], op: fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity(function, "at least 2", args.len()));
    }
    for pair in args.windows(2) {
        let a = to_f64(as_num(function, &pair[0])?);
        let b = to_f64(as_num(function, &pair[1])?);
        if !op(a, b) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

pub fn num_eq(args: &[Value]) -> Result<Value, EvalError> {
    compare("=", args, |a, b| a == b)
}

pub fn lt(args: &[Value]) -> Result<Value, EvalError> {
    compare("<", args, |a, b| a < b)
}

pub fn gt(args: &[Value]) -> Result<Value, EvalError> {
    compare(">", args, |a, b| a > b)
}

pub fn le(args: &[Value]) -> Result<Value, EvalError> {
    compare("<=", args, |a, b| a <= b)
}

pub fn ge(args: &[Value]) -> Result<Value, EvalError> {
    compare(">=", args, |a, b| a >= b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_is_contagious() {
        assert_eq!(add(&[Value::Integer(1), Value::Integer(2)]).unwrap().to_string(), "3");
        assert_eq!(add(&[Value::Integer(1), Value::Real(2.0)]).unwrap().to_string(), "3.0");
    }

    #[test]
    fn division_by_zero_is_arithmetic_error() {
        let err = div(&[Value::Integer(1), Value::Integer(0)]).unwrap_err();
        assert!(matches!(err, EvalError::Arithmetic(_)));
    }

    #[test]
    fn division_preserves_exactness_when_it_divides_evenly() {
        assert_eq!(div(&[Value::Integer(6), Value::Integer(3)]).unwrap().to_string(), "2");
        assert_eq!(div(&[Value::Integer(7), Value::Integer(2)]).unwrap().to_string(), "3.5");
    }

    #[test]
    fn comparisons_chain() {
        assert_eq!(
            lt(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]).unwrap().to_string(),
            "#t"
        );
        assert_eq!(
            lt(&[Value::Integer(1), Value::Integer(3), Value::Integer(2)]).unwrap().to_string(),
            "#f"
        );
    }

    #[test]
    fn modulo_matches_scheme_sign_convention() {
        assert_eq!(modulo(&[Value::Integer(-7), Value::Integer(3)]).unwrap().to_string(), "2");
    }
}
