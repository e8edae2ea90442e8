// ABOUTME: Stream accessors and the stream-map/filter/reduce family, realized eagerly over a forced list

use crate::error::EvalError;
use crate::eval::{apply_procedure, force};
use crate::value::Value;

pub fn stream_car(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => Ok(cell.borrow().0.clone()),
        [other] => Err(EvalError::type_error("stream-car", "stream pair", other)),
        _ => Err(EvalError::arity("stream-car", "1", args.len())),
    }
}

pub fn stream_cdr(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => force(&cell.borrow().1.clone()),
        [other] => Err(EvalError::type_error("stream-cdr", "stream pair", other)),
        _ => Err(EvalError::arity("stream-cdr", "1", args.len())),
    }
}

/// Realizes `s` as a finite `Vec`, forcing each tail in turn. `limit` bounds
/// traversal so an infinite stream cannot hang these primitives forever.
fn realize(function: &str, s: &Value, limit: usize) -> Result<Vec<Value>, EvalError> {
    let mut items = Vec::new();
    let mut cur = s.clone();
    loop {
        match cur {
            Value::Nil => return Ok(items),
            Value::Pair(cell) => {
                let (car, cdr) = cell.borrow().clone();
                items.push(car);
                if items.len() >= limit {
                    return Err(EvalError::Internal(format!(
                        "{function}: stream exceeds the {limit}-element realization limit"
                    )));
                }
                cur = force(&cdr)?;
            }
            _ => return Err(EvalError::type_error(function, "stream", &cur)),
        }
    }
}

const REALIZE_LIMIT: usize = 100_000;

pub fn stream_map(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, s] => {
            let items = realize("stream-map", s, REALIZE_LIMIT)?;
            let mapped = items
                .into_iter()
                .map(|item| apply_procedure(proc.clone(), &[item]))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list(mapped))
        }
        _ => Err(EvalError::arity("stream-map", "2", args.len())),
    }
}

pub fn stream_filter(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, s] => {
            let items = realize("stream-filter", s, REALIZE_LIMIT)?;
            let mut kept = Vec::new();
            for item in items {
                if apply_procedure(proc.clone(), &[item.clone()])?.is_truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::list(kept))
        }
        _ => Err(EvalError::arity("stream-filter", "2", args.len())),
    }
}

pub fn stream_reduce(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, init, s] => {
            let items = realize("stream-reduce", s, REALIZE_LIMIT)?;
            let mut acc = init.clone();
            for item in items {
                acc = apply_procedure(proc.clone(), &[acc, item])?;
            }
            Ok(acc)
        }
        _ => Err(EvalError::arity("stream-reduce", "3", args.len())),
    }
}
