// ABOUTME: Pair and list primitives — cons/car/cdr, list construction, and the map/filter/reduce family

use crate::error::EvalError;
use crate::eval::apply_procedure;
use crate::value::Value;

pub fn cons(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [a, b] => Ok(Value::cons(a.clone(), b.clone())),
        _ => Err(EvalError::arity("cons", "2", args.len())),
    }
}

pub fn car(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => Ok(cell.borrow().0.clone()),
        [other] => Err(EvalError::type_error("car", "pair", other)),
        _ => Err(EvalError::arity("car", "1", args.len())),
    }
}

pub fn cdr(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => Ok(cell.borrow().1.clone()),
        [other] => Err(EvalError::type_error("cdr", "pair", other)),
        _ => Err(EvalError::arity("cdr", "1", args.len())),
    }
}

pub fn list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

pub fn length(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [v] => {
            let items = v
                .to_vec()
                .ok_or_else(|| EvalError::type_error("length", "proper list", v))?;
            Ok(Value::Integer(items.len() as i64))
        }
        _ => Err(EvalError::arity("length", "1", args.len())),
    }
}

pub fn append(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Ok(Value::Nil);
    }
    let mut items = Vec::new();
    for arg in &args[..args.len() - 1] {
        let part = arg
            .to_vec()
            .ok_or_else(|| EvalError::type_error("append", "proper list", arg))?;
        items.extend(part);
    }
    // The last argument need not be a proper list.
    Ok(items_into_list(items, args[args.len() - 1].clone()))
}

fn items_into_list(items: Vec<Value>, tail: Value) -> Value {
    items
        .into_iter()
        .rev()
        .fold(tail, |acc, item| Value::cons(item, acc))
}

pub fn map(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, list] => {
            let items = list
                .to_vec()
                .ok_or_else(|| EvalError::type_error("map", "proper list", list))?;
            let mapped = items
                .into_iter()
                .map(|item| apply_procedure(proc.clone(), &[item]))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list(mapped))
        }
        _ => Err(EvalError::arity("map", "2", args.len())),
    }
}

pub fn filter(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, list] => {
            let items = list
                .to_vec()
                .ok_or_else(|| EvalError::type_error("filter", "proper list", list))?;
            let mut kept = Vec::new();
            for item in items {
                if apply_procedure(proc.clone(), &[item.clone()])?.is_truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::list(kept))
        }
        _ => Err(EvalError::arity("filter", "2", args.len())),
    }
}

pub fn reduce(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, init, list] => {
            let items = list
                .to_vec()
                .ok_or_else(|| EvalError::type_error("reduce", "proper list", list))?;
            let mut acc = init.clone();
            for item in items {
                acc = apply_procedure(proc.clone(), &[acc, item])?;
            }
            Ok(acc)
        }
        _ => Err(EvalError::arity("reduce", "3", args.len())),
    }
}
