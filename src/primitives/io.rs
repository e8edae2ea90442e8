// ABOUTME: I/O primitives — print, display, newline

use crate::error::EvalError;
use crate::value::Value;

pub fn print(args: &[Value]) -> Result<Value, EvalError> {
    for arg in args {
        println!("{arg}");
    }
    Ok(Value::Undefined)
}

pub fn display(args: &[Value]) -> Result<Value, EvalError> {
    for arg in args {
        match arg {
            Value::Str(s) => print!("{s}"),
            other => print!("{other}"),
        }
    }
    Ok(Value::Undefined)
}

pub fn newline(args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity("newline", "0", args.len()));
    }
    println!();
    Ok(Value::Undefined)
}
