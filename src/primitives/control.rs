// ABOUTME: Control primitives — force, apply, exit

use crate::error::EvalError;
use crate::eval::{apply_procedure, force};
use crate::value::Value;

pub fn force_primitive(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [v] => force(v),
        _ => Err(EvalError::arity("force", "1", args.len())),
    }
}

pub fn apply_primitive(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [proc, rest @ ..] if !rest.is_empty() => {
            let last = &rest[rest.len() - 1];
            let mut call_args: Vec<Value> = rest[..rest.len() - 1].to_vec();
            call_args.extend(
                last.to_vec()
                    .ok_or_else(|| EvalError::type_error("apply", "proper list", last))?,
            );
            apply_procedure(proc.clone(), &call_args)
        }
        [proc] => apply_procedure(proc.clone(), &[]),
        _ => Err(EvalError::arity("apply", "at least 1", args.len())),
    }
}

pub fn exit(args: &[Value]) -> Result<Value, EvalError> {
    let code = match args {
        [] => 0,
        [Value::Integer(n)] => *n as i32,
        [other] => return Err(EvalError::type_error("exit", "integer", other)),
        _ => return Err(EvalError::arity("exit", "0 or 1", args.len())),
    };
    std::process::exit(code);
}
