// ABOUTME: Evaluator module — special-form dispatch, macro expansion, and apply, driven by a tail-call trampoline

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{intern, ParamList, PromiseState, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Evaluates `expr` against `env`, looping on tail positions instead of
/// recursing on the host stack.
pub fn eval(mut expr: Value, mut env: Rc<Environment>) -> Result<Value, EvalError> {
    loop {
        match &expr {
            Value::Integer(_)
            | Value::Real(_)
            | Value::Bool(_)
            | Value::Str(_)
            | Value::Nil
            | Value::Primitive { .. }
            | Value::Lexical { .. }
            | Value::Dynamic { .. }
            | Value::Macro { .. }
            | Value::Promise(_)
            | Value::Undefined => return Ok(expr),

            Value::Symbol(name) => return env.lookup(name),

            Value::Pair(_) => {
                let items = expr
                    .to_vec()
                    .ok_or_else(|| EvalError::Internal("cannot evaluate a dotted form".into()))?;
                let head = &items[0];

                if let Value::Symbol(name) = head {
                    if let Some(Value::Macro { params, body, env: def_env }) = env.get(name) {
                        expr = expand_macro(&params, &body, &def_env, &items[1..])?;
                        continue;
                    }

                    match name.as_ref() {
                        "quote" => return quote_form(&items),
                        "if" => match if_form(&items, &env)? {
                            Some(tail) => {
                                expr = tail;
                                continue;
                            }
                            None => return Ok(Value::Undefined),
                        },
                        "cond" => match cond_form(&items, &env)? {
                            Some(tail) => {
                                expr = tail;
                                continue;
                            }
                            None => return Ok(Value::Undefined),
                        },
                        "and" => match and_form(&items, &env)? {
                            AndOr::Value(v) => return Ok(v),
                            AndOr::Tail(tail) => {
                                expr = tail;
                                continue;
                            }
                        },
                        "or" => match or_form(&items, &env)? {
                            AndOr::Value(v) => return Ok(v),
                            AndOr::Tail(tail) => {
                                expr = tail;
                                continue;
                            }
                        },
                        "begin" => match begin_body(&items[1..], &env)? {
                            Some(tail) => {
                                expr = tail;
                                continue;
                            }
                            None => return Ok(Value::Undefined),
                        },
                        "define" => return define_form(&items, &env),
                        "set!" => return set_form(&items, &env),
                        "lambda" => return lambda_form(&items, env.clone()),
                        "dlambda" => return dlambda_form(&items),
                        "let" => {
                            let (body_env, tail) = let_form(&items, &env)?;
                            match tail {
                                Some(tail) => {
                                    expr = tail;
                                    env = body_env;
                                    continue;
                                }
                                None => return Ok(Value::Undefined),
                            }
                        }
                        "define-macro" => return define_macro_form(&items, &env),
                        "delay" => return delay_form(&items, &env),
                        "cons-stream" => return cons_stream_form(&items, &env),
                        _ => {}
                    }
                }

                let func = eval(head.clone(), env.clone())?;
                let mut args = Vec::with_capacity(items.len() - 1);
                for arg in &items[1..] {
                    args.push(eval(arg.clone(), env.clone())?);
                }

                match func {
                    Value::Lexical {
                        params, body, env: closure_env, name,
                    } => {
                        let label = name.borrow().clone();
                        let label = label.as_deref().unwrap_or("lambda");
                        let new_env = Environment::extend(closure_env, &params, &args, label)?;
                        match begin_body(&body, &new_env)? {
                            Some(tail) => {
                                expr = tail;
                                env = new_env;
                                continue;
                            }
                            None => return Ok(Value::Undefined),
                        }
                    }
                    Value::Dynamic { params, body, .. } => {
                        let new_env = Environment::extend(env.clone(), &params, &args, "dlambda")?;
                        match begin_body(&body, &new_env)? {
                            Some(tail) => {
                                expr = tail;
                                env = new_env;
                                continue;
                            }
                            None => return Ok(Value::Undefined),
                        }
                    }
                    Value::Primitive { func, .. } => return func(&args),
                    other => {
                        return Err(EvalError::Type {
                            function: "apply".to_string(),
                            expected: "procedure".to_string(),
                            actual: other.type_name().to_string(),
                        })
                    }
                }
            }
        }
    }
}

fn quote_form(items: &[Value]) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::arity("quote", "1", items.len() - 1));
    }
    Ok(items[1].clone())
}

fn if_form(items: &[Value], env: &Rc<Environment>) -> Result<Option<Value>, EvalError> {
    if items.len() < 3 || items.len() > 4 {
        return Err(EvalError::arity("if", "2 or 3", items.len() - 1));
    }
    let test = eval(items[1].clone(), env.clone())?;
    if test.is_truthy() {
        Ok(Some(items[2].clone()))
    } else if items.len() == 4 {
        Ok(Some(items[3].clone()))
    } else {
        Ok(None)
    }
}

fn cond_form(items: &[Value], env: &Rc<Environment>) -> Result<Option<Value>, EvalError> {
    for clause in &items[1..] {
        let clause_items = clause
            .to_vec()
            .ok_or_else(|| EvalError::Internal("cond: malformed clause".into()))?;
        if clause_items.is_empty() {
            return Err(EvalError::Internal("cond: empty clause".into()));
        }
        let is_else = matches!(&clause_items[0], Value::Symbol(s) if s.as_ref() == "else");
        let matched = if is_else {
            true
        } else {
            eval(clause_items[0].clone(), env.clone())?.is_truthy()
        };
        if matched {
            return begin_body(&clause_items[1..], env);
        }
    }
    Ok(None)
}

enum AndOr {
    Value(Value),
    Tail(Value),
}

fn and_form(items: &[Value], env: &Rc<Environment>) -> Result<AndOr, EvalError> {
    let exprs = &items[1..];
    if exprs.is_empty() {
        return Ok(AndOr::Value(Value::Bool(true)));
    }
    for expr in &exprs[..exprs.len() - 1] {
        let v = eval(expr.clone(), env.clone())?;
        if !v.is_truthy() {
            return Ok(AndOr::Value(v));
        }
    }
    Ok(AndOr::Tail(exprs[exprs.len() - 1].clone()))
}

fn or_form(items: &[Value], env: &Rc<Environment>) -> Result<AndOr, EvalError> {
    let exprs = &items[1..];
    if exprs.is_empty() {
        return Ok(AndOr::Value(Value::Bool(false)));
    }
    for expr in &exprs[..exprs.len() - 1] {
        let v = eval(expr.clone(), env.clone())?;
        if v.is_truthy() {
            return Ok(AndOr::Value(v));
        }
    }
    Ok(AndOr::Tail(exprs[exprs.len() - 1].clone()))
}

/// Evaluates all but the last of `body`, returning the last expression
/// unevaluated for the caller to loop on in tail position.
fn begin_body(body: &[Value], env: &Rc<Environment>) -> Result<Option<Value>, EvalError> {
    if body.is_empty() {
        return Ok(None);
    }
    for expr in &body[..body.len() - 1] {
        eval(expr.clone(), env.clone())?;
    }
    Ok(Some(body[body.len() - 1].clone()))
}

fn define_form(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() < 2 {
        return Err(EvalError::arity("define", "at least 1", items.len() - 1));
    }
    match &items[1] {
        Value::Symbol(name) => {
            let value = if items.len() >= 3 {
                eval(items[2].clone(), env.clone())?
            } else {
                Value::Undefined
            };
            if let Value::Lexical { name: slot, .. } = &value {
                if slot.borrow().is_none() {
                    *slot.borrow_mut() = Some(name.clone());
                }
            }
            env.define(name.clone(), value);
            Ok(Value::Undefined)
        }
        Value::Pair(cell) => {
            let (name_part, param_spec) = cell.borrow().clone();
            let name = match name_part {
                Value::Symbol(n) => n,
                _ => return Err(EvalError::Internal("define: name must be a symbol".into())),
            };
            let params = parse_param_list_from_value(&param_spec)?;
            let body: Rc<[Value]> = items[2..].to_vec().into();
            let closure = Value::Lexical {
                params: Rc::new(params),
                body,
                env: env.clone(),
                name: RefCell::new(Some(name.clone())),
            };
            env.define(name, closure);
            Ok(Value::Undefined)
        }
        _ => Err(EvalError::Internal(
            "define: first argument must be a symbol or a signature".into(),
        )),
    }
}

fn set_form(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 3 {
        return Err(EvalError::arity("set!", "2", items.len() - 1));
    }
    let name = match &items[1] {
        Value::Symbol(n) => n.clone(),
        _ => return Err(EvalError::Internal("set!: first argument must be a symbol".into())),
    };
    let value = eval(items[2].clone(), env.clone())?;
    env.set(&name, value)?;
    Ok(Value::Undefined)
}

fn parse_param_list_from_value(spec: &Value) -> Result<ParamList, EvalError> {
    match spec {
        Value::Symbol(s) => Ok(ParamList::Rest(s.clone())),
        Value::Nil => Ok(ParamList::Proper(Vec::new())),
        Value::Pair(_) => {
            let mut names = Vec::new();
            let mut cur = spec.clone();
            loop {
                match cur {
                    Value::Nil => return Ok(ParamList::Proper(names)),
                    Value::Symbol(rest) => return Ok(ParamList::Dotted(names, rest)),
                    Value::Pair(cell) => {
                        let (car, cdr) = cell.borrow().clone();
                        match car {
                            Value::Symbol(s) => names.push(s),
                            _ => {
                                return Err(EvalError::Internal(
                                    "parameter must be a symbol".into(),
                                ))
                            }
                        }
                        cur = cdr;
                    }
                    _ => return Err(EvalError::Internal("malformed parameter list".into())),
                }
            }
        }
        _ => Err(EvalError::Internal("malformed parameter list".into())),
    }
}

fn lambda_form(items: &[Value], env: Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() < 2 {
        return Err(EvalError::arity("lambda", "at least 1", items.len() - 1));
    }
    let params = parse_param_list_from_value(&items[1])?;
    let body: Rc<[Value]> = items[2..].to_vec().into();
    Ok(Value::Lexical {
        params: Rc::new(params),
        body,
        env,
        name: RefCell::new(None),
    })
}

fn dlambda_form(items: &[Value]) -> Result<Value, EvalError> {
    if items.len() < 2 {
        return Err(EvalError::arity("dlambda", "at least 1", items.len() - 1));
    }
    let params = parse_param_list_from_value(&items[1])?;
    let body: Rc<[Value]> = items[2..].to_vec().into();
    Ok(Value::Dynamic {
        params: Rc::new(params),
        body,
        name: RefCell::new(None),
    })
}

/// Builds the `let` body environment and returns the tail expression to
/// evaluate there (or `None` for an empty body).
fn let_form(
    items: &[Value],
    env: &Rc<Environment>,
) -> Result<(Rc<Environment>, Option<Value>), EvalError> {
    if items.len() < 2 {
        return Err(EvalError::arity("let", "at least 1", items.len() - 1));
    }
    let bindings = items[1]
        .to_vec()
        .ok_or_else(|| EvalError::Internal("let: bindings must be a proper list".into()))?;

    let new_env = Environment::with_parent(env.clone());
    for binding in &bindings {
        let pair = binding
            .to_vec()
            .ok_or_else(|| EvalError::Internal("let: binding must be (name expr)".into()))?;
        if pair.len() != 2 {
            return Err(EvalError::Internal("let: binding must be (name expr)".into()));
        }
        let name = match &pair[0] {
            Value::Symbol(s) => s.clone(),
            _ => return Err(EvalError::Internal("let: binding name must be a symbol".into())),
        };
        // Bound to the OUTER env, not new_env: `let` is not `let*`.
        let value = eval(pair[1].clone(), env.clone())?;
        new_env.define(name, value);
    }

    let tail = begin_body(&items[2..], &new_env)?;
    Ok((new_env, tail))
}

fn define_macro_form(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() < 2 {
        return Err(EvalError::arity("define-macro", "at least 1", items.len() - 1));
    }
    let (name_part, param_spec) = match &items[1] {
        Value::Pair(cell) => cell.borrow().clone(),
        _ => return Err(EvalError::Macro("define-macro: malformed signature".into())),
    };
    let name = match name_part {
        Value::Symbol(n) => n,
        _ => return Err(EvalError::Macro("define-macro: name must be a symbol".into())),
    };
    let params = parse_param_list_from_value(&param_spec)?;
    let body: Rc<[Value]> = items[2..].to_vec().into();
    env.define(
        name,
        Value::Macro {
            params: Rc::new(params),
            body,
            env: env.clone(),
        },
    );
    Ok(Value::Undefined)
}

fn expand_macro(
    params: &ParamList,
    body: &[Value],
    def_env: &Rc<Environment>,
    operands: &[Value],
) -> Result<Value, EvalError> {
    let macro_env = Environment::extend(def_env.clone(), params, operands, "macro")?;
    let mut result = Value::Undefined;
    for expr in body {
        result = eval(expr.clone(), macro_env.clone())?;
    }
    Ok(result)
}

fn delay_form(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::arity("delay", "1", items.len() - 1));
    }
    let thunk = Value::list(vec![intern_symbol("lambda"), Value::Nil, items[1].clone()]);
    Ok(Value::Promise(Rc::new(RefCell::new(PromiseState::Unforced {
        thunk,
        env: env.clone(),
    }))))
}

fn cons_stream_form(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 3 {
        return Err(EvalError::arity("cons-stream", "2", items.len() - 1));
    }
    let head = eval(items[1].clone(), env.clone())?;
    let tail_promise = delay_form(&[Value::symbol("delay"), items[2].clone()], env)?;
    Ok(Value::cons(head, tail_promise))
}

fn intern_symbol(name: &str) -> Value {
    Value::Symbol(intern(name))
}

/// Applies `proc` to already-evaluated `args`, for use by primitives
/// (`apply`, `map`, `filter`, `reduce`, the stream primitives) that need to
/// invoke a Scheme procedure from host code rather than from the trampoline.
/// A dynamic closure applied this way binds over the global environment,
/// since a primitive has no lexical "caller" of its own.
pub fn apply_procedure(proc: Value, args: &[Value]) -> Result<Value, EvalError> {
    match proc {
        Value::Primitive { func, .. } => func(args),
        Value::Lexical {
            params, body, env: closure_env, name,
        } => {
            let label = name.borrow().clone();
            let label = label.as_deref().unwrap_or("lambda");
            let new_env = Environment::extend(closure_env, &params, args, label)?;
            let mut result = Value::Undefined;
            for expr in body.iter() {
                result = eval(expr.clone(), new_env.clone())?;
            }
            Ok(result)
        }
        Value::Dynamic { params, body, .. } => {
            let new_env = Environment::extend(crate::env::global(), &params, args, "dlambda")?;
            let mut result = Value::Undefined;
            for expr in body.iter() {
                result = eval(expr.clone(), new_env.clone())?;
            }
            Ok(result)
        }
        other => Err(EvalError::Type {
            function: "apply".to_string(),
            expected: "procedure".to_string(),
            actual: other.type_name().to_string(),
        }),
    }
}

/// Forces a promise, memoizing the result. Detects self-referential force.
pub fn force(value: &Value) -> Result<Value, EvalError> {
    let cell = match value {
        Value::Promise(cell) => cell,
        other => return Ok(other.clone()),
    };

    let to_run = {
        let mut state = cell.borrow_mut();
        match &*state {
            PromiseState::Forced(v) => return Ok(v.clone()),
            PromiseState::Forcing => return Err(EvalError::CircularForce),
            PromiseState::Unforced { thunk, env } => {
                let pending = (thunk.clone(), env.clone());
                *state = PromiseState::Forcing;
                pending
            }
        }
    };

    let (thunk, env) = to_run;
    let result = eval(Value::list(vec![thunk]), env)?;
    *cell.borrow_mut() = PromiseState::Forced(result.clone());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_one;

    fn run(src: &str, env: &Rc<Environment>) -> Value {
        let expr = read_one(src).unwrap().unwrap();
        eval(expr, env.clone()).unwrap()
    }

    fn fresh_env() -> Rc<Environment> {
        let env = Environment::new();
        crate::primitives::install(&env);
        env
    }

    #[test]
    fn self_evaluating_atoms() {
        let env = fresh_env();
        assert_eq!(run("42", &env).to_string(), "42");
        assert_eq!(run("3.5", &env).to_string(), "3.5");
        assert_eq!(run("#t", &env).to_string(), "#t");
        assert_eq!(run("\"hi\"", &env).to_string(), "\"hi\"");
    }

    #[test]
    fn quote_returns_datum_unevaluated() {
        let env = fresh_env();
        assert_eq!(run("'(a b c)", &env).to_string(), "(a b c)");
    }

    #[test]
    fn if_picks_branch_by_truthiness() {
        let env = fresh_env();
        assert_eq!(run("(if #t 1 2)", &env).to_string(), "1");
        assert_eq!(run("(if #f 1 2)", &env).to_string(), "2");
    }

    #[test]
    fn cond_first_matching_clause() {
        let env = fresh_env();
        assert_eq!(run("(cond (#f 1) (#t 2) (else 3))", &env).to_string(), "2");
        assert_eq!(run("(cond (#f 1) (else 3))", &env).to_string(), "3");
    }

    #[test]
    fn and_or_short_circuit() {
        let env = fresh_env();
        assert_eq!(run("(and 1 2 3)", &env).to_string(), "3");
        assert_eq!(run("(and 1 #f 3)", &env).to_string(), "#f");
        assert_eq!(run("(or #f #f 5)", &env).to_string(), "5");
        assert_eq!(run("(or #f #f)", &env).to_string(), "#f");
    }

    #[test]
    fn define_and_lookup() {
        let env = fresh_env();
        run("(define x 42)", &env);
        assert_eq!(run("x", &env).to_string(), "42");
    }

    #[test]
    fn define_function_sugar() {
        let env = fresh_env();
        run("(define (f x) (* x x))", &env);
        assert_eq!(run("(f 5)", &env).to_string(), "25");
    }

    #[test]
    fn lambda_application_and_closures() {
        let env = fresh_env();
        run("(define x 10)", &env);
        run("(define f (lambda (y) (+ x y)))", &env);
        assert_eq!(run("(f 5)", &env).to_string(), "15");
    }

    #[test]
    fn set_mutates_enclosing_frame() {
        let env = fresh_env();
        run("(define x 1)", &env);
        run("(define (bump) (set! x (+ x 1)))", &env);
        run("(bump)", &env);
        assert_eq!(run("x", &env).to_string(), "2");
    }

    #[test]
    fn let_is_not_let_star() {
        let env = fresh_env();
        assert_eq!(
            run("(let ((x 1)) (let ((x 2) (y x)) y))", &env).to_string(),
            "1"
        );
    }

    #[test]
    fn dynamic_closure_sees_callers_frame() {
        let env = fresh_env();
        run("(define f (dlambda () (* a b)))", &env);
        run("(define (g) (define a 4) (define b 5) (f))", &env);
        assert_eq!(run("(g)", &env).to_string(), "20");
    }

    #[test]
    fn macro_expansion() {
        let env = fresh_env();
        run(
            "(define-macro (for p xs body) (list 'map (list 'lambda (list p) body) xs))",
            &env,
        );
        assert_eq!(run("(for i '(1 2 3) (* i i))", &env).to_string(), "(1 4 9)");
    }

    #[test]
    fn delay_force_memoizes() {
        let env = fresh_env();
        run("(define calls 0)", &env);
        run("(define p (delay (begin (set! calls (+ calls 1)) 99)))", &env);
        let p = run("p", &env);
        assert_eq!(force(&p).unwrap().to_string(), "99");
        force(&p).unwrap();
        assert_eq!(run("calls", &env).to_string(), "1");
    }

    #[test]
    fn cons_stream_does_not_evaluate_tail() {
        let env = fresh_env();
        run("(define (e lo hi) (if (> lo hi) '() (cons-stream lo (e (+ lo 1) hi))))", &env);
        let s = run("(e 10000 10005)", &env);
        assert_eq!(s.to_string(), "(10000 . #[promise (not forced)])");
    }

    #[test]
    fn deep_tail_recursion_does_not_overflow() {
        let env = fresh_env();
        run(
            "(define (sum n t) (if (zero? n) t (sum (- n 1) (+ n t))))",
            &env,
        );
        assert_eq!(run("(sum 1001 0)", &env).to_string(), "501501");
        run("(sum 1000000 0)", &env);
    }

    #[test]
    fn lexical_closure_state_scenario() {
        let env = fresh_env();
        run(
            "(define (mk b) (lambda (a) (if (>= b a) (begin (set! b (- b a)) b) \"Insufficient funds\")))",
            &env,
        );
        run("(define W (mk 100))", &env);
        assert_eq!(run("(W 50)", &env).to_string(), "50");
        assert_eq!(run("(W 70)", &env).to_string(), "\"Insufficient funds\"");
        assert_eq!(run("(W 40)", &env).to_string(), "10");
    }
}
