// ABOUTME: Primitive procedure surface — installs host-implemented procedures into an environment

mod arithmetic;
mod control;
mod io;
mod pairs;
mod predicates;
mod streams;

use crate::env::Environment;
use crate::value::{intern, Value};
use std::rc::Rc;

/// Installs every required primitive (§4.8) into `env`, the global frame.
pub fn install(env: &Rc<Environment>) {
    let all: &[(&str, fn(&[Value]) -> Result<Value, crate::error::EvalError>)] = &[
        ("+", arithmetic::add),
        ("-", arithmetic::sub),
        ("*", arithmetic::mul),
        ("/", arithmetic::div),
        ("quotient", arithmetic::quotient),
        ("remainder", arithmetic::remainder),
        ("modulo", arithmetic::modulo),
        ("abs", arithmetic::abs),
        ("=", arithmetic::num_eq),
        ("<", arithmetic::lt),
        (">", arithmetic::gt),
        ("<=", arithmetic::le),
        (">=", arithmetic::ge),
        ("eq?", predicates::is_eq),
        ("equal?", predicates::is_equal),
        ("not", predicates::not),
        ("null?", predicates::is_null),
        ("pair?", predicates::is_pair),
        ("atom?", predicates::is_atom),
        ("number?", predicates::is_number),
        ("integer?", predicates::is_integer),
        ("symbol?", predicates::is_symbol),
        ("string?", predicates::is_string),
        ("procedure?", predicates::is_procedure),
        ("zero?", predicates::is_zero),
        ("cons", pairs::cons),
        ("car", pairs::car),
        ("cdr", pairs::cdr),
        ("list", pairs::list),
        ("length", pairs::length),
        ("append", pairs::append),
        ("map", pairs::map),
        ("filter", pairs::filter),
        ("reduce", pairs::reduce),
        ("print", io::print),
        ("display", io::display),
        ("newline", io::newline),
        ("force", control::force_primitive),
        ("apply", control::apply_primitive),
        ("exit", control::exit),
        ("stream-car", streams::stream_car),
        ("stream-cdr", streams::stream_cdr),
        ("stream-map", streams::stream_map),
        ("stream-filter", streams::stream_filter),
        ("stream-reduce", streams::stream_reduce),
    ];

    for (name, func) in all {
        env.define(
            intern(name),
            Value::Primitive {
                name: intern(name),
                func: *func,
            },
        );
    }
}
