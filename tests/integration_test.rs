// ABOUTME: Black-box scenario tests driving the reader and evaluator end to end

use std::rc::Rc;
use tinyscm::env::Environment;
use tinyscm::eval::eval;
use tinyscm::reader::read_one;
use tinyscm::value::Value;

fn setup() -> Rc<Environment> {
    let env = Environment::new();
    tinyscm::primitives::install(&env);
    env
}

fn eval_code(code: &str, env: &Rc<Environment>) -> Value {
    let expr = read_one(code).unwrap().unwrap();
    eval(expr, env.clone()).unwrap()
}

#[test]
fn lexical_closure_tracks_mutable_state_across_calls() {
    let env = setup();
    eval_code(
        "(define (mk b) (lambda (a) (if (>= b a) (begin (set! b (- b a)) b) \"Insufficient funds\")))",
        &env,
    );
    eval_code("(define W (mk 100))", &env);
    assert_eq!(eval_code("(W 50)", &env).to_string(), "50");
    assert_eq!(eval_code("(W 70)", &env).to_string(), "\"Insufficient funds\"");
    assert_eq!(eval_code("(W 40)", &env).to_string(), "10");
}

#[test]
fn dynamic_closure_reads_callers_bindings() {
    let env = setup();
    eval_code("(define f (dlambda () (* a b)))", &env);
    eval_code("(define (g) (define a 4) (define b 5) (f))", &env);
    assert_eq!(eval_code("(g)", &env).to_string(), "20");
}

#[test]
fn macro_expands_before_evaluation() {
    let env = setup();
    eval_code(
        "(define-macro (for p xs body) (list 'map (list 'lambda (list p) body) xs))",
        &env,
    );
    assert_eq!(
        eval_code("(for i '(1 2 3) (* i i))", &env).to_string(),
        "(1 4 9)"
    );
}

#[test]
fn cons_stream_tail_stays_an_unforced_promise() {
    let env = setup();
    eval_code(
        "(define (e lo hi) (if (> lo hi) '() (cons-stream lo (e (+ lo 1) hi))))",
        &env,
    );
    assert_eq!(
        eval_code("(e 10000 10005)", &env).to_string(),
        "(10000 . #[promise (not forced)])"
    );
    assert_eq!(
        eval_code("(force (stream-cdr (e 10000 10005)))", &env).to_string(),
        "(10001 . #[promise (not forced)])"
    );
}

#[test]
fn tail_recursive_sum_handles_a_million_iterations() {
    let env = setup();
    eval_code(
        "(define (sum n t) (if (zero? n) t (sum (- n 1) (+ n t))))",
        &env,
    );
    assert_eq!(eval_code("(sum 1001 0)", &env).to_string(), "501501");
    assert_eq!(eval_code("(sum 1000000 0)", &env).to_string(), "500000500000");
}

#[test]
fn let_binds_against_the_outer_environment_not_letstar() {
    let env = setup();
    assert_eq!(eval_code("(let ((x 2) (y 3)) (+ x y))", &env).to_string(), "5");
    assert_eq!(
        eval_code("(let ((x 1)) (let ((x 2) (y x)) y))", &env).to_string(),
        "1"
    );
}

#[test]
fn symbol_interning_makes_eq_true_for_same_spelling() {
    let env = setup();
    assert_eq!(eval_code("(eq? 'abc 'abc)", &env).to_string(), "#t");
}

#[test]
fn arithmetic_contagion_flips_integer_predicate() {
    let env = setup();
    assert_eq!(eval_code("(integer? (+ 1 2))", &env).to_string(), "#t");
    assert_eq!(eval_code("(integer? (+ 1 2.0))", &env).to_string(), "#f");
}

#[test]
fn promise_forces_an_effectful_thunk_exactly_once() {
    let env = setup();
    eval_code("(define count 0)", &env);
    eval_code(
        "(define p (delay (begin (set! count (+ count 1)) count)))",
        &env,
    );
    eval_code("(force p)", &env);
    eval_code("(force p)", &env);
    assert_eq!(eval_code("count", &env).to_string(), "1");
}

#[test]
fn define_inside_a_lambda_body_only_shadows_for_that_call() {
    let env = setup();
    eval_code("(define x 1)", &env);
    eval_code("(define (f) (define x 2) x)", &env);
    assert_eq!(eval_code("(f)", &env).to_string(), "2");
    assert_eq!(eval_code("x", &env).to_string(), "1");
}

#[test]
fn reader_round_trips_printed_values() {
    let env = setup();
    for code in ["42", "3.5", "#t", "#f", "\"hello\"", "'(1 2 3)", "'(1 . 2)"] {
        let original = eval_code(code, &env);
        let printed = original.to_string();
        let reread = read_one(&printed).unwrap().unwrap();
        assert_eq!(reread.to_string(), printed, "round-trip failed for {code}");
    }
}

#[test]
fn factorial_program_computes_expected_values() {
    let env = setup();
    eval_code(
        "(define (factorial n) (if (<= n 1) 1 (* n (factorial (- n 1)))))",
        &env,
    );
    assert_eq!(eval_code("(factorial 5)", &env).to_string(), "120");
    assert_eq!(eval_code("(factorial 0)", &env).to_string(), "1");
}
