// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::EvalError;
use crate::value::{ParamList, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<Rc<str>, Value>>,
    parent: Option<Rc<Environment>>,
}

thread_local! {
    static GLOBAL: RefCell<Option<Rc<Environment>>> = const { RefCell::new(None) };
}

/// Records the process-wide global environment, created once at startup.
pub fn set_global(env: Rc<Environment>) {
    GLOBAL.with(|g| *g.borrow_mut() = Some(env));
}

/// Returns the process-wide global environment. Used by primitives that
/// need to apply a dynamic closure without a lexical caller of their own.
pub fn global() -> Rc<Environment> {
    GLOBAL.with(|g| {
        g.borrow()
            .clone()
            .expect("global environment not initialized")
    })
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` in THIS frame unconditionally — shadows any binding of
    /// the same name already in this frame or a parent frame.
    pub fn define(&self, name: Rc<str>, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Walks this frame then parent frames looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.get(name)
            .ok_or_else(|| EvalError::UnboundSymbol(name.to_string()))
    }

    /// Mutates the first frame along the chain that already binds `name`.
    /// Fails with `AssignError` if no such frame exists.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let existing_key = self
            .bindings
            .borrow()
            .keys()
            .find(|k| k.as_ref() == name)
            .cloned();
        if let Some(key) = existing_key {
            self.bindings.borrow_mut().insert(key, value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => Err(EvalError::Assign(name.to_string())),
        }
    }

    /// Builds a child frame with `params` bound to `args`, per the three
    /// parameter shapes: proper list (exact arity), bare symbol (binds the
    /// whole argument list), and dotted list (fixed params + rest).
    pub fn extend(
        parent: Rc<Environment>,
        params: &ParamList,
        args: &[Value],
        function: &str,
    ) -> Result<Rc<Environment>, EvalError> {
        let frame = Environment::with_parent(parent);
        match params {
            ParamList::Proper(names) => {
                if names.len() != args.len() {
                    return Err(EvalError::arity(function, names.len().to_string(), args.len()));
                }
                for (name, arg) in names.iter().zip(args.iter()) {
                    frame.define(name.clone(), arg.clone());
                }
            }
            ParamList::Rest(name) => {
                frame.define(name.clone(), Value::list(args.to_vec()));
            }
            ParamList::Dotted(names, rest) => {
                if args.len() < names.len() {
                    return Err(EvalError::arity(
                        function,
                        format!("at least {}", names.len()),
                        args.len(),
                    ));
                }
                for (name, arg) in names.iter().zip(args.iter()) {
                    frame.define(name.clone(), arg.clone());
                }
                frame.define(rest.clone(), Value::list(args[names.len()..].to_vec()));
            }
        }
        Ok(frame)
    }
}
