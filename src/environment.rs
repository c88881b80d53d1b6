//! Lexical frames.
//!
//! An [`Environment`] is a cheap-clone handle onto a reference-counted frame.
//! Frames link only to their enclosing frame, so the chain is acyclic and a
//! closure keeps its defining frame alive simply by holding a handle to it.

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

#[derive(Debug, Default)]
struct Frame {
    values: BTreeMap<String, Value>,
    enclosing: Option<Rc<RefCell<Frame>>>,
}

impl Environment {
    /// A root frame with no enclosing scope (the globals).
    pub fn new() -> Environment {
        Environment {
            frame: Rc::new(RefCell::new(Frame::default())),
        }
    }

    /// A fresh frame whose enclosing scope is `self`.
    pub fn new_child(&self) -> Environment {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                values: BTreeMap::new(),
                enclosing: Some(Rc::clone(&self.frame)),
            })),
        }
    }

    pub fn define(&self, name: &str, value: Value) {
        self.frame.borrow_mut().values.insert(name.to_string(), value);
    }

    /// Look `name` up in this frame only. Used for globals; resolved locals
    /// go through [`Environment::get_at`].
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        match self.frame.borrow().values.get(&name.lexeme) {
            Some(value) => Ok(value.clone()),
            None => Err(undefined(name)),
        }
    }

    /// Assign to `name` in this frame only.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut frame = self.frame.borrow_mut();
        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }

    /// Read `name` from the frame exactly `distance` hops up the chain.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        self.ancestor(distance).get(name)
    }

    /// Assign to `name` in the frame exactly `distance` hops up the chain.
    pub fn assign_at(
        &self,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        self.ancestor(distance).assign(name, value)
    }

    /// Fetch the `this` binding `distance` hops up. `keyword` only supplies
    /// the line for the (resolver-prevented) failure case.
    pub fn get_this_at(&self, distance: usize, keyword: &Token) -> Result<Value, RuntimeError> {
        match self.ancestor(distance).frame.borrow().values.get("this") {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::new(keyword, "Undefined variable 'this'.")),
        }
    }

    fn ancestor(&self, distance: usize) -> Environment {
        let mut frame = Rc::clone(&self.frame);
        for _ in 0..distance {
            let enclosing = frame
                .borrow()
                .enclosing
                .as_ref()
                .map(Rc::clone)
                .unwrap_or_else(|| Rc::clone(&frame));
            frame = enclosing;
        }
        Environment { frame }
    }

    /// Two handles are equal when they share a frame.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame)
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod environment_tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::Identifier, name, 1)
    }

    #[test]
    fn define_get_assign() {
        let env = Environment::new();
        let a = ident("a");
        assert!(env.get(&a).is_err());
        env.define("a", Value::Number(1.0));
        assert!(matches!(env.get(&a), Ok(Value::Number(n)) if n == 1.0));
        env.assign(&a, Value::Number(2.0)).unwrap();
        assert!(matches!(env.get(&a), Ok(Value::Number(n)) if n == 2.0));
        assert!(env.assign(&ident("b"), Value::Nil).is_err());
    }

    #[test]
    fn hop_exact_lookup() {
        let root = Environment::new();
        root.define("a", Value::Number(1.0));
        let child = root.new_child();
        let grandchild = child.new_child();
        let a = ident("a");

        // Frame-local get does not search the chain.
        assert!(grandchild.get(&a).is_err());
        assert!(matches!(grandchild.get_at(2, &a), Ok(Value::Number(n)) if n == 1.0));
        assert!(grandchild.get_at(1, &a).is_err());

        grandchild.assign_at(2, &a, Value::Number(7.0)).unwrap();
        assert!(matches!(root.get(&a), Ok(Value::Number(n)) if n == 7.0));
    }

    #[test]
    fn shadowing_leaves_outer_frame_alone() {
        let root = Environment::new();
        root.define("x", Value::Number(1.0));
        let child = root.new_child();
        child.define("x", Value::Number(2.0));
        let x = ident("x");
        assert!(matches!(child.get(&x), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(root.get(&x), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn handles_share_one_frame() {
        let env = Environment::new();
        let captured = env.clone();
        env.define("x", Value::Number(3.0));
        assert!(matches!(captured.get(&ident("x")), Ok(Value::Number(n)) if n == 3.0));
        assert!(env.ptr_eq(&captured));
        assert!(!env.ptr_eq(&env.new_child()));
    }

    #[test]
    fn frame_outlives_its_creator() {
        let grandchild = {
            let root = Environment::new();
            root.define("kept", Value::String("alive".to_string()));
            root.new_child().new_child()
        };
        let kept = ident("kept");
        assert!(matches!(grandchild.get_at(2, &kept), Ok(Value::String(s)) if s == "alive"));
    }
}
