//! Callable values: user functions and the native built-ins.

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::instance::Instance;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

/// A user-declared function or method: the shared declaration, the frame
/// captured at the declaration site, and whether it is an `init` method.
#[derive(Clone, Debug)]
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Environment,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Environment,
        is_initializer: bool,
    ) -> LoxFunction {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// A copy of this function whose closure is a fresh frame binding
    /// `this` to `instance`.
    pub fn bind(&self, instance: &Instance) -> LoxFunction {
        let environment = self.closure.new_child();
        environment.define("this", Value::Instance(instance.clone()));
        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }

    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<'_, W>,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        let environment = self.closure.new_child();
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument.clone());
        }
        let flow = interpreter.execute_block(&self.declaration.body, environment)?;
        if self.is_initializer {
            // An initializer yields its instance even on an early `return;`.
            return self.closure.get_this_at(0, &self.declaration.name);
        }
        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn ptr_eq(&self, other: &LoxFunction) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && self.closure.ptr_eq(&other.closure)
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub call: fn(&[Value]) -> Value,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}
