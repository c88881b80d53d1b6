//! Tree-walking evaluator.
//!
//! Statements are executed in order; expressions evaluate recursively with
//! exhaustive matches over the AST variants. `print` output goes to a
//! caller-supplied sink so the interpreter can be driven from tests as
//! easily as from the command line.

use crate::ast::{Expr, Stmt};
use crate::callable::{LoxFunction, NativeFunction};
use crate::class::Class;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::instance::Instance;
use crate::token::{Token, TokenType};
use crate::value::Value;
use log::debug;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// How a statement finished: fell through normally, or hit a `return` that
/// is still travelling out to its function-call boundary.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter<'w, W: Write> {
    globals: Environment,
    environment: Environment,
    out: &'w mut W,
}

impl<'w, W: Write> Interpreter<'w, W> {
    pub fn new(out: &'w mut W) -> Interpreter<'w, W> {
        let globals = Environment::new();
        globals.define(
            "clock",
            Value::Native(NativeFunction {
                name: "clock",
                arity: 0,
                call: |_arguments| {
                    let elapsed = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .unwrap_or_default();
                    Value::Number(elapsed.as_millis() as f64)
                },
            }),
        );
        Interpreter {
            environment: globals.clone(),
            globals,
            out,
        }
    }

    /// Run a resolved program. The first runtime error abandons the rest of
    /// the statement stream.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        debug!("interpreting {} top-level statement(s)", statements.len());
        for statement in statements {
            // A top-level `return` is rejected by the resolver, so the flow
            // result here is always `Normal`.
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Stmt) -> Result<Flow, RuntimeError> {
        match statement {
            Stmt::Block(statements) => {
                self.execute_block(statements, self.environment.new_child())
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let superclass = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(parent) => Some(parent),
                        _ => {
                            let token = match expr {
                                Expr::Variable { name, .. } => name,
                                _ => name,
                            };
                            return Err(RuntimeError::new(token, "Superclass must be a class."));
                        }
                    },
                    None => None,
                };

                self.environment.define(&name.lexeme, Value::Nil);

                // Methods of a subclass close over an extra frame holding
                // `super`, so `super.m()` in any of them finds the parent.
                let method_closure = match &superclass {
                    Some(parent) => {
                        let enclosing = self.environment.new_child();
                        enclosing.define("super", Value::Class(parent.clone()));
                        enclosing
                    }
                    None => self.environment.clone(),
                };

                let mut method_table = BTreeMap::new();
                for method in methods {
                    let function = LoxFunction::new(
                        Rc::clone(method),
                        method_closure.clone(),
                        method.name.lexeme == "init",
                    );
                    method_table.insert(method.name.lexeme.clone(), function);
                }

                let class = Class::new(&name.lexeme, superclass, method_table);
                self.environment.assign(name, Value::Class(class))?;
                Ok(Flow::Normal)
            }
            Stmt::Expression(expression) => {
                self.evaluate(expression)?;
                Ok(Flow::Normal)
            }
            Stmt::Function(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    self.environment.clone(),
                    false,
                );
                self.environment
                    .define(&declaration.name.lexeme, Value::Function(function));
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Print(expression) => {
                let value = self.evaluate(expression)?;
                writeln!(self.out, "{value}")?;
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(Flow::Normal)
            }
            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` inside `environment`, restoring the previous frame
    /// on every exit path, including returns and runtime errors.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> Result<Flow, RuntimeError> {
        let previous = self.environment.clone();
        self.environment = environment;
        let mut result = Ok(Flow::Normal);
        for statement in statements {
            result = self.execute(statement);
            match result {
                Ok(Flow::Normal) => (),
                _ => break,
            }
        }
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        match expression {
            Expr::Assign { name, value, depth } => {
                let value = self.evaluate(value)?;
                match depth.get() {
                    Some(distance) => {
                        self.environment.assign_at(distance, name, value.clone())?
                    }
                    None => self.globals.assign(name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(operator, left, right)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;
                let mut evaluated = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push(self.evaluate(argument)?);
                }
                self.call(callee, &evaluated, paren)
            }
            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(RuntimeError::new(name, "Only instances have properties.")),
            },
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuits = match operator.kind {
                    TokenType::Or => is_truthy(&left),
                    _ => !is_truthy(&left),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;
                    instance.set(name, value.clone());
                    Ok(value)
                }
                _ => Err(RuntimeError::new(name, "Only instances have fields.")),
            },
            Expr::Super {
                keyword,
                method,
                depth,
            } => {
                // The resolver rejects 'super' outside a subclass method, so
                // a depth is recorded and the 'this' frame sits one hop
                // closer than the 'super' frame.
                let distance = depth.get().unwrap_or_default();
                let parent = match self.environment.get_at(distance, keyword)? {
                    Value::Class(parent) => parent,
                    _ => unreachable!("'super' frames always hold a class"),
                };
                let instance = match self
                    .environment
                    .get_this_at(distance.saturating_sub(1), keyword)?
                {
                    Value::Instance(instance) => instance,
                    _ => unreachable!("'this' frames always hold an instance"),
                };
                match parent.find_method(&method.lexeme) {
                    Some(found) => Ok(Value::Function(found.bind(&instance))),
                    None => Err(RuntimeError::new(
                        method,
                        format!("Undefined property '{}'.", method.lexeme),
                    )),
                }
            }
            Expr::This { keyword, depth } => match depth.get() {
                Some(distance) => self.environment.get_at(distance, keyword),
                None => self.globals.get(keyword),
            },
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.kind {
                    TokenType::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
                    },
                    _ => Ok(Value::Boolean(!is_truthy(&right))),
                }
            }
            Expr::Variable { name, depth } => match depth.get() {
                Some(distance) => self.environment.get_at(distance, name),
                None => self.globals.get(name),
            },
        }
    }

    /// Both operands are already evaluated, left first, before any type
    /// checking happens.
    fn binary(
        &mut self,
        operator: &Token,
        left: Value,
        right: Value,
    ) -> Result<Value, RuntimeError> {
        match operator.kind {
            TokenType::EqualEqual => Ok(Value::Boolean(is_equal(&left, &right))),
            TokenType::BangEqual => Ok(Value::Boolean(!is_equal(&left, &right))),
            TokenType::Plus => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
                _ => Err(RuntimeError::new(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },
            _ => {
                let (l, r) = number_operands(operator, left, right)?;
                Ok(match operator.kind {
                    TokenType::Minus => Value::Number(l - r),
                    TokenType::Slash => Value::Number(l / r),
                    TokenType::Star => Value::Number(l * r),
                    TokenType::Greater => Value::Boolean(l > r),
                    TokenType::GreaterEqual => Value::Boolean(l >= r),
                    TokenType::Less => Value::Boolean(l < r),
                    _ => Value::Boolean(l <= r),
                })
            }
        }
    }

    fn call(
        &mut self,
        callee: Value,
        arguments: &[Value],
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;
                function.call(self, arguments)
            }
            Value::Native(native) => {
                check_arity(native.arity, arguments.len(), paren)?;
                Ok((native.call)(arguments))
            }
            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;
                let instance = Instance::new(class.clone());
                if let Some(initializer) = class.find_method("init") {
                    initializer.bind(&instance).call(self, arguments)?;
                }
                Ok(Value::Instance(instance))
            }
            _ => Err(RuntimeError::new(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<(), RuntimeError> {
    if expected != got {
        return Err(RuntimeError::new(
            paren,
            format!("Expected {expected} arguments but got {got}."),
        ));
    }
    Ok(())
}

fn number_operands(
    operator: &Token,
    left: Value,
    right: Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
    }
}

/// `nil` and `false` are false; everything else is true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Boolean(b) => *b,
        _ => true,
    }
}

fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        // IEEE comparison: NaN != NaN, -0 == 0.
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Function(l), Value::Function(r)) => l.ptr_eq(r),
        (Value::Native(l), Value::Native(r)) => l.name == r.name,
        (Value::Class(l), Value::Class(r)) => l.ptr_eq(r),
        (Value::Instance(l), Value::Instance(r)) => l.ptr_eq(r),
        _ => false,
    }
}
