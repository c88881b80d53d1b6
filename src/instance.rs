use crate::class::Class;
use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// An instance of a class: a shared handle over its class reference and its
/// mutable field map.
#[derive(Clone, Debug)]
pub struct Instance {
    data: Rc<RefCell<InstanceData>>,
}

#[derive(Debug)]
struct InstanceData {
    class: Class,
    fields: BTreeMap<String, Value>,
}

impl Instance {
    pub fn new(class: Class) -> Instance {
        Instance {
            data: Rc::new(RefCell::new(InstanceData {
                class,
                fields: BTreeMap::new(),
            })),
        }
    }

    /// Property lookup: fields first, then class methods. A method comes
    /// back bound to this instance.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.data.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(method) = self.data.borrow().class.find_method(&name.lexeme) {
            return Ok(Value::Function(method.bind(self)));
        }
        Err(RuntimeError::new(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.data
            .borrow_mut()
            .fields
            .insert(name.lexeme.clone(), value);
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.data.borrow().class)
    }
}
