use crate::callable::LoxFunction;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A class value. Shared by every instance of the class and by any `super`
/// frame referencing it.
#[derive(Clone, Debug)]
pub struct Class {
    data: Rc<ClassData>,
}

#[derive(Debug)]
struct ClassData {
    name: String,
    superclass: Option<Class>,
    methods: BTreeMap<String, LoxFunction>,
}

impl Class {
    pub fn new(
        name: &str,
        superclass: Option<Class>,
        methods: BTreeMap<String, LoxFunction>,
    ) -> Class {
        Class {
            data: Rc::new(ClassData {
                name: name.to_string(),
                superclass,
                methods,
            }),
        }
    }

    /// Walk the superclass chain for `name`; the nearest definition wins.
    pub fn find_method(&self, name: &str) -> Option<LoxFunction> {
        self.data.methods.get(name).cloned().or_else(|| {
            self.data
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }

    /// Constructing a class takes as many arguments as its `init` method.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data.name)
    }
}
