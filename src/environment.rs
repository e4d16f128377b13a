use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Rc<Object>>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }
    /// A fresh scope whose lookups fall back to `outer`.
    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.store.get(name) {
            Some(obj) => Some(Rc::clone(obj)),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }
    /// Binds in this scope only; an outer binding of the same name is shadowed, never updated.
    pub fn set(&mut self, name: &str, obj: Rc<Object>) {
        self.store.insert(name.to_string(), obj);
    }
}
