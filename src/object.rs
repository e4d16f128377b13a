use crate::ast::BlockStatement;
use crate::environment::Env;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use tracing::trace;

#[derive(Debug)]
pub enum Object {
    Integer { value: i64 },
    Boolean { value: bool },
    String { value: String },
    Null,
    ReturnValue { value: Rc<Object> },
    Error { message: String },
    Function(Function),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    ReturnValue,
    Error,
    Function,
}

pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Env,
}

// The captured environment usually holds the function itself.
impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}

thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean { value: true });
    static FALSE: Rc<Object> = Rc::new(Object::Boolean { value: false });
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

/// The shared `true`/`false` instance. Booleans are never allocated anywhere else.
pub fn native_bool(value: bool) -> Rc<Object> {
    if value {
        TRUE.with(Rc::clone)
    } else {
        FALSE.with(Rc::clone)
    }
}

pub fn null() -> Rc<Object> {
    NULL.with(Rc::clone)
}

impl Object {
    pub fn r#type(&self) -> ObjectType {
        use Object::*;
        match self {
            Integer { .. } => ObjectType::Integer,
            Boolean { .. } => ObjectType::Boolean,
            String { .. } => ObjectType::String,
            Null => ObjectType::Null,
            ReturnValue { .. } => ObjectType::ReturnValue,
            Error { .. } => ObjectType::Error,
            Object::Function(..) => ObjectType::Function,
        }
    }
    pub fn error(message: impl Into<std::string::String>) -> Rc<Object> {
        let message = message.into();
        trace!(%message, "runtime error");
        Rc::new(Object::Error { message })
    }
    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error { .. })
    }
    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean { value: false })
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ObjectType::*;
        let name = match self {
            Integer => "INTEGER",
            Boolean => "BOOLEAN",
            String => "STRING",
            Null => "NULL",
            ReturnValue => "RETURN_VALUE",
            Error => "ERROR",
            ObjectType::Function => "FUNCTION",
        };
        write!(f, "{}", name)
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Object::*;
        match self {
            Integer { value } => write!(f, "{}", value),
            Boolean { value } => write!(f, "{}", value),
            String { value } => write!(f, "{}", value),
            Null => write!(f, "null"),
            ReturnValue { value } => write!(f, "{}", value),
            Error { message } => write!(f, "ERROR: {}", message),
            Object::Function(func) => {
                write!(f, "fn({}) {}", func.parameters.join(", "), func.body)
            }
        }
    }
}
