use crate::ast::{
    BlockStatement, Expression, InfixOperator, Node, PrefixOperator, Program, Statement,
};
use crate::environment::{Env, Environment};
use crate::object::{native_bool, null, Function, Object};
use std::rc::Rc;
use tracing::{debug, trace};

/// Returns early from the enclosing function when `obj` is an error or a
/// return signal, otherwise yields it.
macro_rules! propagate {
    ($obj:expr) => {{
        let obj = $obj;
        if interrupts(&obj) {
            return obj;
        }
        obj
    }};
}

fn interrupts(obj: &Object) -> bool {
    matches!(obj, Object::Error { .. } | Object::ReturnValue { .. })
}

pub fn evaluate<'a>(node: impl Into<Node<'a>>, env: &Env) -> Rc<Object> {
    match node.into() {
        Node::Program(program) => eval_program(program, env),
        Node::Statement(stmt) => eval_statement(stmt, env),
        Node::Block(block) => eval_block_statement(block, env),
        Node::Expression(exp) => eval_expression(exp, env),
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
fn eval_program(program: &Program, env: &Env) -> Rc<Object> {
    let mut result = null();
    for stmt in &program.statements {
        result = eval_statement(stmt, env);
        match &*result {
            Object::ReturnValue { value } => return Rc::clone(value),
            Object::Error { message } => {
                debug!(%message, "evaluation stopped");
                return result;
            }
            _ => {}
        }
    }
    result
}

fn eval_block_statement(block: &BlockStatement, env: &Env) -> Rc<Object> {
    let mut result = null();
    for stmt in &block.statements {
        result = propagate!(eval_statement(stmt, env));
    }
    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Rc<Object> {
    use Statement::*;
    match statement {
        ExpressionStatement(exp) => eval_expression(exp, env),
        ReturnStatement(value) => {
            let value = match value {
                Some(exp) => propagate!(eval_expression(exp, env)),
                None => null(),
            };
            Rc::new(Object::ReturnValue { value })
        }
        LetStatement { name, value } => {
            let value = propagate!(eval_expression(value, env));
            env.borrow_mut().set(name, value);
            null()
        }
    }
}

fn eval_expression(expression: &Expression, env: &Env) -> Rc<Object> {
    use Expression::*;
    match expression {
        IntegerLiteral { value } => Rc::new(Object::Integer { value: *value }),
        Boolean { value } => native_bool(*value),
        StringLiteral { value } => Rc::new(Object::String {
            value: value.clone(),
        }),
        Identifier(name) => eval_identifier(name, env),
        PrefixExpression { operator, right } => {
            let right = propagate!(eval_expression(right, env));
            eval_prefix_expression(*operator, &right)
        }
        InfixExpression {
            left,
            operator,
            right,
        } => {
            let left = propagate!(eval_expression(left, env));
            let right = propagate!(eval_expression(right, env));
            eval_infix_expression(*operator, left, right)
        }
        IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = propagate!(eval_expression(condition, env));
            if condition.is_truthy() {
                eval_block_statement(consequence, env)
            } else if let Some(alt) = alternative {
                eval_block_statement(alt, env)
            } else {
                null()
            }
        }
        FunctionLiteral { parameters, body } => Rc::new(Object::Function(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),
        CallExpression {
            function,
            arguments,
        } => {
            let function = propagate!(eval_expression(function, env));
            let mut args = Vec::with_capacity(arguments.len());
            for arg in arguments {
                args.push(propagate!(eval_expression(arg, env)));
            }
            apply_function(&function, args)
        }
    }
}

fn eval_identifier(name: &str, env: &Env) -> Rc<Object> {
    env.borrow()
        .get(name)
        .unwrap_or_else(|| Object::error(format!("identifier not found: {}", name)))
}

fn eval_prefix_expression(operator: PrefixOperator, right: &Object) -> Rc<Object> {
    match operator {
        PrefixOperator::BANG => native_bool(!right.is_truthy()),
        PrefixOperator::MINUS => match right {
            Object::Integer { value } => Rc::new(Object::Integer {
                value: value.wrapping_neg(),
            }),
            _ => Object::error(format!("unknown operator: -{}", right.r#type())),
        },
    }
}

fn eval_infix_expression(
    operator: InfixOperator,
    left: Rc<Object>,
    right: Rc<Object>,
) -> Rc<Object> {
    if left.r#type() != right.r#type() {
        return Object::error(format!(
            "type mismatch: {} {} {}",
            left.r#type(),
            operator,
            right.r#type()
        ));
    }
    match (&*left, &*right) {
        (Object::Integer { value: l }, Object::Integer { value: r }) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::String { value: l }, Object::String { value: r }) => {
            eval_string_infix_expression(operator, l, r)
        }
        // booleans and null are singletons, so identity is equality
        _ => match operator {
            InfixOperator::EQ => native_bool(Rc::ptr_eq(&left, &right)),
            InfixOperator::NEQ => native_bool(!Rc::ptr_eq(&left, &right)),
            _ => unknown_infix_operator(operator, &left, &right),
        },
    }
}

fn unknown_infix_operator(operator: InfixOperator, left: &Object, right: &Object) -> Rc<Object> {
    Object::error(format!(
        "unknown operator: {} {} {}",
        left.r#type(),
        operator,
        right.r#type()
    ))
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> Rc<Object> {
    use InfixOperator::*;
    let value = match operator {
        PLUS => left.wrapping_add(right),
        MINUS => left.wrapping_sub(right),
        ASTERISK => left.wrapping_mul(right),
        SLASH => {
            if right == 0 {
                return Object::error("division by zero");
            }
            floor_div(left, right)
        }
        LT => return native_bool(left < right),
        GT => return native_bool(left > right),
        EQ => return native_bool(left == right),
        NEQ => return native_bool(left != right),
    };
    Rc::new(Object::Integer { value })
}

/// Integer division rounding toward negative infinity.
fn floor_div(left: i64, right: i64) -> i64 {
    let quotient = left.wrapping_div(right);
    if left.wrapping_rem(right) != 0 && ((left < 0) != (right < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

fn eval_string_infix_expression(operator: InfixOperator, left: &str, right: &str) -> Rc<Object> {
    match operator {
        InfixOperator::PLUS => Rc::new(Object::String {
            value: format!("{}{}", left, right),
        }),
        InfixOperator::EQ => native_bool(left == right),
        InfixOperator::NEQ => native_bool(left != right),
        _ => Object::error(format!("unknown operator: STRING {} STRING", operator)),
    }
}

fn apply_function(function: &Object, args: Vec<Rc<Object>>) -> Rc<Object> {
    let function = match function {
        Object::Function(function) => function,
        other => return Object::error(format!("not a function: {}", other.r#type())),
    };
    if function.parameters.len() != args.len() {
        return Object::error(format!(
            "wrong number of arguments: want={}, got={}",
            function.parameters.len(),
            args.len()
        ));
    }
    trace!(parameters = ?function.parameters, "call");
    let env = Environment::new_enclosed(&function.env);
    for (param, arg) in function.parameters.iter().zip(args) {
        env.borrow_mut().set(param, arg);
    }
    let evaluated = eval_block_statement(&function.body, &env);
    match &*evaluated {
        Object::ReturnValue { value } => Rc::clone(value),
        _ => evaluated,
    }
}
