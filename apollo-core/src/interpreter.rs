use crate::ast::{Expression, Program, Statement};
use crate::builtins;
use crate::environment::Environment;
use crate::error::{ApolloError, Result};
use crate::token::{Literal, Token, TokenType as TT};
use crate::value::{FunctionValue, Value};
use log::{debug, trace};
use std::rc::Rc;

/// The result of executing a statement: either control falls through to the
/// next statement, or a `return` has unwound the current function call.
///
/// This stands in for the source interpreter's exception-based return: a
/// `return` here is ordinary control flow, not an error.
pub enum Flow {
    Next,
    Return(Value),
}

pub struct Interpreter {
    globals: Environment,
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        builtins::install(&globals);
        Interpreter {
            env: globals.clone(),
            globals,
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<()> {
        self.interpret(program)?;
        Ok(())
    }

    /// Runs every top-level statement and collects the value of each
    /// top-level expression statement, in order. Statements with no value
    /// of their own (assignments, `if`, `while`, `def`, ...) contribute
    /// nothing to the result list.
    pub fn interpret(&mut self, program: &Program) -> Result<Vec<Value>> {
        debug!("interpreting program with {} statement(s)", program.statements.len());
        let mut results = Vec::new();
        for statement in &program.statements {
            if let Statement::Expression(expr) = statement {
                results.push(self.evaluate(expr)?);
            } else {
                self.execute(statement)?;
            }
        }
        Ok(results)
    }

    /// The outermost scope, where top-level assignments and function
    /// definitions end up.
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    fn execute(&mut self, statement: &Statement) -> Result<Flow> {
        trace!("executing statement: {}", statement_kind(statement));
        match statement {
            Statement::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Next)
            }
            Statement::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                self.env.define(name.lexeme_str(), value);
                Ok(Flow::Next)
            }
            Statement::Block(statements) => {
                for statement in statements {
                    match self.execute(statement)? {
                        Flow::Next => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Next)
            }
            Statement::If {
                condition,
                block,
                elif,
                else_block,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(block)
                } else if let Some(elif) = elif {
                    self.execute(elif)
                } else if let Some(else_block) = else_block {
                    self.execute(else_block)
                } else {
                    Ok(Flow::Next)
                }
            }
            Statement::While {
                condition,
                block,
                else_block,
            } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(block)? {
                        Flow::Next => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                if let Some(else_block) = else_block {
                    self.execute(else_block)
                } else {
                    Ok(Flow::Next)
                }
            }
            Statement::FunctionDefinition { name, params, block } => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: (**block).clone(),
                }));
                self.env.define(name.lexeme_str(), function);
                Ok(Flow::Next)
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    Option::None => Value::None,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Literal(literal) => Ok(literal_value(literal)),
            Expression::Keyword(token) => Ok(keyword_value(token)),
            Expression::Variable(token) => self.env.get(token),
            Expression::Grouping(inner) => self.evaluate(inner),
            Expression::Unary { operator, right } => self.unary(operator, right),
            Expression::Binary { left, operator, right } => self.binary(left, operator, right),
            Expression::Logical { left, operator, right } => self.logical(left, operator, right),
            Expression::Ternary {
                then_branch,
                condition,
                else_branch,
                ..
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expression::CommaExpression(items) => {
                // There is no list `Value` variant to hold the ordered
                // results in. Every sub-expression is still evaluated, in
                // order, for its side effects; only the last one's value
                // is observable here, matching the comma operator. The
                // full ordered list is never lost where it matters: call
                // arguments are flattened straight off the AST node in
                // `flatten_arguments`, not through this evaluation path.
                let mut last = Value::None;
                for item in items {
                    last = self.evaluate(item)?;
                }
                Ok(last)
            }
            Expression::Call { callee, paren, arguments } => {
                let callee_value = self.evaluate(callee)?;
                let args = match arguments {
                    Some(expr) => flatten_arguments(self, expr)?,
                    Option::None => Vec::new(),
                };
                self.call(callee_value, paren, args)
            }
        }
    }

    fn call(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Builtin { func, .. } => func(&args).map_err(|e| rebind_token(e, paren)),
            Value::Function(function) => {
                if args.len() != function.params.len() {
                    return Err(ApolloError::RuntimeException {
                        message: format!(
                            "expected {} argument(s) but got {}",
                            function.params.len(),
                            args.len()
                        ),
                        token: paren.clone(),
                    });
                }

                // Call-site environments are enclosed by globals, never by
                // the environment active at the call expression.
                let call_env = Environment::with_enclosing(self.globals.clone());
                for (param, arg) in function.params.iter().zip(args) {
                    call_env.define(param.lexeme_str(), arg);
                }

                let previous = std::mem::replace(&mut self.env, call_env);
                let result = self.execute(&function.body);
                self.env = previous;

                match result? {
                    Flow::Return(value) => Ok(value),
                    Flow::Next => Ok(Value::None),
                }
            }
            other => Err(ApolloError::RuntimeException {
                message: format!("'{}' object is not callable", other.type_name()),
                token: paren.clone(),
            }),
        }
    }

    fn unary(&mut self, operator: &Token, right: &Expression) -> Result<Value> {
        let value = self.evaluate(right)?;
        match operator.kind {
            TT::Minus => match value {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(n) => Ok(Value::Float(-n)),
                other => Err(type_error(operator, &format!("bad operand type for unary -: '{}'", other.type_name()))),
            },
            TT::Not | TT::Bang => Ok(Value::Bool(!value.is_truthy())),
            _ => unreachable!("unary operator must be MINUS, NOT, or BANG"),
        }
    }

    fn logical(&mut self, left: &Expression, operator: &Token, right: &Expression) -> Result<Value> {
        let left_value = self.evaluate(left)?;
        match operator.kind {
            TT::And => {
                if !left_value.is_truthy() {
                    return Ok(left_value);
                }
            }
            TT::Or => {
                if left_value.is_truthy() {
                    return Ok(left_value);
                }
            }
            _ => unreachable!("logical operator must be AND or OR"),
        }
        self.evaluate(right)
    }

    fn binary(&mut self, left: &Expression, operator: &Token, right: &Expression) -> Result<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use Value::*;
        match operator.kind {
            TT::Plus => match (&left, &right) {
                (Int(a), Int(b)) => Ok(Int(a + b)),
                (Float(a), Float(b)) => Ok(Float(a + b)),
                (Int(a), Float(b)) => Ok(Float(*a as f64 + b)),
                (Float(a), Int(b)) => Ok(Float(a + *b as f64)),
                (Str(a), Str(b)) => Ok(Str(format!("{a}{b}"))),
                _ => Err(type_mismatch(operator, &left, &right)),
            },
            TT::Minus => numeric(operator, &left, &right, |a, b| a - b, |a, b| a - b),
            TT::Star => numeric(operator, &left, &right, |a, b| a * b, |a, b| a * b),
            TT::Slash => match (as_f64(&left), as_f64(&right)) {
                (Some(_), Some(b)) if b == 0.0 => Err(ApolloError::RuntimeException {
                    message: "division by zero".to_string(),
                    token: operator.clone(),
                }),
                (Some(a), Some(b)) => Ok(Float(a / b)),
                _ => Err(type_mismatch(operator, &left, &right)),
            },
            TT::Percent => match (&left, &right) {
                (Int(_), Int(0)) => Err(ApolloError::RuntimeException {
                    message: "division by zero".to_string(),
                    token: operator.clone(),
                }),
                (Int(a), Int(b)) => Ok(Int(a % b)),
                _ => match (as_f64(&left), as_f64(&right)) {
                    (Some(a), Some(b)) if b != 0.0 => Ok(Float(a % b)),
                    (Some(_), Some(_)) => Err(ApolloError::RuntimeException {
                        message: "division by zero".to_string(),
                        token: operator.clone(),
                    }),
                    _ => Err(type_mismatch(operator, &left, &right)),
                },
            },
            TT::Equal => Ok(Bool(left == right)),
            TT::NEqual => Ok(Bool(left != right)),
            TT::Lesser => compare(operator, &left, &right, |o| o.is_lt()),
            TT::LEqual => compare(operator, &left, &right, |o| o.is_le()),
            TT::Greater => compare(operator, &left, &right, |o| o.is_gt()),
            TT::GEqual => compare(operator, &left, &right, |o| o.is_ge()),
            _ => unreachable!("unexpected binary operator"),
        }
    }
}

fn flatten_arguments(interpreter: &mut Interpreter, expr: &Expression) -> Result<Vec<Value>> {
    match expr {
        Expression::CommaExpression(items) => {
            items.iter().map(|item| interpreter.evaluate(item)).collect()
        }
        other => Ok(vec![interpreter.evaluate(other)?]),
    }
}

fn rebind_token(error: ApolloError, paren: &Token) -> ApolloError {
    match error {
        ApolloError::RuntimeException { message, token } if token.kind == TT::Eof && token.line == 0 => {
            ApolloError::RuntimeException { message, token: paren.clone() }
        }
        other => other,
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Expression(_) => "expression",
        Statement::Assignment { .. } => "assignment",
        Statement::Block(_) => "block",
        Statement::If { .. } => "if",
        Statement::While { .. } => "while",
        Statement::FunctionDefinition { .. } => "function definition",
        Statement::Return { .. } => "return",
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

fn keyword_value(token: &Token) -> Value {
    match token.kind {
        TT::True => Value::Bool(true),
        TT::False => Value::Bool(false),
        TT::None => Value::None,
        _ => unreachable!("keyword expression must be True, False, or None"),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => Option::None,
    }
}

fn numeric(
    operator: &Token,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        _ => match (as_f64(left), as_f64(right)) {
            (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
            _ => Err(type_mismatch(operator, left, right)),
        },
    }
}

fn compare(
    operator: &Token,
    left: &Value,
    right: &Value,
    accept: fn(std::cmp::Ordering) -> bool,
) -> Result<Value> {
    match (as_f64(left), as_f64(right)) {
        (Some(a), Some(b)) => a
            .partial_cmp(&b)
            .map(|o| Value::Bool(accept(o)))
            .ok_or_else(|| type_mismatch(operator, left, right)),
        _ => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(accept(a.cmp(b)))),
            _ => Err(type_mismatch(operator, left, right)),
        },
    }
}

fn type_mismatch(operator: &Token, left: &Value, right: &Value) -> ApolloError {
    type_error(
        operator,
        &format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            operator.lexeme_str(),
            left.type_name(),
            right.type_name()
        ),
    )
}

fn type_error(operator: &Token, message: &str) -> ApolloError {
    ApolloError::RuntimeException {
        message: message.to_string(),
        token: operator.clone(),
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
