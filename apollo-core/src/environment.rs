use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::ApolloError;
use crate::token::Token;
use crate::value::Value;

struct EnvironmentData {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

/// A name-to-value scope, optionally chained to an enclosing scope.
///
/// Cloning an `Environment` is cheap and shares the same underlying scope —
/// `Function` values keep one of these alive independently of the statement
/// that defined them.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<EnvironmentData>>);

impl Environment {
    pub fn new() -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            values: HashMap::new(),
            enclosing: Option::None,
        })))
    }

    pub fn with_enclosing(enclosing: Environment) -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        })))
    }

    /// Binds `name` in this scope, shadowing any binding of the same name
    /// in an enclosing scope. Assignment never propagates upward.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_string(), value);
    }

    pub fn get(&self, token: &Token) -> Result<Value, ApolloError> {
        let name = token.lexeme_str();
        let data = self.0.borrow();
        if let Some(value) = data.values.get(name) {
            return Ok(value.clone());
        }
        match &data.enclosing {
            Some(parent) => parent.get(token),
            Option::None => {
                debug!("name '{name}' not found in any enclosing scope");
                Err(ApolloError::NameNotFoundException {
                    name: name.to_string(),
                    token: token.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType as TT;

    fn name(n: &str) -> Token {
        Token::with_lexeme(TT::Identifier, 1, n)
    }

    #[test]
    fn defines_and_reads_locally() {
        let env = Environment::new();
        env.define("a", Value::Int(1));
        assert_eq!(env.get(&name("a")).unwrap(), Value::Int(1));
    }

    #[test]
    fn reads_through_enclosing_scope() {
        let globals = Environment::new();
        globals.define("a", Value::Int(1));
        let local = Environment::with_enclosing(globals);
        assert_eq!(local.get(&name("a")).unwrap(), Value::Int(1));
    }

    #[test]
    fn local_definition_shadows_without_mutating_enclosing() {
        let globals = Environment::new();
        globals.define("a", Value::Int(1));
        let local = Environment::with_enclosing(globals.clone());
        local.define("a", Value::Int(2));
        assert_eq!(local.get(&name("a")).unwrap(), Value::Int(2));
        assert_eq!(globals.get(&name("a")).unwrap(), Value::Int(1));
    }

    #[test]
    fn unbound_name_is_not_found() {
        let env = Environment::new();
        let err = env.get(&name("missing")).unwrap_err();
        assert!(matches!(err, ApolloError::NameNotFoundException { .. }));
    }
}
