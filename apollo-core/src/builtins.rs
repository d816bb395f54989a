use crate::error::ApolloError;
use crate::value::Value;

/// Installs the built-in callables into `env` as part of global setup.
pub fn install(env: &crate::environment::Environment) {
    env.define("print", Value::Builtin { name: "print", func: print });
    env.define("str", Value::Builtin { name: "str", func: str_ });
    env.define("len", Value::Builtin { name: "len", func: len });
}

fn print(args: &[Value]) -> Result<Value, ApolloError> {
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::None)
}

fn str_(args: &[Value]) -> Result<Value, ApolloError> {
    match args {
        [value] => Ok(Value::Str(value.to_string())),
        _ => Err(ApolloError::RuntimeException {
            message: format!("str() takes exactly one argument ({} given)", args.len()),
            token: builtin_call_token(),
        }),
    }
}

fn len(args: &[Value]) -> Result<Value, ApolloError> {
    match args {
        [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
        [other] => Err(ApolloError::RuntimeException {
            message: format!("object of type '{}' has no len()", other.type_name()),
            token: builtin_call_token(),
        }),
        _ => Err(ApolloError::RuntimeException {
            message: format!("len() takes exactly one argument ({} given)", args.len()),
            token: builtin_call_token(),
        }),
    }
}

/// Built-ins raise errors without a real call-site token on hand; the
/// interpreter's call dispatch replaces this with the actual call token
/// before the error reaches the caller.
fn builtin_call_token() -> crate::token::Token {
    crate::token::Token::new(crate::token::TokenType::Eof, 0)
}
