use apollo_core::error::ApolloError;
use apollo_core::interpreter::Interpreter;
use apollo_core::lexer::scan;
use apollo_core::parser::Parser;
use apollo_core::token::{Token, TokenType};
use apollo_core::value::Value;

fn run(source: &str) -> Interpreter {
    let program = Parser::new(scan(source).unwrap()).parse().unwrap();
    let mut interpreter = Interpreter::new();
    interpreter.run(&program).unwrap();
    interpreter
}

fn run_err(source: &str) -> ApolloError {
    match scan(source) {
        Ok(tokens) => match Parser::new(tokens).parse() {
            Ok(program) => Interpreter::new().run(&program).unwrap_err(),
            Err(e) => e,
        },
        Err(e) => e,
    }
}

fn global(interpreter: &Interpreter, name: &str) -> Value {
    interpreter
        .globals()
        .get(&Token::with_lexeme(TokenType::Identifier, 0, name))
        .unwrap()
}

#[test]
fn scenario_arithmetic_and_precedence() {
    let interpreter = run("result = 2 + 3 * 4 - 1");
    assert_eq!(global(&interpreter, "result"), Value::Int(13));
}

#[test]
fn scenario_string_and_comparison() {
    let interpreter = run(r#"greeting = "hello, " + "world"
is_equal = greeting == "hello, world""#);
    assert_eq!(global(&interpreter, "greeting"), Value::Str("hello, world".into()));
    assert_eq!(global(&interpreter, "is_equal"), Value::Bool(true));
}

#[test]
fn scenario_nested_if_elif_else() {
    let source = "score = 72\nif score >= 90:\n    grade = \"A\"\nelif score >= 80:\n    grade = \"B\"\nelif score >= 70:\n    grade = \"C\"\nelse:\n    grade = \"F\"";
    let interpreter = run(source);
    assert_eq!(global(&interpreter, "grade"), Value::Str("C".into()));
}

#[test]
fn scenario_while_loop_accumulates() {
    let source = "total = 0\ni = 1\nwhile i <= 5:\n    total = total + i\n    i = i + 1";
    let interpreter = run(source);
    assert_eq!(global(&interpreter, "total"), Value::Int(15));
}

#[test]
fn scenario_functions_and_recursion() {
    let source = "def factorial(n):\n    if n == 0:\n        return 1\n    return n * factorial(n - 1)\nresult = factorial(5)";
    let interpreter = run(source);
    assert_eq!(global(&interpreter, "result"), Value::Int(120));
}

#[test]
fn scenario_non_lexical_function_scope() {
    // A function body sees globals, not the environment of its call site.
    let source = "value = \"global\"\ndef read_value():\n    return value\ndef shadow_and_call():\n    value = \"local\"\n    return read_value()\nresult = shadow_and_call()";
    let interpreter = run(source);
    assert_eq!(global(&interpreter, "result"), Value::Str("global".into()));
}

#[test]
fn scenario_ternary_and_comma_expression() {
    let source = "label = \"even\" if 10 % 2 == 0 else \"odd\"\npacked = 1, 2, 3";
    let interpreter = run(source);
    assert_eq!(global(&interpreter, "label"), Value::Str("even".into()));
    assert_eq!(global(&interpreter, "packed"), Value::Int(3));
}

#[test]
fn scenario_builtin_len_and_str_composition() {
    let source = "message = str(len(\"abcdef\"))";
    let interpreter = run(source);
    assert_eq!(global(&interpreter, "message"), Value::Str("6".into()));
}

#[test]
fn scenario_indentation_error_is_reported() {
    let err = run_err("if True:\n    a = 1\n  b = 2");
    assert!(matches!(err, ApolloError::IndentationError { .. }));
}

#[test]
fn scenario_division_by_zero_is_runtime_error() {
    let err = run_err("a = 1 / 0");
    assert!(matches!(err, ApolloError::RuntimeException { .. }));
}
