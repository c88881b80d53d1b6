//! End-to-end programs driven through the public API, checking the output
//! a user would see on stdout.

use rlox::error::RuntimeError;
use rlox::interpreter::Interpreter;
use rlox::parser::Parser;
use rlox::resolver::Resolver;
use rlox::scanner::Scanner;
use rlox::session::Session;

enum Outcome {
    Ok(String),
    CompileError,
    RuntimeError(RuntimeError),
}

fn run(source: &str) -> Outcome {
    let mut session = Session::new();
    let tokens = Scanner::new(source, &mut session).scan_tokens();
    if session.had_error() {
        return Outcome::CompileError;
    }
    let mut parser = Parser::new(tokens, &mut session);
    let program = parser.parse();
    if session.had_error() {
        return Outcome::CompileError;
    }
    let mut resolver = Resolver::new(&mut session);
    resolver.resolve(&program);
    if session.had_error() {
        return Outcome::CompileError;
    }

    let mut output: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut output);
    match interpreter.interpret(&program) {
        Ok(()) => Outcome::Ok(String::from_utf8(output).unwrap()),
        Err(error) => Outcome::RuntimeError(error),
    }
}

fn expect_output(source: &str, expected: &str) {
    match run(source) {
        Outcome::Ok(output) => assert_eq!(output, expected),
        Outcome::CompileError => panic!("unexpected compile error in {source:?}"),
        Outcome::RuntimeError(error) => panic!("unexpected runtime error: {error}"),
    }
}

#[test]
fn prints_a_sum() {
    expect_output("print 1 + 2;", "3\n");
}

#[test]
fn concatenates_strings() {
    expect_output("var a = \"hi\"; print a + \" there\";", "hi there\n");
}

#[test]
fn counts_with_a_for_loop() {
    expect_output("for (var i = 0; i < 3; i = i + 1) print i;", "0\n1\n2\n");
}

#[test]
fn computes_fibonacci_recursively() {
    expect_output(
        "fun fib(n){ if (n<2) return n; return fib(n-1)+fib(n-2); } print fib(7);",
        "13\n",
    );
}

#[test]
fn inherits_methods() {
    expect_output(
        "class A{ greet(){ print \"hi\"; } } class B < A {} B().greet();",
        "hi\n",
    );
}

#[test]
fn adding_a_number_and_a_string_fails_at_runtime() {
    match run("print 1 + \"x\";") {
        Outcome::RuntimeError(error) => {
            assert_eq!(
                error.to_string(),
                "Operands must be two numbers or two strings.\n[line 1]"
            );
        }
        _ => panic!("expected a runtime error"),
    }
}

#[test]
fn missing_semicolon_is_a_compile_error() {
    assert!(matches!(run("var a = 1 var b = 2;"), Outcome::CompileError));
}

#[test]
fn compile_errors_suppress_execution_entirely() {
    // The first statement would print, and the last would raise a runtime
    // error, but the parse error in the middle stops everything.
    assert!(matches!(
        run("print 1; var 2; print nil + nil;"),
        Outcome::CompileError
    ));
}

#[test]
fn closures_outlive_their_defining_call() {
    expect_output(
        "fun outer() { var x = 1; fun inner() { return x; } return inner; } print outer()();",
        "1\n",
    );
}

#[test]
fn bound_methods_keep_their_receiver() {
    expect_output(
        "class Thing { init() { this.label = \"it\"; } name() { return this.label; } } \
         var thing = Thing(); var f = thing.name; print f();",
        "it\n",
    );
}

#[test]
fn constructors_return_instances() {
    expect_output(
        "class Point { init(x, y) { this.x = x; this.y = y; } } \
         var p = Point(3, 4); print p.x + p.y;",
        "7\n",
    );
}

#[test]
fn super_dispatches_past_the_current_class() {
    expect_output(
        "class A { m() { return \"A\"; } } \
         class B < A { m() { return \"B(\" + super.m() + \")\"; } } \
         print B().m();",
        "B(A)\n",
    );
}

#[test]
fn late_bound_globals_work_inside_functions() {
    expect_output(
        "fun show() { print answer; } var answer = 42; show();",
        "42\n",
    );
}
