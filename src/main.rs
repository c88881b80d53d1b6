use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use rlox::interpreter::Interpreter;
use rlox::parser::Parser;
use rlox::resolver::Resolver;
use rlox::scanner::Scanner;
use rlox::session::Session;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: rlox [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let mut session = Session::new();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Could not read {path}: {error}");
            process::exit(65);
        }
    };

    let mut out = io::stdout();
    let mut interpreter = Interpreter::new(&mut out);
    run(&source, &mut session, &mut interpreter);

    // Compile errors take precedence over runtime errors.
    if session.had_error() {
        process::exit(65);
    }
    if session.had_runtime_error() {
        process::exit(70);
    }
}

fn run_prompt() {
    let mut out = io::stdout();
    let mut session = Session::new();
    let mut interpreter = Interpreter::new(&mut out);

    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        line.clear();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => (),
        }
        if line.trim().is_empty() {
            break;
        }

        run(&line, &mut session, &mut interpreter);
        // One bad line should not poison the next one.
        session.reset();
    }
}

fn run<W: Write>(source: &str, session: &mut Session, interpreter: &mut Interpreter<'_, W>) {
    let tokens = Scanner::new(source, session).scan_tokens();
    if session.had_error() {
        return;
    }

    let mut parser = Parser::new(tokens, session);
    let program = parser.parse();
    if session.had_error() {
        return;
    }

    let mut resolver = Resolver::new(session);
    resolver.resolve(&program);
    if session.had_error() {
        return;
    }

    if let Err(error) = interpreter.interpret(&program) {
        session.runtime_error(&error);
    }
}
