// ABOUTME: CLI entry point — REPL and script-file loader

mod config;
mod env;
mod error;
mod eval;
mod highlighter;
mod primitives;
mod reader;
mod token;
mod value;

use clap::Parser;
use config::{VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use env::Environment;
use highlighter::LispHelper;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::rc::Rc;

/// A tree-walking Scheme interpreter
#[derive(Parser, Debug)]
#[command(name = "tinyscm")]
#[command(version = VERSION)]
#[command(about = "A tree-walking Scheme interpreter")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Print the canonical S-expression form of each form instead of evaluating it
    #[arg(long = "ast")]
    ast: bool,
}

fn main() {
    let args = CliArgs::parse();

    let env = Environment::new();
    env::set_global(env.clone());
    primitives::install(&env);

    if let Some(script_path) = &args.script {
        if let Err(e) = run_script(script_path, &env, args.ast) {
            eprintln!("{e}");
            std::process::exit(1);
        }
        return;
    }

    run_repl(&env, args.ast);
}

/// Reads and evaluates every top-level form in a script file, in order.
fn run_script(path: &PathBuf, env: &Rc<Environment>, ast: bool) -> Result<(), String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {e}", path.display()))?;

    let forms = reader::read_all(&contents).map_err(|e| error::format_diagnostic(&e.into()))?;
    for form in forms {
        if ast {
            println!("{form}");
            continue;
        }
        eval::eval(form, env.clone()).map_err(|e| error::format_diagnostic(&e))?;
    }
    Ok(())
}

/// Interactive REPL: reads one top-level form per line, evaluates it against
/// the shared global environment, and prints the result.
fn run_repl(env: &Rc<Environment>, ast: bool) {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<LispHelper, _> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("failed to initialize REPL: {e}");
            std::process::exit(1);
        }
    };
    rl.set_helper(Some(LispHelper::new()));

    let history_file = ".tinyscm_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    loop {
        match rl.readline("scm> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match reader::read_one(&line) {
                    Ok(None) => continue,
                    Ok(Some(form)) => {
                        if ast {
                            println!("{form}");
                            continue;
                        }
                        match eval::eval(form, env.clone()) {
                            Ok(value) => println!("{value}"),
                            Err(e) => eprintln!("{}", error::format_diagnostic(&e)),
                        }
                    }
                    Err(e) => eprintln!("{}", error::format_diagnostic(&e.into())),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}
