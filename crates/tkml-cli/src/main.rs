use clap::{Parser, Subcommand};
use std::path::Path;
use tkml_expr::{Env, Evaluator, ExprEvaluator, Scope};
use tkml_parser::{line_col, ParseOptions, Tree};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tkml")]
#[command(about = "TKML: markup for Tk-style widget trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Bind a name for expressions, e.g. `--var width=7` (repeatable)
    #[arg(long = "var", value_name = "NAME=EXPR", value_parser = parse_binding, global = true)]
    vars: Vec<(String, String)>,

    /// Reject content after the root element
    #[arg(long, global = true)]
    strict: bool,

    /// Maximum element nesting depth
    #[arg(long, value_name = "N", global = true)]
    max_depth: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Check a .tkml file for errors
    Check {
        /// Input .tkml file
        path: String,
    },

    /// Print a .tkml file in canonical form
    Fmt {
        /// Input .tkml file
        path: String,
    },

    /// Print the parsed tree as JSON
    Tree {
        /// Input .tkml file
        path: String,
    },
}

fn parse_binding(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, expr)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), expr.to_string()))
        }
        _ => Err(format!("expected NAME=EXPR, got '{arg}'")),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env = bindings(&cli.vars);
    let mut options = ParseOptions::new().allow_trailing(!cli.strict);
    if let Some(depth) = cli.max_depth {
        options = options.max_depth(depth);
    }

    match &cli.command {
        Command::Check { path } => cmd_check(path, &env, &options),
        Command::Fmt { path } => cmd_fmt(path, &env, &options),
        Command::Tree { path } => cmd_tree(path, &env, &options),
    }
}

/// Evaluate `--var` bindings in order; each sees the ones before it.
fn bindings(vars: &[(String, String)]) -> Env {
    let mut env = Env::new();
    let empty = Env::new();
    for (name, expr) in vars {
        let value = match ExprEvaluator.evaluate(expr, &Scope::new(&env, &empty)) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Error in --var {name}: {e}");
                std::process::exit(1);
            }
        };
        tracing::debug!(name = %name, value = ?value, "bound variable");
        env.insert(name.clone(), value);
    }
    env
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_file(path: &str, env: &Env, options: &ParseOptions) -> Tree {
    let source = read_source(path);
    let inner = Env::new();
    match tkml_parser::parse_with(&source, &Scope::new(env, &inner), &ExprEvaluator, options) {
        Ok(tree) => tree,
        Err(e) => {
            let (line, column) = line_col(&source, e.offset());
            eprintln!("{path}:{line}:{column}: parse error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(path: &str, env: &Env, options: &ParseOptions) {
    let tree = parse_file(path, env, options);
    eprintln!("OK: {path} ({} elements)", tree.len());
}

fn cmd_fmt(path: &str, env: &Env, options: &ParseOptions) {
    let tree = parse_file(path, env, options);
    println!("{}", tkml_render::to_markup(&tree));
}

fn cmd_tree(path: &str, env: &Env, options: &ParseOptions) {
    let tree = parse_file(path, env, options);
    match serde_json::to_string_pretty(&tree) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing tree: {e}");
            std::process::exit(1);
        }
    }
}
