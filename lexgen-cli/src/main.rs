mod runtime;

use clap::{Parser, Subcommand};
use lexgen::generate_lexer;
use runtime::Lexer;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum CliError {
    #[error("error reading {0}: {1}")]
    File(PathBuf, std::io::Error),
    #[error("error compiling lexer: {0}")]
    Generate(#[from] lexgen::GenerateError),
}

#[derive(Debug, Parser)]
#[command(name = "lexgen", about = "Compile and run lexers built from ordered regular expressions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a file of expressions into a DFA and print a summary.
    Build {
        /// One regular expression per (non-blank) line, in priority order.
        file: PathBuf,
        /// Print each expression's parsed AST.
        #[arg(long)]
        dump_ast: bool,
        /// Print the combined NFA's table.
        #[arg(long)]
        dump_nfa: bool,
        /// Print the DFA's table.
        #[arg(long)]
        dump_dfa: bool,
    },
    /// Compile a file of expressions, then tokenize an input string.
    Run {
        /// One regular expression per (non-blank) line, in priority order.
        file: PathBuf,
        /// The text to scan.
        input: String,
    },
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build { file, dump_ast, dump_nfa, dump_dfa } => build(&file, dump_ast, dump_nfa, dump_dfa),
        Command::Run { file, input } => run(&file, &input),
    }
}

fn read_expressions(path: &Path) -> Result<Vec<String>, CliError> {
    let contents = fs::read_to_string(path).map_err(|e| CliError::File(path.to_path_buf(), e))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn build(path: &Path, dump_ast: bool, dump_nfa: bool, dump_dfa: bool) -> Result<(), CliError> {
    let expressions = read_expressions(path)?;
    info!(count = expressions.len(), file = %path.display(), "loaded expressions");

    let refs: Vec<&str> = expressions.iter().map(String::as_str).collect();

    // Parse once here so --dump-ast/--dump-nfa can reuse the ASTs;
    // generate_lexer parses again internally, but only ever returns the
    // finished DFA.
    let asts: Vec<_> = refs
        .iter()
        .enumerate()
        .map(|(index, expr)| {
            lexgen::regex::parse(expr).map_err(|source| {
                CliError::Generate(lexgen::GenerateError::Parse {
                    index,
                    expression: (*expr).to_string(),
                    source,
                })
            })
        })
        .collect::<Result<_, _>>()?;

    if dump_ast {
        for (index, ast) in asts.iter().enumerate() {
            println!("{index}: {ast}");
        }
    }

    if dump_nfa {
        let nfa = lexgen::nfa::Nfa::build_combined(&asts)?;
        println!("{nfa}");
    }

    let dfa = generate_lexer(&refs)?;
    info!(states = dfa.num_states(), "built DFA");
    println!("expressions: {}, DFA states: {}", expressions.len(), dfa.num_states());

    if dump_dfa {
        println!("{dfa}");
    }
    Ok(())
}

fn run(path: &Path, input: &str) -> Result<(), CliError> {
    let expressions = read_expressions(path)?;
    let refs: Vec<&str> = expressions.iter().map(String::as_str).collect();
    let dfa = generate_lexer(&refs)?;
    let lexer = Lexer::new(&dfa);

    match lexer.tokenize(input.as_bytes()) {
        Ok(tokens) => {
            for tok in tokens {
                println!("({}, {})", tok.output_value, tok.length);
            }
        }
        Err(err) => {
            warn!(%err, "scan failed");
            println!("no match: {err}");
        }
    }
    Ok(())
}
