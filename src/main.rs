use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use infix_calc::{
    InvalidNumberError, Keypad, Lexer, MismatchedParenError, UnclosedParenError,
    UnexpectedCharError, evaluate, format_number,
};
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
#[command(about = "Evaluate infix arithmetic expressions")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the tokens of an expression
    Tokenize { expression: String },
    /// Print an expression in postfix order
    Parse { expression: String },
    /// Evaluate an expression, or every line of a file
    Evaluate {
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        expression: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Press keypad keys in order and print the display
    Keys {
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Evaluate lines read from stdin
    Repl,
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Tokenize { expression } => {
            for lexeme in Lexer::new(None, &expression) {
                let lexeme = match lexeme {
                    Ok(lexeme) => lexeme,
                    Err(e) => exit_on_syntax_error(e)?,
                };
                println!("{lexeme}");
            }
            println!("EOF  null");
        }
        Commands::Parse { expression } => {
            let tokens = match infix_calc::parse(&expression) {
                Ok(tokens) => tokens,
                Err(e) => exit_on_syntax_error(e)?,
            };
            let postfix: Vec<String> = tokens.iter().map(ToString::to_string).collect();
            println!("{}", postfix.join(" "));
        }
        Commands::Evaluate { expression, file } => match (expression, file) {
            (Some(expression), _) => match run(None, &expression) {
                Ok(result) => println!("{result}"),
                Err(e) => exit_on_syntax_error(e)?,
            },
            (None, Some(filename)) => {
                let file_contents = fs::read_to_string(&filename)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;

                for line in file_contents.lines().filter(|line| !line.trim().is_empty()) {
                    match run(filename.to_str(), line) {
                        Ok(result) => println!("{result}"),
                        Err(e) => exit_on_syntax_error(e)?,
                    }
                }
            }
            (None, None) => unreachable!("clap requires one of expression or --file"),
        },
        Commands::Keys { labels } => {
            let mut keypad = Keypad::new();
            keypad.press_all(labels.iter().map(String::as_str))?;
            println!("{}", keypad.display());
        }
        Commands::Repl => {
            let mut lines = std::io::stdin().lines();
            loop {
                print!("> ");
                std::io::stdout().flush().into_diagnostic()?;
                let Some(line) = lines.next() else {
                    break;
                };
                let line = line.into_diagnostic().wrap_err("reading stdin failed")?;
                if line.trim().is_empty() {
                    continue;
                }
                match run(None, &line) {
                    Ok(result) => println!("{result}"),
                    Err(e) => eprintln!("{e:?}"),
                }
            }
        }
    }
    Ok(())
}

fn run(filename: Option<&str>, expression: &str) -> miette::Result<String> {
    let tokens = infix_calc::Parser::new(filename, expression).parse()?;
    Ok(match evaluate(tokens)? {
        Some(result) => format_number(result),
        None => "no result".to_string(),
    })
}

/// Syntax errors end the process with status 65; anything else is returned.
fn exit_on_syntax_error<T>(e: miette::Report) -> miette::Result<T> {
    let syntax = e.downcast_ref::<UnexpectedCharError>().is_some()
        || e.downcast_ref::<InvalidNumberError>().is_some()
        || e.downcast_ref::<MismatchedParenError>().is_some()
        || e.downcast_ref::<UnclosedParenError>().is_some();
    if syntax {
        eprintln!("{e:?}");
        std::process::exit(65);
    }
    Err(e)
}
