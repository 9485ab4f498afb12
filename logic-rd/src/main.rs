use std::fs;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use logic_rd::{RecognizeError, parse, tokenize};

#[derive(Parser)]
#[command(name = "logic-rd")]
#[command(about = "Recognizer for assignments, print and boolean expressions", version)]
struct Cli {
    /// Trace parser transitions (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a program is well formed
    Parse {
        /// Исходник
        input: String,
    },

    /// Print the token stream of a program
    Tokens {
        /// Исходник
        input: String,
    },
}

fn init_logger(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}

/// Parse errors are reported, not propagated: the run still ends normally.
fn report(err: &RecognizeError) {
    eprintln!("{}", err);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Parse { input } => {
            println!("Parsing {}...", input);

            let source = fs::read_to_string(&input).map_err(RecognizeError::from)?;

            match parse(&source) {
                Ok(summary) => {
                    println!("End of program reached");
                    println!(
                        "Parsing completed successfully ({} statements, {} tokens)",
                        summary.statements, summary.tokens
                    );
                }
                Err(e) => report(&e),
            }
        }
        Commands::Tokens { input } => {
            let source = fs::read_to_string(&input).map_err(RecognizeError::from)?;

            match tokenize(&source) {
                Ok(tokens) => {
                    for token in &tokens {
                        let lexeme = format!("{:?}", token.lexeme);
                        println!("{:<16} {:<10} {}", token.kind.to_string(), lexeme, token.span);
                    }
                }
                Err(e) => report(&e),
            }
        }
    }

    Ok(())
}
