//! A smoke-test binary exercising the library end to end: parse a document
//! and print it back, or validate an instance document against a schema
//! document. Not a supported public interface, just a way to drive the
//! parser and validator from the shell.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};

use jschema::value::Format;
use jschema::{ParserOptions, Schema, ValidationOptions};

#[derive(ClapParser)]
#[command(name = "jschema-cli", about = "Parse or validate JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a JSON file and print it back out.
    Parse {
        file: PathBuf,
        /// Accept unquoted identifier keys, trailing commas, and comments.
        #[arg(long)]
        relaxed: bool,
        /// Pretty-print the result instead of compacting it.
        #[arg(long)]
        pretty: bool,
    },
    /// Validate an instance document against a schema document.
    Validate {
        schema_file: PathBuf,
        instance_file: PathBuf,
        /// Stop at the first validation error instead of collecting all of them.
        #[arg(long)]
        quit_on_first_error: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Parse { file, relaxed, pretty } => run_parse(&file, relaxed, pretty),
        Command::Validate { schema_file, instance_file, quit_on_first_error } => {
            run_validate(&schema_file, &instance_file, quit_on_first_error)
        }
    }
}

fn run_parse(file: &PathBuf, relaxed: bool, pretty: bool) -> ExitCode {
    let options = ParserOptions {
        allow_relaxed_format: relaxed,
        ..ParserOptions::default()
    };
    let parser = jschema::Parser::new(options);
    match parser.parse_file(file) {
        Ok(value) => {
            let format = if pretty { Format::Pretty } else { Format::Compact };
            println!("{}", value.describe(format));
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for err in errors {
                eprintln!("{err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run_validate(schema_file: &PathBuf, instance_file: &PathBuf, quit_on_first_error: bool) -> ExitCode {
    let parser = jschema::Parser::new(ParserOptions::default());
    let schema_doc = match parser.parse_file(schema_file) {
        Ok(v) => v,
        Err(errors) => {
            for err in errors {
                eprintln!("{err}");
            }
            return ExitCode::FAILURE;
        }
    };
    let instance = match parser.parse_file(instance_file) {
        Ok(v) => v,
        Err(errors) => {
            for err in errors {
                eprintln!("{err}");
            }
            return ExitCode::FAILURE;
        }
    };

    let schema = match Schema::compile(schema_doc) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let options = ValidationOptions { quit_on_first_error, ..ValidationOptions::default() };
    let output = schema.validate_with(&instance, &options);
    if output.valid {
        println!("valid");
        ExitCode::SUCCESS
    } else {
        println!("invalid");
        print_errors(&output, 1);
        ExitCode::FAILURE
    }
}

fn print_errors(unit: &jschema::OutputUnit, depth: usize) {
    if !unit.valid {
        if let Some(message) = &unit.error {
            println!("{}at {}: {}", "  ".repeat(depth), unit.instance_location, message);
        }
        for child in &unit.errors {
            print_errors(child, depth + 1);
        }
    }
}
