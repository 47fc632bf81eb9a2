use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use cpf_canoniser::config::CanoniserConfig;
use cpf_canoniser::domain::adapter::Notation;
use cpf_canoniser::domain::validation::validate;
use cpf_canoniser::error::Error;
use cpf_canoniser::{canonise_file, cpf_to_json, decanonise_to_json, load_cpf_file, logger};

#[derive(Parser)]
#[command(name = "cpf-canoniser", version, about = "Translates process models through the canonical process format")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parses a notation document and prints its canonical net
    Canonise {
        #[arg(long)]
        from: Notation,
        file: String,
    },
    /// Checks a canonical net for structural violations
    Validate { file: String },
    /// Translates a document from one notation into another
    Convert {
        #[arg(long)]
        from: Notation,
        #[arg(long)]
        to: Notation,
        file: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match CanoniserConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: failed to load configuration '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => CanoniserConfig::default(),
    };
    logger::init(&config.logging);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            if let Some(Error::StructuralViolations(violations)) = e.downcast_ref::<Error>() {
                for violation in violations {
                    eprintln!("  {}", violation);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &CanoniserConfig) -> Result<()> {
    match command {
        Command::Canonise { from, file } => {
            let canonised = canonise_file(from, &file, config).with_context(|| format!("canonising '{}'", file))?;
            for warning in &canonised.warnings {
                eprintln!("warning: {}", warning);
            }
            for violation in &canonised.violations {
                eprintln!("violation: {}", violation);
            }
            println!("{}", cpf_to_json(&canonised.net)?);
        }
        Command::Validate { file } => {
            let net = load_cpf_file(&file).with_context(|| format!("loading '{}'", file))?;
            match validate(&net) {
                Ok(()) => println!("'{}' is structurally valid", net.id),
                Err(violations) => {
                    for violation in &violations {
                        println!("{}", violation);
                    }
                    bail!("'{}' has {} structural violation(s)", net.id, violations.len());
                }
            }
        }
        Command::Convert { from, to, file } => {
            let net = canonise_file(from, &file, config)
                .with_context(|| format!("canonising '{}'", file))?
                .into_valid()?;
            let rendered = decanonise_to_json(to, &net, config).with_context(|| format!("rendering as {}", to))?;
            for warning in &rendered.warnings {
                eprintln!("warning: {}", warning);
            }
            println!("{}", rendered.output);
        }
    }
    Ok(())
}
