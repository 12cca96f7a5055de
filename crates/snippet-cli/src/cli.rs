use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snippet_eval::{Engine, EngineConfig, ExecutionRequest, OutputSink, ScopeMode};

#[derive(Parser)]
#[command(name = "snippet")]
#[command(about = "Run script snippets and print their console output and result", long_about = None)]
pub struct Cli {
    /// Path to a JSON engine config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Scope mode: shared or isolated (default: from config)
    #[arg(short = 's', long, global = true)]
    pub scope: Option<ScopeMode>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a snippet file ("-" reads standard input)
    Run {
        /// File to run
        file: String,
    },

    /// Run a snippet given on the command line
    Eval {
        /// Source text
        source: String,
    },

    /// Read snippets line by line; shared declarations persist between lines
    Repl,
}

/// Prints result lines to stdout and, once the error flag is raised, error
/// lines to stderr.
#[derive(Default)]
struct TerminalSink {
    is_error: bool,
}

impl OutputSink for TerminalSink {
    fn write_line(&mut self, line: &str) {
        if self.is_error {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn set_error_state(&mut self, is_error: bool) {
        self.is_error = is_error;
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let scope = cli.scope.unwrap_or(config.default_scope);
    let mut engine = Engine::with_config(config);

    match cli.command {
        Commands::Run { file } => {
            let source = read_source(&file)?;
            Ok(execute(&mut engine, source, scope))
        }
        Commands::Eval { source } => Ok(execute(&mut engine, source, scope)),
        Commands::Repl => repl(&mut engine, scope),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = EngineConfig::from_json(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn read_source(file: &str) -> Result<String> {
    if file == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read standard input")?;
        return Ok(source);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
}

fn execute(engine: &mut Engine, source: String, scope: ScopeMode) -> ExitCode {
    let mut sink = TerminalSink::default();
    let outcome = engine.execute(&ExecutionRequest::new(source, scope), &mut sink);
    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn repl(engine: &mut Engine, scope: ScopeMode) -> Result<ExitCode> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;
        line.clear();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        execute(engine, line.clone(), scope);
    }
    println!();
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_scope() {
        let cli = Cli::try_parse_from(["snippet", "run", "demo.js", "--scope", "isolated"]).unwrap();
        assert_eq!(cli.scope, Some(ScopeMode::Isolated));
        assert!(matches!(cli.command, Commands::Run { ref file } if file == "demo.js"));
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        assert!(Cli::try_parse_from(["snippet", "eval", "1", "--scope", "sandbox"]).is_err());
    }

    #[test]
    fn test_eval_exit_codes() {
        let mut engine = Engine::new();
        assert_eq!(
            execute(&mut engine, "1 + 1".to_string(), ScopeMode::Shared),
            ExitCode::SUCCESS
        );
        assert_eq!(
            execute(&mut engine, "throw 1".to_string(), ScopeMode::Shared),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Some(std::path::Path::new("/nonexistent/snippet.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
