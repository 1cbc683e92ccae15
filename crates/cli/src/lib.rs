use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use contract_imports::normalize_path;
use contract_protocol::{
    relative_display, serialize_json, CheckId, GateConfig, Report, DEFAULT_CONFIG_FILE,
};
use contract_rules::{Gate, RunOptions};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod report;

/// Exit code for unusable input: missing or invalid config, missing entry file
pub const EXIT_FATAL: i32 = 2;

fn print_stdout(text: &str) -> Result<()> {
    write_stream(&mut io::stdout().lock(), text)
}

fn print_stderr(text: &str) -> Result<()> {
    write_stream(&mut io::stderr().lock(), text)
}

fn write_stream(stream: &mut impl Write, text: &str) -> Result<()> {
    if let Err(err) = stream
        .write_all(text.as_bytes())
        .and_then(|_| if text.ends_with('\n') { Ok(()) } else { stream.write_all(b"\n") })
        .and_then(|_| stream.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "contract-gate")]
#[command(about = "Verify architectural and content contracts of a UI codebase", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root; every configured path is relative to it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Gate configuration (default: <root>/contract.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat compat registry entries as errors
    #[arg(long)]
    strict: bool,

    /// Run only the named check (repeatable): parse, registry, patterns, imports, shell, budgets, cross-ref
    #[arg(long = "check", value_name = "NAME", value_parser = CheckId::from_str)]
    checks: Vec<CheckId>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Explain why a file is reachable
    #[arg(long, value_name = "PATH")]
    why: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log only errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    why: Option<WhyOutput>,
}

#[derive(Serialize)]
struct WhyOutput {
    target: String,
    /// `None` when the target is not reachable
    chain: Option<Vec<String>>,
}

/// Runs the gate and returns the process exit code. `Err` means fatal input.
pub fn main_entry() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(&cli);

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("project root {} does not exist", cli.root.display()))?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));
    let config = GateConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    log::debug!("loaded {}", config_path.display());

    let gate = Gate::prepare(&root, config).context("failed to build the reachable set")?;
    let options = RunOptions {
        strict: cli.strict,
        only: cli.checks.iter().copied().collect(),
    };
    let report = gate.run(&options);
    let why = cli.why.as_deref().map(|target| explain(&gate, &root, target));

    if cli.json {
        let output = JsonOutput {
            report: &report,
            why,
        };
        print_stdout(&serialize_json(&output)?)?;
    } else {
        print_stdout(&report::render_summary(&report))?;
        if let Some(why) = &why {
            print_stdout(&report::render_chain(&why.target, why.chain.as_deref()))?;
        }
        let violations = report::render_violations(&report);
        if !violations.is_empty() {
            print_stderr(&violations)?;
        }
    }

    Ok(report.exit_code())
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn explain(gate: &Gate, root: &Path, target: &Path) -> WhyOutput {
    let absolute = normalize_path(&root.join(target));
    let chain = gate.reachable().import_chain(&absolute).map(|chain| {
        chain
            .iter()
            .map(|path| relative_display(root, path))
            .collect()
    });
    WhyOutput {
        target: relative_display(root, &absolute),
        chain,
    }
}
