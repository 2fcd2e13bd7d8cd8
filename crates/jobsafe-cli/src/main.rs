use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use jobsafe_core::symbol::{format_stream, parse_stream};
use jobsafe_core::{
    fingerprint, validate, Analysis, Analyzer, ClassifierConfig, Symbol, Validation,
};

/// Exit code for an accepted contract or a successful command
const EXIT_OK: i32 = 0;
/// Exit code for a rejected contract
const EXIT_REJECTED: i32 = 1;
/// Exit code for unreadable input, bad configuration, or bad arguments
const EXIT_ERROR: i32 = 2;

/// JobSafe — structural validation of employment contracts
///
/// Classify contract lines into section symbols and check the section order
/// with a pushdown automaton.
#[derive(Parser)]
#[command(name = "jobsafe", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all standard output (exit code only)
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase log verbosity on stderr (-v debug, -vv trace)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a contract and validate its structure
    Check {
        /// Path to contract text file ("-" for stdin)
        file: PathBuf,
        /// Classifier configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the full automaton trace
        #[arg(long)]
        trace: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the token generation log for a contract
    Classify {
        /// Path to contract text file ("-" for stdin)
        file: PathBuf,
        /// Classifier configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a token stream directly, e.g. "H R D S C B F T X"
    Validate {
        /// Symbols as letters, separated by spaces or commas
        tokens: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the active rule table
    Rules {
        /// Classifier configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the structural fingerprint (SHA-256) of a contract
    Hash {
        /// Path to contract text file ("-" for stdin)
        file: PathBuf,
        /// Classifier configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let out = Output { quiet: cli.quiet };

    let result = match cli.command {
        Commands::Check {
            file,
            config,
            trace,
            json,
        } => cmd_check(&out, &file, config.as_deref(), trace, json),
        Commands::Classify { file, config, json } => {
            cmd_classify(&out, &file, config.as_deref(), json)
        }
        Commands::Validate { tokens, json } => cmd_validate(&out, &tokens, json),
        Commands::Rules { config, json } => cmd_rules(&out, config.as_deref(), json),
        Commands::Hash { file, config } => cmd_hash(&out, &file, config.as_deref()),
        Commands::Version => {
            out.line(format!(
                "jobsafe {} (jobsafe-core {})",
                env!("CARGO_PKG_VERSION"),
                jobsafe_core::VERSION
            ));
            Ok(EXIT_OK)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{}: {}", "error".red().bold(), message);
            EXIT_ERROR
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

// ── Output helpers ────────────────────────────────────────

struct Output {
    quiet: bool,
}

impl Output {
    fn line(&self, text: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", text.as_ref());
        }
    }

    fn json(&self, value: &serde_json::Value) -> Result<(), String> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {}", e))?;
        self.line(text);
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("cannot read stdin: {}", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn load_analyzer(config: Option<&Path>) -> Result<Analyzer, String> {
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
            let config = ClassifierConfig::from_json(&text).map_err(|e| e.to_string())?;
            tracing::debug!(
                path = %path.display(),
                custom_rules = config.rules.is_some(),
                threshold = config.truncation.threshold,
                prefix_words = config.truncation.prefix_words,
                "loaded classifier config"
            );
            config
        }
        None => ClassifierConfig::default(),
    };
    Analyzer::from_config(&config).map_err(|e| e.to_string())
}

fn verdict_code(validation: &Validation) -> i32 {
    if validation.accepted {
        EXIT_OK
    } else {
        EXIT_REJECTED
    }
}

fn symbol_label(symbol: Symbol) -> colored::ColoredString {
    let label = format!("[{}]", symbol);
    match symbol {
        Symbol::Role | Symbol::Compensation => label.yellow(),
        Symbol::Scope | Symbol::Benefits => label.green(),
        _ => label.blue(),
    }
}

fn validation_json(validation: &Validation) -> serde_json::Value {
    serde_json::json!({
        "accepted": validation.accepted,
        "final_state": validation.final_state,
        "final_stack": validation.final_stack,
        "consumed": validation.consumed,
        "rejection": validation.rejection(),
        "trace": validation.trace_lines(),
    })
}

fn print_verdict(out: &Output, validation: &Validation, show_trace: bool) {
    if validation.accepted {
        out.line(format!("{}", "CONTRACT ACCEPTED".green().bold()));
        out.line("The contract follows a valid structural sequence and all dependencies are resolved.");
    } else {
        out.line(format!("{}", "CONTRACT REJECTED".red().bold()));
        if let Some(rejection) = validation.rejection() {
            out.line(format!("Reason: {}", rejection));
        }
    }

    if show_trace {
        out.line("");
        out.line(format!("{}", "Automaton trace:".bold()));
        for entry in &validation.trace {
            let text = entry.to_string();
            if entry.is_reject() {
                out.line(format!("  {}", text.red()));
            } else {
                out.line(format!("  {}", text));
            }
        }
    }
}

fn print_token_log(out: &Output, analysis: &Analysis) {
    for line in &analysis.lines {
        out.line(format!(
            "  {:>4}  {}  {}",
            line.line_number,
            symbol_label(line.symbol),
            line.excerpt.dimmed()
        ));
    }
    out.line(format!("Token stream: {}", format_stream(&analysis.tokens).bold()));
}

// ── Commands ──────────────────────────────────────────────

fn cmd_check(
    out: &Output,
    file: &Path,
    config: Option<&Path>,
    show_trace: bool,
    json: bool,
) -> Result<i32, String> {
    let analyzer = load_analyzer(config)?;
    let text = read_input(file)?;
    let analysis = analyzer.analyze(&text);

    if json {
        let mut value = validation_json(&analysis.validation);
        value["tokens"] = serde_json::json!(format_stream(&analysis.tokens));
        value["lines"] = serde_json::json!(analysis.lines);
        value["fingerprint"] = serde_json::json!(analysis.fingerprint());
        out.json(&value)?;
    } else {
        out.line(format!("{}", "Structural analysis".bold()));
        print_token_log(out, &analysis);
        out.line("");
        print_verdict(out, &analysis.validation, show_trace);
    }

    Ok(verdict_code(&analysis.validation))
}

fn cmd_classify(
    out: &Output,
    file: &Path,
    config: Option<&Path>,
    json: bool,
) -> Result<i32, String> {
    let analyzer = load_analyzer(config)?;
    let text = read_input(file)?;
    let lines = analyzer.classifier().classify_lines(&text);

    if json {
        out.json(&serde_json::json!(lines))?;
    } else {
        let tokens: Vec<Symbol> = lines.iter().map(|l| l.symbol).collect();
        for line in &lines {
            out.line(format!(
                "  {:>4}  {}  {:<24} {}",
                line.line_number,
                symbol_label(line.symbol),
                line.symbol.section_name(),
                line.excerpt.dimmed()
            ));
        }
        out.line(format!("Token stream: {}", format_stream(&tokens).bold()));
    }

    Ok(EXIT_OK)
}

fn cmd_validate(out: &Output, tokens: &str, json: bool) -> Result<i32, String> {
    let tokens = parse_stream(tokens).map_err(|e| e.to_string())?;
    let validation = validate(&tokens);

    if json {
        let mut value = validation_json(&validation);
        value["tokens"] = serde_json::json!(format_stream(&tokens));
        out.json(&value)?;
    } else {
        print_verdict(out, &validation, true);
    }

    Ok(verdict_code(&validation))
}

fn cmd_rules(out: &Output, config: Option<&Path>, json: bool) -> Result<i32, String> {
    let analyzer = load_analyzer(config)?;
    let classifier = analyzer.classifier();
    let specs = classifier.rules().specs();

    if json {
        out.json(&serde_json::json!({
            "truncation": classifier.truncation(),
            "rules": specs,
        }))?;
    } else {
        for rule in &specs {
            let patterns: Vec<String> = rule
                .patterns
                .iter()
                .map(|p| {
                    let mut text = p.text.clone();
                    if p.regex {
                        text = format!("/{}/", text);
                    }
                    if p.whole_word {
                        text.push('*');
                    }
                    text
                })
                .collect();
            out.line(format!(
                "{} {:<16} {}",
                symbol_label(rule.symbol),
                rule.symbol.section_name(),
                patterns.join(", ")
            ));
        }
        let t = classifier.truncation();
        out.line(format!(
            "Lines of {}+ words are matched on their first {} words (* = whole word)",
            t.threshold, t.prefix_words
        ));
    }

    Ok(EXIT_OK)
}

fn cmd_hash(out: &Output, file: &Path, config: Option<&Path>) -> Result<i32, String> {
    let analyzer = load_analyzer(config)?;
    let text = read_input(file)?;
    let tokens = analyzer.classifier().tokenize(&text);
    out.line(fingerprint::fingerprint(&tokens));
    Ok(EXIT_OK)
}
