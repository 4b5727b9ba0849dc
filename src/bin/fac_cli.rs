//! FAC Command Line Interface
//!
//! Inspect the rule catalog and normalize fact files offline, without the
//! HTTP service or an extraction engine.
//!
//! # Usage
//!
//! ```bash
//! # List supported concepts
//! fac_cli concepts
//!
//! # Show the patterns of one concept
//! fac_cli patterns Revenue
//!
//! # Classify a single tag
//! fac_cli classify AssetsCurrent --namespace http://fasb.org/us-gaap/2023
//!
//! # Normalize extracted facts (JSON array or {"filing_url": ..., "facts": [...]})
//! fac_cli normalize --file facts.json
//! cat facts.json | fac_cli --format json normalize
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use fac_normalizer::facts::decode_records;
use fac_normalizer::{
    telemetry, ConceptClassifier, ExtractedFiling, Normalizer, RawFactRecord, RuleCatalog,
};

#[derive(Parser)]
#[command(name = "fac_cli")]
#[command(version)]
#[command(about = "Inspect the FAC rule catalog and normalize extracted XBRL facts")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rule catalog YAML (built-in catalog when omitted)
    #[arg(long, global = true, env = "FAC_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported concepts in priority order
    Concepts,

    /// Show the patterns of a concept
    Patterns {
        /// Concept name, e.g. Revenue
        concept: String,
    },

    /// Classify a single taxonomy tag
    Classify {
        /// Tag local name, e.g. AssetsCurrent
        tag: String,

        /// Namespace URI of the tag
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Normalize a batch of extracted facts
    Normalize {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    telemetry::init_cli_tracing("fac_normalizer=warn");

    let result = load_classifier(cli.catalog.as_ref()).and_then(|classifier| match cli.command {
        Commands::Concepts => cmd_concepts(&classifier, cli.format),
        Commands::Patterns { concept } => cmd_patterns(&classifier, &concept, cli.format),
        Commands::Classify { tag, namespace } => {
            cmd_classify(&classifier, &tag, namespace.as_deref(), cli.format)
        }
        Commands::Normalize { file } => cmd_normalize(classifier, file, cli.format),
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": e }));
            } else {
                eprintln!("{}: {}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_classifier(catalog: Option<&PathBuf>) -> Result<ConceptClassifier, String> {
    let catalog = RuleCatalog::load(catalog.map(PathBuf::as_path))
        .map_err(|e| format!("Failed to load rule catalog: {}", e))?;
    Ok(ConceptClassifier::new(Arc::new(catalog)))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_concepts(classifier: &ConceptClassifier, format: OutputFormat) -> Result<(), String> {
    let concepts = classifier.list_concepts();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "catalog_version": classifier.catalog().version(),
                "concepts": concepts,
                "count": concepts.len(),
            });
            print_json(&output)?;
        }
        OutputFormat::Pretty => {
            println!(
                "{} (catalog v{})",
                "FAC concepts".bold(),
                classifier.catalog().version()
            );
            for (i, rule) in classifier.catalog().rules().iter().enumerate() {
                println!(
                    "  {:>2}. {:<24} {} pattern(s)",
                    i + 1,
                    rule.concept.cyan(),
                    rule.patterns.len()
                );
            }
            println!("\n{} concepts", concepts.len());
        }
    }
    Ok(())
}

fn cmd_patterns(
    classifier: &ConceptClassifier,
    concept: &str,
    format: OutputFormat,
) -> Result<(), String> {
    let patterns = classifier
        .rules_for(concept)
        .ok_or_else(|| format!("Concept '{}' not found", concept))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "concept": concept,
                "patterns": patterns,
                "pattern_count": patterns.len(),
            });
            print_json(&output)?;
        }
        OutputFormat::Pretty => {
            println!("{}", concept.cyan().bold());
            for pattern in patterns {
                println!("  {}", pattern);
            }
        }
    }
    Ok(())
}

fn cmd_classify(
    classifier: &ConceptClassifier,
    tag: &str,
    namespace: Option<&str>,
    format: OutputFormat,
) -> Result<(), String> {
    let outcome = classifier.explain(tag, namespace);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "tag": tag,
                "namespace": namespace,
                "match": outcome,
            });
            print_json(&output)?;
        }
        OutputFormat::Pretty => match outcome {
            Some(m) => println!(
                "{} {} -> {} ({} via '{}', confidence {:.2})",
                "OK".green(),
                tag,
                m.concept.cyan().bold(),
                m.anchoring.as_str(),
                m.pattern,
                m.confidence
            ),
            None => println!("{} {} is not mapped to a FAC concept", "--".yellow(), tag),
        },
    }
    Ok(())
}

fn cmd_normalize(
    classifier: ConceptClassifier,
    file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), String> {
    let source = read_input(file)?;
    let records = parse_records(&source)?;

    let report = Normalizer::new(classifier).normalize_records(records);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Pretty => {
            for c in &report.concepts {
                let value = c
                    .value
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<24} {:>20} {:<8} {:<9} {:.2}",
                    c.concept.cyan(),
                    value,
                    c.unit.as_deref().unwrap_or(""),
                    c.period_kind.as_str(),
                    c.quality_score
                );
            }
            println!();
            println!(
                "{} {} of {} facts mapped onto {} concepts",
                "OK".green(),
                report.mapped_count(),
                report.total_facts(),
                report.distinct_concepts()
            );
            for (concept, count) in &report.metadata.concept_breakdown {
                println!("  {:<24} {}", concept, count);
            }
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_input(file: Option<PathBuf>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        None => {
            if io::stdin().is_terminal() {
                return Err("No input provided. Use --file or pipe input via stdin.".to_string());
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

/// Accept either a bare array of fact records or a whole extracted filing
fn parse_records(source: &str) -> Result<Vec<RawFactRecord>, String> {
    let value: serde_json::Value =
        serde_json::from_str(source).map_err(|e| format!("Invalid JSON input: {}", e))?;

    if let serde_json::Value::Array(items) = value {
        Ok(decode_records(items))
    } else {
        let filing: ExtractedFiling =
            serde_json::from_value(value).map_err(|e| format!("Invalid filing: {}", e))?;
        Ok(filing.facts)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", output);
    Ok(())
}
