//! Command-line interface for soldoc.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};

use crate::build::BuildContext;
use crate::config::{Config, FileErrorPolicy};
use crate::diagnostics::{Diagnostic, Severity};
use crate::documenter::{AutoDocumenter, Documenter, DocumenterOptions, MemberSelection};
use crate::registry::ObjectKind;
use crate::report;
use crate::signature::parse_directive;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Solidity source indexer and reStructuredText documenter.
///
/// Soldoc parses every `.sol` file under a lookup path, records each
/// contract, library, interface and member with its canonical signature and
/// NatSpec comment, and renders `.. sol:<kind>::` directives from the result.
#[derive(Parser)]
#[command(name = "soldoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index the Solidity sources and print every declaration found
    Index(IndexArgs),
    /// Validate a directive header and print its canonical form
    Signature(SignatureArgs),
    /// Generate reStructuredText for one declaration
    Autodoc(AutodocArgs),
}

/// Output format of the index command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Options locating and configuring the source index.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Documentation root the lookup path is resolved against
    #[arg(short, long, default_value = ".")]
    pub docs_root: PathBuf,

    /// Path to a configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root of the Solidity sources (overrides the configuration)
    #[arg(short, long)]
    pub lookup_path: Option<PathBuf>,

    /// Glob pattern of source files to skip (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Descend into hidden directories
    #[arg(long)]
    pub include_hidden: bool,

    /// What to do when one source file cannot be indexed
    #[arg(long, value_enum)]
    pub on_file_error: Option<FileErrorPolicy>,
}

/// Arguments for the index command.
#[derive(Args)]
pub struct IndexArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

/// Arguments for the signature command.
#[derive(Args)]
pub struct SignatureArgs {
    /// Object kind of the directive (contract, function, statevar, ...)
    #[arg(short, long)]
    pub kind: ObjectKind,

    /// Directive header, e.g. "transfer(address to, uint256 amount) public returns (bool)"
    pub header: String,
}

/// Arguments for the autodoc command.
#[derive(Args)]
pub struct AutodocArgs {
    /// Object kind of the target
    #[arg(short, long)]
    pub kind: ObjectKind,

    /// Target, e.g. "Token.transfer(address,uint256)" or "token/Token.sol:Token"
    pub target: String,

    #[command(flatten)]
    pub build: BuildArgs,

    /// Document members; without names, document all of them
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub members: Option<Vec<String>>,

    /// Also document members without documentation
    #[arg(long)]
    pub undoc_members: bool,

    /// Member names to skip (`<fallback>`, `constructor`, `<private>` are special)
    #[arg(long, value_delimiter = ',')]
    pub exclude_members: Vec<String>,

    /// Emit `:noindex:` on every directive
    #[arg(long)]
    pub noindex: bool,
}

/// Load the configuration for a build and apply command-line overrides.
pub fn load_config(args: &BuildArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::parse_file(path)?,
        None => match Config::discover(Path::new("."))? {
            Some((path, config)) => {
                tracing::info!(path = %path.display(), "using configuration");
                config
            }
            None => Config::default(),
        },
    };

    if let Some(lookup_path) = &args.lookup_path {
        config.lookup_path = lookup_path.clone();
    }
    config.excluded_paths.extend(args.exclude.iter().cloned());
    if args.include_hidden {
        config.include_hidden = true;
    }
    if let Some(policy) = args.on_file_error {
        config.on_file_error = policy;
    }

    // Surface bad globs before walking anything.
    config.exclusion_set()?;
    Ok(config)
}

fn init_context(args: &BuildArgs) -> anyhow::Result<BuildContext> {
    let config = load_config(args)?;
    Ok(BuildContext::init(&args.docs_root, config)?)
}

/// Run the index command.
pub fn run_index(args: &IndexArgs) -> anyhow::Result<i32> {
    let ctx = match init_context(&args.build) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let lookup_path = ctx.lookup_root().to_string_lossy().to_string();
    match args.format {
        OutputFormat::Json => report::write_json(&lookup_path, ctx.registry(), ctx.diagnostics())?,
        OutputFormat::Pretty => report::write_pretty(&lookup_path, ctx.registry(), ctx.diagnostics()),
    }

    if ctx.diagnostics().has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the signature command.
pub fn run_signature(args: &SignatureArgs) -> anyhow::Result<i32> {
    let parts = match parse_directive(args.kind, &args.header) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return Ok(EXIT_FAILED);
        }
    };

    println!("{:<12}{}", "kind".dimmed(), args.kind);
    println!("{:<12}{}", "signature".dimmed(), parts);
    if let Some(name) = parts.name() {
        println!("{:<12}{}", "name".dimmed(), name);
    }
    if let Some(value_type) = parts.value_type() {
        println!("{:<12}{}", "type".dimmed(), value_type);
    }
    if let Some(types) = parts.param_types() {
        println!("{:<12}({})", "params".dimmed(), types.join(","));
        println!(
            "{:<12}{}({})",
            "target".dimmed(),
            parts.name().unwrap_or(""),
            types.join(",")
        );
    } else if let Some(name) = parts.name() {
        println!("{:<12}{}", "target".dimmed(), name);
    }

    Ok(EXIT_SUCCESS)
}

/// Run the autodoc command.
pub fn run_autodoc(args: &AutodocArgs) -> anyhow::Result<i32> {
    let mut ctx = match init_context(&args.build) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let members = MemberSelection::from_option(args.members.clone());
    let all_members = members == MemberSelection::All;
    let options = DocumenterOptions {
        members,
        undoc_members: args.undoc_members,
        exclude_members: args.exclude_members.clone(),
        noindex: args.noindex,
    };

    let (found, output, diagnostics) = {
        let mut documenter = AutoDocumenter::new(ctx.registry(), options);
        let found = documenter.generate(args.kind, &args.target, &[], all_members);
        let output = documenter.output();
        (found, output, documenter.into_diagnostics())
    };
    ctx.diagnostics_mut().extend(diagnostics);

    if found {
        print!("{}", output);
    }
    print_diagnostics(ctx.diagnostics().items());

    if !found || ctx.diagnostics().has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        let tag = match d.severity {
            Severity::Error => "error".red(),
            Severity::Warning => "warning".yellow(),
            Severity::Info => "info".blue(),
        };
        match d.location() {
            Some(location) => eprintln!("{}: {}: {}", tag, location, d.message),
            None => eprintln!("{}: {}", tag, d.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn build_args(docs_root: &Path) -> BuildArgs {
        BuildArgs {
            docs_root: docs_root.to_path_buf(),
            config: None,
            lookup_path: None,
            exclude: Vec::new(),
            include_hidden: false,
            on_file_error: None,
        }
    }

    #[test]
    fn test_cli_parses_autodoc_members() {
        let cli = Cli::parse_from([
            "soldoc",
            "autodoc",
            "--kind",
            "contract",
            "Token",
            "--members",
            "transfer,approve",
            "--exclude-members",
            "<private>",
        ]);
        let Commands::Autodoc(args) = cli.command else {
            panic!("expected autodoc");
        };
        assert_eq!(args.kind, ObjectKind::Contract);
        assert_eq!(
            args.members,
            Some(vec!["transfer".to_string(), "approve".to_string()])
        );
        assert_eq!(args.exclude_members, vec!["<private>".to_string()]);

        let cli = Cli::parse_from(["soldoc", "autodoc", "-k", "library", "Math", "--members"]);
        let Commands::Autodoc(args) = cli.command else {
            panic!("expected autodoc");
        };
        assert_eq!(MemberSelection::from_option(args.members), MemberSelection::All);
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["soldoc", "signature", "--kind", "widget", "x"]).is_err());
    }

    #[test]
    fn test_config_file_with_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("soldoc.yaml");
        fs::write(&path, "lookup_path: src\nexcluded_paths: ['mocks/**']\n").unwrap();

        let mut args = build_args(dir.path());
        args.config = Some(path);
        args.exclude = vec!["test/**".to_string()];
        args.on_file_error = Some(FileErrorPolicy::Abort);

        let config = load_config(&args).unwrap();
        assert_eq!(config.lookup_path, PathBuf::from("src"));
        assert_eq!(config.excluded_paths, vec!["mocks/**", "test/**"]);
        assert_eq!(config.on_file_error, FileErrorPolicy::Abort);

        args.lookup_path = Some(PathBuf::from("contracts"));
        assert_eq!(load_config(&args).unwrap().lookup_path, PathBuf::from("contracts"));
    }

    #[test]
    fn test_bad_exclusion_glob_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut args = build_args(dir.path());
        args.config = Some(dir.path().join("missing.yaml"));
        assert!(load_config(&args).is_err());

        let mut args = build_args(dir.path());
        let path = dir.path().join("soldoc.yaml");
        fs::write(&path, "{}\n").unwrap();
        args.config = Some(path);
        args.exclude = vec!["[".to_string()];
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_signature_exit_codes() {
        let ok = SignatureArgs {
            kind: ObjectKind::Function,
            header: "transfer(address to, uint256 amount) public returns (bool)".to_string(),
        };
        assert_eq!(run_signature(&ok).unwrap(), EXIT_SUCCESS);

        let bad = SignatureArgs {
            kind: ObjectKind::Function,
            header: "(uint256 x)".to_string(),
        };
        assert_eq!(run_signature(&bad).unwrap(), EXIT_FAILED);
    }
}
