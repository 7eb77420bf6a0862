use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use agentforge::{
    detect_format, render_dsl, render_structured, validate_text, CompileContext,
    DiagnosticLevel, ManifestCompiler, ManifestError, ManifestFormat,
};

#[derive(Parser)]
#[command(
    name = "agentforge",
    version,
    about = "Compile multi-agent manifests into deployable container artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile a manifest and write the generated artifacts.
    Build {
        /// Manifest path.
        file: PathBuf,
        /// Output directory for generated artifacts.
        #[arg(short, long, default_value = "agent")]
        output: PathBuf,
        /// Force the input syntax instead of auto-detecting.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Default model for agents that do not set one.
        #[arg(long)]
        model: Option<String>,
        /// Also run `docker build` on the generated output.
        #[arg(long)]
        docker: bool,
        /// Image tag passed to `docker build`.
        #[arg(short, long, default_value = "agent:latest")]
        tag: String,
    },
    /// Parse and validate a manifest, reporting every problem found.
    Validate {
        /// Manifest path.
        file: PathBuf,
        /// Force the input syntax instead of auto-detecting.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Convert a manifest to the other accepted syntax.
    Convert {
        /// Input manifest path.
        input: PathBuf,
        /// Output manifest path.
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Directives,
    Yaml,
}

impl From<FormatArg> for ManifestFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Directives => ManifestFormat::Directives,
            FormatArg::Yaml => ManifestFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Cmd::Build {
            file,
            output,
            format,
            model,
            docker,
            tag,
        } => build(&file, &output, format, model, docker, &tag),
        Cmd::Validate { file, format } => validate(&file, format),
        Cmd::Convert { input, output } => convert(&input, &output),
    }
}

fn read_manifest(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read manifest: {}", path.display()))
}

fn resolve_format(forced: Option<FormatArg>, content: &str) -> ManifestFormat {
    forced.map(Into::into).unwrap_or_else(|| detect_format(content))
}

fn build(
    file: &Path,
    output: &Path,
    format: Option<FormatArg>,
    model: Option<String>,
    docker: bool,
    tag: &str,
) -> Result<()> {
    let content = read_manifest(file)?;
    let format = resolve_format(format, &content);
    let ctx = CompileContext {
        default_model: model,
    };

    let compiled = match ManifestCompiler::compile(&content, format, &ctx) {
        Ok(compiled) => compiled,
        Err(ManifestError::ValidationFailed(report)) => {
            for diag in &report.diagnostics {
                eprintln!("error[{}]: {}", diag.code, diag.message);
            }
            bail!("manifest validation failed with {} error(s)", report.errors().len());
        }
        Err(err) => return Err(err.into()),
    };

    for diag in compiled.report.warnings() {
        eprintln!("warning[{}]: {}", diag.code, diag.message);
    }

    fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;
    for (name, text) in compiled.artifacts.named() {
        let path = output.join(name);
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    if docker {
        let status = Command::new("docker")
            .args(["build", "-t", tag])
            .arg(output)
            .status()
            .context("failed to launch docker build")?;
        if !status.success() {
            bail!("docker build failed with {status}");
        }
        println!("built image {tag}");
    }

    Ok(())
}

fn validate(file: &Path, format: Option<FormatArg>) -> Result<()> {
    let content = read_manifest(file)?;
    let format = resolve_format(format, &content);
    let report = validate_text(&content, format, &CompileContext::default());

    for diag in &report.diagnostics {
        let level = match diag.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
        };
        eprintln!("{level}[{}]: {}", diag.code, diag.message);
    }
    if !report.is_valid {
        bail!(
            "{}: invalid manifest ({} error(s))",
            file.display(),
            report.errors().len()
        );
    }
    println!("{}: manifest is valid", file.display());
    Ok(())
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let content = read_manifest(input)?;
    let format = detect_format(&content);
    let directives = agentforge::parse_manifest(&content, format)?;
    let manifest = agentforge::build_manifest(directives, &CompileContext::default())?;

    let rendered = match format {
        ManifestFormat::Directives => render_structured(&manifest),
        ManifestFormat::Yaml => render_dsl(&manifest),
    };
    fs::write(output, rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("converted {} -> {}", input.display(), output.display());
    Ok(())
}
