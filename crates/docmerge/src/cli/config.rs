//! The `docmerge config` command: inspect and bootstrap the config file.

use clap::{Args, Subcommand};
use console::{style, Emoji};
use docmerge_core::Config;
use std::path::{Path, PathBuf};

static FOUND: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static MISSING: Emoji<'_, '_> = Emoji("✗ ", "[MISSING] ");

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate and print the effective configuration with its resolved paths
    Show,

    /// Show config file path
    Path,

    /// Write a config file matched to the converters installed here
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show(),
        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
            Ok(())
        }
        ConfigCommand::Init { force } => init(force),
    }
}

fn show() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    // Comments keep the output loadable as a config file.
    println!("{}", config.to_toml()?);
    println!("# Resolved paths");
    for line in resolved_paths(&config) {
        println!("#   {line}");
    }
    Ok(())
}

fn resolved_paths(config: &Config) -> Vec<String> {
    let mut lines = vec![
        format!("config file: {}", Config::default_path().display()),
        format!("cache file:  {}", config.cache_file().display()),
        format!("work dir:    {}", config.work_dir().display()),
        format!("root:        {}", config.root().display()),
    ];
    if let Some(dir) = config.image_output_dir() {
        lines.push(format!("image dump:  {}", dir.display()));
    }
    lines
}

fn init(force: bool) -> anyhow::Result<()> {
    let path = Config::default_path();

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut config = Config::default();
    let checks = adapt_to_installed_tools(&mut config, |program| find_program(program).is_some());

    eprintln!("{}", style("External tools:").bold());
    for check in &checks {
        if check.found {
            eprintln!("  {FOUND}{:<13} {}", check.role, check.program);
        } else {
            eprintln!(
                "  {MISSING}{:<13} {} {}",
                check.role,
                check.program,
                style("(not on PATH)").yellow()
            );
        }
    }
    if !config.ocr.enabled {
        eprintln!("  OCR disabled until {} is installed", config.ocr.tesseract);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, config.to_toml()?)?;

    tracing::info!("Config file created at: {}", path.display());
    println!("Configuration initialized at: {}", path.display());
    Ok(())
}

/// One external program the pipeline shells out to.
#[derive(Debug)]
struct ToolCheck {
    role: &'static str,
    program: String,
    found: bool,
}

/// Point the defaults at the programs `installed` reports, and switch off
/// OCR when the recognizer is missing.
fn adapt_to_installed_tools(
    config: &mut Config,
    installed: impl Fn(&str) -> bool,
) -> Vec<ToolCheck> {
    // Some distributions only ship the `libreoffice` launcher.
    if !installed("soffice") && installed("libreoffice") {
        let converters = &mut config.converters;
        for spec in [&mut converters.pptx_to_pdf, &mut converters.docx_to_pdf] {
            if spec.program == "soffice" {
                spec.program = "libreoffice".to_string();
            }
        }
    }

    let tesseract_found = installed(&config.ocr.tesseract);
    if !tesseract_found {
        config.ocr.enabled = false;
    }

    let converters = &config.converters;
    let mut checks: Vec<ToolCheck> = [
        ("pptx -> pdf", &converters.pptx_to_pdf),
        ("pdf -> docx", &converters.pdf_to_docx),
        ("docx -> pdf", &converters.docx_to_pdf),
        ("docx -> html", &converters.docx_to_html),
    ]
    .into_iter()
    .map(|(role, spec)| ToolCheck {
        role,
        found: installed(&spec.program),
        program: spec.program.clone(),
    })
    .collect();
    checks.push(ToolCheck {
        role: "ocr",
        program: config.ocr.tesseract.clone(),
        found: tesseract_found,
    });
    checks
}

/// Locate `program` the way a shell would: as given if it has a directory
/// part, otherwise on `PATH`.
fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
