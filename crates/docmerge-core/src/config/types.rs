//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding per-file converted outputs
    pub work_dir: PathBuf,

    /// JSON cache file (path map, content digests, OCR results)
    pub cache_file: PathBuf,

    /// Keep `work_dir` after the run. Removing it forces reconversion
    /// next time, since cached outputs would no longer exist.
    pub keep_work_files: bool,

    /// Where to dump decoded embedded images (empty = disabled)
    pub image_output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("~/.docmerge/work"),
            cache_file: PathBuf::from("~/.docmerge/cache.json"),
            keep_work_files: true,
            image_output_dir: PathBuf::new(),
        }
    }
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Root directory to scan
    pub root: PathBuf,

    /// One merged document per immediate subdirectory (true) or one for
    /// the whole root (false)
    pub per_subdirectory: bool,

    /// Directory names that are never entered
    pub ignored_dirs: Vec<String>,

    /// File names or absolute paths that are skipped
    pub ignored_files: Vec<String>,

    /// Extensions picked up as inputs
    pub input_formats: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            per_subdirectory: true,
            ignored_dirs: vec!["__pycache__".to_string()],
            ignored_files: vec![],
            input_formats: vec!["pdf".to_string(), "docx".to_string(), "pptx".to_string()],
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target document kind by extension ("html", "pdf", "docx")
    pub kind: String,

    /// Also write "<name> (Imageless).<ext>" next to each merged document
    pub imageless_variant: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            kind: "html".to_string(),
            imageless_variant: false,
        }
    }
}

/// Text recognition settings for embedded images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Annotate embedded images in markup output
    pub enabled: bool,

    /// Ask the operator before recognizing each new image
    pub interactive: bool,

    /// Tesseract executable
    pub tesseract: String,

    /// Which images are skipped
    pub policy: IgnorePolicyConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interactive: false,
            tesseract: "tesseract".to_string(),
            policy: IgnorePolicyConfig::default(),
        }
    }
}

/// Policy selector as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Ignore images at or below the size limits
    Threshold,
    /// Recognize every image
    AlwaysOcr,
    /// Recognize nothing
    AlwaysIgnore,
}

/// Ignore policy parameters.
///
/// With `kind = "threshold"` an image is ignored when its width is at most
/// `width_limit`, its height at most `height_limit`, or its area at most
/// `area_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnorePolicyConfig {
    pub kind: PolicyKind,
    pub width_limit: u32,
    pub height_limit: u32,
    pub area_limit: u64,
}

impl Default for IgnorePolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::Threshold,
            width_limit: 20,
            height_limit: 20,
            area_limit: 11904,
        }
    }
}

/// An external program invocation.
///
/// `args` may contain `{input}`, `{output}` and `{output_dir}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Commands used for each direct conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertersConfig {
    pub pptx_to_pdf: CommandSpec,
    pub pdf_to_docx: CommandSpec,
    pub docx_to_pdf: CommandSpec,
    pub docx_to_html: CommandSpec,
}

impl Default for ConvertersConfig {
    fn default() -> Self {
        let soffice_pdf = CommandSpec::new(
            "soffice",
            &[
                "--headless",
                "--convert-to",
                "pdf",
                "--outdir",
                "{output_dir}",
                "{input}",
            ],
        );
        Self {
            pptx_to_pdf: soffice_pdf.clone(),
            pdf_to_docx: CommandSpec::new("pdf2docx", &["convert", "{input}", "{output}"]),
            docx_to_pdf: soffice_pdf,
            docx_to_html: CommandSpec::new(
                "pandoc",
                &[
                    "--from",
                    "docx",
                    "--to",
                    "html",
                    "--embed-resources",
                    "--standalone",
                    "--output",
                    "{output}",
                    "{input}",
                ],
            ),
        }
    }
}

/// Time limits for external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-hop converter timeout in milliseconds
    pub converter_timeout_ms: u64,

    /// Per-image OCR timeout in milliseconds
    pub ocr_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            converter_timeout_ms: 300_000,
            ocr_timeout_ms: 60_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
