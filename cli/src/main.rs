//! coadoc CLI - COA PDF extraction and translation tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use coadoc::mapper::{ContentMapper, FallbackSection, MapperOptions};
use coadoc::pipeline::{JobOutput, Pipeline, PipelineConfig};
use coadoc::render::OutputFormat;
use coadoc::translate::{system_prompt, Glossary, OpenAiTranslator, TranslationMode, DEFAULT_MODEL};
use coadoc::{
    load_file_with_options, ExtractOptions, Extractor, ParseOptions, SectionSchema,
    TranslationJobMetadata, TranslationResponse, Warning,
};

#[derive(Parser)]
#[command(name = "coadoc")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Extract Certificate-of-Analysis PDFs and translate them into a structured Russian document",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF, falling back to OCR for scanned pages
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the full extraction result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Extract, translate and render a PDF
    Translate {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <name>_ru.<ext> next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Translation model
        #[arg(long, env = "COADOC_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        /// Requested answer shape
        #[arg(long, value_enum, default_value = "structured")]
        mode: ModeArg,

        /// Extra glossary entries (JSON object or list of {en, ru})
        #[arg(long, value_name = "FILE")]
        glossary: Option<PathBuf>,

        /// Template handed to the renderer
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Section receiving unstructured answers
        #[arg(long, value_enum, default_value = "notes")]
        fallback: FallbackArg,

        /// Do not retry in plain mode when a structured answer is unusable
        #[arg(long)]
        no_retry: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Map a saved translation answer onto the section schema
    Map {
        /// File holding the raw answer
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Treat the answer as plain text instead of JSON
        #[arg(long)]
        plain: bool,

        /// Section receiving unstructured answers
        #[arg(long, value_enum, default_value = "notes")]
        fallback: FallbackArg,

        /// Print a readable preview instead of JSON
        #[arg(long)]
        preview: bool,
    },

    /// Show the section schema
    Schema {
        /// Print the translation system prompt instead
        #[arg(long)]
        prompt: bool,

        /// Prompt shape
        #[arg(long, value_enum, default_value = "structured")]
        mode: ModeArg,

        /// Extra glossary entries for the prompt
        #[arg(long, value_name = "FILE")]
        glossary: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ExtractArgs {
    /// Rendering resolution for OCR
    #[arg(long, default_value_t = coadoc::raster::DEFAULT_DPI)]
    dpi: u32,

    /// Minimum alphanumeric characters for OCR text to be accepted
    #[arg(long, default_value_t = coadoc::extract::MIN_ALNUM_CHARS)]
    min_chars: usize,

    /// Run OCR on several pages at once
    #[arg(long)]
    parallel: bool,

    /// Omit the per-page markers
    #[arg(long)]
    no_markers: bool,

    /// Ignore the embedded text layer and OCR every page
    #[arg(long)]
    force_ocr: bool,

    /// Fail on the first unreadable page
    #[arg(long)]
    strict: bool,
}

impl ExtractArgs {
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new();
        if self.strict {
            options = options.strict();
        }
        if self.force_ocr {
            options = options.ignore_text_layer();
        }
        options
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new()
            .with_dpi(self.dpi)
            .with_min_alnum_chars(self.min_chars)
            .with_parallel(self.parallel)
            .with_page_markers(!self.no_markers)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// JSON payload for an external document builder
    Json,
    /// Plain text document
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// JSON keyed by the section schema
    Structured,
    /// Translated prose
    Plain,
}

impl From<ModeArg> for TranslationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Structured => TranslationMode::Structured,
            ModeArg::Plain => TranslationMode::Plain,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FallbackArg {
    /// Notes section
    Notes,
    /// Test results table
    TestResults,
}

impl From<FallbackArg> for FallbackSection {
    fn from(fallback: FallbackArg) -> Self {
        match fallback {
            FallbackArg::Notes => FallbackSection::Notes,
            FallbackArg::TestResults => FallbackSection::TestResults,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            json,
            extract,
        } => cmd_extract(&input, output.as_deref(), json, &extract),
        Commands::Translate {
            input,
            output,
            format,
            model,
            mode,
            glossary,
            template,
            fallback,
            no_retry,
            extract,
        } => {
            let config = PipelineConfig::new()
                .with_model(model)
                .with_mode(mode.into())
                .with_plain_retry(!no_retry)
                .with_mapper_options(MapperOptions::new().with_fallback(fallback.into()))
                .with_parse_options(extract.parse_options())
                .with_extract_options(extract.extract_options());
            load_glossary(glossary.as_deref())
                .map(|g| config.with_glossary(g))
                .and_then(|config| {
                    let config = match template {
                        Some(path) => config.with_template(path),
                        None => config,
                    };
                    cmd_translate(&input, output.as_deref(), format, config)
                })
        }
        Commands::Map {
            input,
            output,
            plain,
            fallback,
            preview,
        } => cmd_map(&input, output.as_deref(), plain, fallback, preview),
        Commands::Schema {
            prompt,
            mode,
            glossary,
        } => cmd_schema(prompt, mode, glossary.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Built-in glossary, extended with entries from `path`.
fn load_glossary(path: Option<&Path>) -> Result<Glossary, Box<dyn std::error::Error>> {
    let mut glossary = Glossary::builtin();
    if let Some(path) = path {
        let extra = Glossary::from_json_file(path)?;
        log::info!("Loaded {} glossary entries from {}", extra.len(), path.display());
        glossary.extend(extra);
    }
    Ok(glossary)
}

fn write_or_print(output: Option<&Path>, content: &[u8]) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", String::from_utf8_lossy(content));
    }
    Ok(())
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

fn cmd_extract(input: &Path, output: Option<&Path>, json: bool, args: &ExtractArgs) -> CliResult {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message("Loading PDF...");
    let doc = load_file_with_options(input, args.parse_options())?;

    spinner.set_message(format!("Extracting {} page(s)...", doc.page_count()));
    let result = Extractor::new(args.extract_options()).extract(&doc)?;
    spinner.finish_and_clear();

    print_warnings(&result.warnings);
    eprintln!(
        "{} {} of {} page(s) via {}",
        "Extracted".green(),
        result.succeeded_pages(),
        result.page_count(),
        result.method.to_string().cyan()
    );

    if json {
        let json = serde_json::to_string_pretty(&result)?;
        write_or_print(output, json.as_bytes())
    } else {
        write_or_print(output, result.text.as_bytes())
    }
}

fn cmd_translate(
    input: &Path,
    output: Option<&Path>,
    format: FormatArg,
    config: PipelineConfig,
) -> CliResult {
    let format = OutputFormat::from(format);
    let output_path = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_ru.{}", stem, format.extension()))
    });
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let model = config.model.clone();
    let translator = OpenAiTranslator::from_env()?;
    let pipeline = Pipeline::new(config, Box::new(translator), format.renderer());

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading PDF...");
    let bytes = fs::read(input)?;
    let doc = pipeline.load(&bytes)?;
    pb.inc(1);

    pb.set_message("Extracting text...");
    let extraction = pipeline.extract(&doc)?;
    drop(doc);
    pb.inc(1);

    pb.set_message(format!("Translating with {}...", model));
    let mapped = pipeline.translate(&extraction.text)?;
    pb.inc(1);

    pb.set_message("Rendering...");
    let metadata = TranslationJobMetadata::new(filename, extraction.method, model);
    let document = pipeline.render(&mapped.content, &metadata)?;
    fs::write(&output_path, &document)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    let mut warnings = extraction.warnings.clone();
    warnings.extend(mapped.warnings);
    let job = JobOutput {
        document,
        content: mapped.content,
        extraction,
        metadata,
        warnings,
        dropped_keys: mapped.dropped_keys,
    };

    println!();
    print_warnings(&job.warnings);
    if !job.dropped_keys.is_empty() {
        eprintln!(
            "{} ignored keys outside the schema: {}",
            "note:".dimmed(),
            job.dropped_keys.join(", ")
        );
    }
    println!("{}", job.summary());
    println!("{} {}", "Saved to".green(), output_path.display());
    Ok(())
}

fn cmd_map(
    input: &Path,
    output: Option<&Path>,
    plain: bool,
    fallback: FallbackArg,
    preview: bool,
) -> CliResult {
    let raw = fs::read_to_string(input)?;
    let response = if plain {
        TranslationResponse::PlainText(raw)
    } else {
        TranslationResponse::Structured(raw)
    };

    let mapper = ContentMapper::new(
        SectionSchema::coa(),
        MapperOptions::new().with_fallback(fallback.into()),
    );
    let mapped = mapper.map(&response);
    print_warnings(&mapped.warnings);
    if !mapped.dropped_keys.is_empty() {
        eprintln!(
            "{} ignored keys outside the schema: {}",
            "note:".dimmed(),
            mapped.dropped_keys.join(", ")
        );
    }

    if preview {
        write_or_print(output, mapped.content.preview().as_bytes())
    } else {
        let json = serde_json::to_string_pretty(&mapped.content)?;
        write_or_print(output, json.as_bytes())
    }
}

fn cmd_schema(prompt: bool, mode: ModeArg, glossary: Option<&Path>) -> CliResult {
    let schema = SectionSchema::coa();

    if prompt {
        let glossary = load_glossary(glossary)?;
        println!("{}", system_prompt(mode.into(), &glossary, &schema));
        return Ok(());
    }

    println!("{}", "COA Section Schema".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (i, section) in schema.sections().iter().enumerate() {
        let kind = if section.is_table() { "table" } else { "text" };
        println!(
            "{:>2}. {} {} {}",
            i + 1,
            section.key.bold(),
            format!("[{}]", kind).dimmed(),
            section.label
        );
        println!("    {}", section.description.dimmed());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "coadoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("COA PDF extraction and translation tool");
    println!();
    println!("External tools: pdftoppm or mutool (rendering), tesseract (OCR)");
    println!("License: MIT");
}
