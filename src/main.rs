use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scanlayout::core::config::{load_config, save_config, LayoutConfig};
use scanlayout::core::model::TextFragment;
use scanlayout::core::text::WidthMode;
use scanlayout::ocr::{CommandOcrEngine, OcrPayload, PageRenderer};
use scanlayout::pipeline::{build_documents, export_document, recognize_pdf, OutputFormat};
use scanlayout::translate::{build_prompt, parse_translation, CommandTranslator, Translator};

#[derive(Parser, Debug)]
#[command(name = "scanlayout")]
#[command(version, about = "Rebuild the visual layout of scanned pages from OCR fragments", long_about = None)]
struct Cli {
    /// Layout configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out OCR JSON files, one page per file
    Render {
        /// OCR result files in page order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: ./<first_input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to generate
        #[arg(short, long, value_enum, default_values_t = vec![Format::Text, Format::Html])]
        format: Vec<Format>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        translate: TranslateArgs,
    },

    /// Rasterize a PDF, run OCR on every page and lay out the result
    Convert {
        /// Input PDF file path
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to generate
        #[arg(short, long, value_enum, default_values_t = vec![Format::Text, Format::Html])]
        format: Vec<Format>,

        /// Rasterization DPI, also used as the layout DPI (default: the
        /// configured layout DPI)
        #[arg(long)]
        raster_dpi: Option<u32>,

        /// OCR program; receives `--image <png> --lang <lang>`
        #[arg(long, env = "SCANLAYOUT_OCR_CMD")]
        ocr_cmd: PathBuf,

        /// Extra leading argument for the OCR program (repeatable)
        #[arg(long)]
        ocr_arg: Vec<String>,

        /// Recognition language passed to the OCR program
        #[arg(long, default_value = "korean")]
        lang: String,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        translate: TranslateArgs,
    },

    /// Print the translation prompt for one OCR JSON page
    Prompt {
        input: PathBuf,
    },

    /// Parse a translation reply and print the recovered fragments as JSON
    ParseTranslation {
        input: PathBuf,
    },

    /// Write the default configuration to a TOML file
    InitConfig {
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Maximum bottom-edge distance (px) for fragments on one line
    #[arg(long)]
    y_tolerance: Option<f32>,

    /// Resolution the OCR boxes were measured at
    #[arg(long)]
    dpi: Option<f32>,

    /// Count East Asian wide characters as two columns
    #[arg(long)]
    wide: bool,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Translation program; reads the prompt on stdin, answers on stdout
    #[arg(long, env = "SCANLAYOUT_TRANSLATE_CMD")]
    translate_cmd: Option<PathBuf>,

    /// Argument for the translation program (repeatable)
    #[arg(long)]
    translate_arg: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Text,
    Json,
    Html,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Html => OutputFormat::Html,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LayoutConfig::default(),
    };

    match cli.command {
        Commands::Render {
            inputs,
            output,
            format,
            layout,
            translate,
        } => {
            let config = apply_layout_args(config, &layout);
            let output = output.unwrap_or_else(|| default_output_dir(&inputs[0]));
            if !cli.quiet {
                println!("[*] Laying out {} page file(s)", inputs.len());
                println!("[*] Output: {}", output.display());
            }
            let pages = inputs.iter().map(|path| read_page(path)).collect();
            finish(pages, &output, &format, &translate, &config, cli.quiet)
        }
        Commands::Convert {
            input,
            output,
            format,
            raster_dpi,
            ocr_cmd,
            ocr_arg,
            lang,
            layout,
            translate,
        } => {
            if !input.is_file() {
                anyhow::bail!("Input is not a file: {}", input.display());
            }
            let mut config = apply_layout_args(config, &layout);
            let raster_dpi = resolve_raster_dpi(&mut config, raster_dpi)?;
            let output = output.unwrap_or_else(|| default_output_dir(&input));
            if !cli.quiet {
                println!("[*] Processing: {}", input.display());
                println!("[*] Output: {}", output.display());
                println!("[*] DPI: {}", raster_dpi);
            }

            let renderer = PageRenderer::new(output.join("pages"), raster_dpi);
            let engine = CommandOcrEngine::new(ocr_cmd)
                .with_args(ocr_arg)
                .with_lang(lang);
            let pages = recognize_pdf(&input, &renderer, &engine)
                .with_context(|| format!("Failed to process PDF: {}", input.display()))?;
            finish(pages, &output, &format, &translate, &config, cli.quiet)
        }
        Commands::Prompt { input } => {
            let fragments = read_page(&input)?;
            println!(
                "{}",
                build_prompt(
                    &fragments,
                    &config.translate.source_lang,
                    &config.translate.target_lang
                )
            );
            Ok(())
        }
        Commands::ParseTranslation { input } => {
            let reply = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let fragments = parse_translation(&reply)?;
            println!("{}", serde_json::to_string_pretty(&fragments)?);
            Ok(())
        }
        Commands::InitConfig { path } => {
            save_config(&LayoutConfig::default(), &path)?;
            info!(path = %path.display(), "wrote default configuration");
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_layout_args(mut config: LayoutConfig, args: &LayoutArgs) -> LayoutConfig {
    if let Some(tolerance) = args.y_tolerance {
        config.cluster.y_tolerance = tolerance;
    }
    if let Some(dpi) = args.dpi {
        config.render.dpi = dpi;
    }
    if args.wide {
        config.render.width_mode = WidthMode::Wide;
    }
    config
}

/// Rasterizing and layout must agree on DPI. `--raster-dpi` wins, otherwise
/// the layout DPI (config file or `--dpi`) is used for both.
fn resolve_raster_dpi(config: &mut LayoutConfig, raster_dpi: Option<u32>) -> Result<u32> {
    let dpi = match raster_dpi {
        Some(dpi) => dpi,
        None => config.render.dpi.round() as u32,
    };
    if dpi == 0 {
        anyhow::bail!("DPI must be positive");
    }
    config.render.dpi = dpi as f32;
    Ok(dpi)
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scanlayout".to_string());
    PathBuf::from(format!("{stem}_output"))
}

fn read_page(path: &Path) -> Result<Vec<TextFragment>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: OcrPayload = serde_json::from_str(&data)
        .with_context(|| format!("Invalid OCR JSON in {}", path.display()))?;
    Ok(payload.into_fragments())
}

fn finish(
    pages: Vec<Result<Vec<TextFragment>>>,
    output: &Path,
    formats: &[Format],
    translate: &TranslateArgs,
    config: &LayoutConfig,
    quiet: bool,
) -> Result<()> {
    let formats: Vec<OutputFormat> = formats.iter().copied().map(OutputFormat::from).collect();
    let total = pages.len();

    let translator = translate.translate_cmd.as_ref().map(|program| {
        CommandTranslator::new(program.clone()).with_args(translate.translate_arg.clone())
    });
    if translator.is_some() && !quiet {
        println!("[+] Translating recognized pages...");
    }
    let (document, translated) = build_documents(
        pages,
        translator.as_ref().map(|t| t as &dyn Translator),
        config,
    );

    export_document(&document, output, "document", &formats, config)
        .with_context(|| format!("Failed to export to: {}", output.display()))?;
    info!(
        pages = document.page_count,
        skipped = total - document.page_count,
        output = %output.display(),
        "layout written"
    );

    if let Some(translated) = translated {
        export_document(&translated, output, "document.translated", &formats, config)
            .with_context(|| format!("Failed to export to: {}", output.display()))?;
        info!(
            pages = translated.page_count,
            skipped = document.page_count - translated.page_count,
            "translation written"
        );
    }

    if !quiet {
        println!("\n[✓] Done! Results saved to: {}", output.display());
    }
    Ok(())
}
