use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use textlift::config::Config;
use textlift::host::{HeadlessDocument, SystemClipboard};
use textlift::ocr::{locate, validate, ImageSource, OcrEngine, OcrOptions, OcrPipeline};
use textlift::output::{self, DispatchOutcome, OutputMode};
use textlift::settings::{JsonFileStore, Settings};

#[derive(Parser)]
#[command(name = "textlift")]
#[command(about = "Extract text from images with an external OCR engine")]
struct Args {
    /// Image file to recognize
    image: Option<PathBuf>,

    /// Recognition language (ISO 639-2 code, e.g. "eng")
    #[arg(short, long)]
    lang: Option<String>,

    /// Page segmentation mode (0-13)
    #[arg(long)]
    psm: Option<u8>,

    /// OCR engine mode (0-3)
    #[arg(long)]
    oem: Option<u8>,

    /// Convert the image to grayscale before recognition
    #[arg(long)]
    grayscale: bool,

    /// Reduce the image to black and white before recognition
    #[arg(long)]
    binarize: bool,

    /// Explicit engine binary path (overrides auto-detection)
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Copy the recognized text to the system clipboard instead of
    /// printing it
    #[arg(long)]
    copy: bool,

    /// Locate the OCR engine, query its version, and exit
    #[arg(long)]
    check_engine: bool,

    /// List installed engine language packs and exit
    #[arg(long)]
    list_langs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textlift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    let mut settings = Settings::new(JsonFileStore::open(settings_path()));

    // Engine path precedence: command line, then environment, then the
    // stored setting, then auto-detection.
    if let Some(path) = &args.engine_path {
        config.engine.binary_path = path.display().to_string();
    } else if config.engine.binary_path.is_empty() {
        config.engine.binary_path = settings.engine_path();
    }

    if args.check_engine {
        return check_engine(&config);
    }
    if args.list_langs {
        return list_languages(&config);
    }

    let Some(image) = args.image else {
        anyhow::bail!(
            "no image given; pass an image path, or use --check-engine / --list-langs"
        );
    };

    let language = args
        .lang
        .or_else(|| settings.last_language())
        .unwrap_or_else(|| config.ocr.language.clone());
    let options = OcrOptions::new(
        language,
        args.psm.unwrap_or(config.ocr.psm),
        args.oem.unwrap_or(config.ocr.oem),
        args.grayscale || config.ocr.grayscale || settings.default_grayscale(),
        args.binarize || config.ocr.binarize || settings.default_binarize(),
    )?;

    let observer = |_stage: textlift::ocr::PipelineStage, message: &str| {
        tracing::info!("{message}");
    };
    let pipeline = OcrPipeline::new(&config, options.clone()).with_observer(&observer);

    let mut document = HeadlessDocument;
    let outcome = pipeline.run(&ImageSource::FilePath(image), &document);

    if !outcome.success {
        anyhow::bail!(
            "{}",
            outcome
                .message
                .unwrap_or_else(|| "OCR failed for an unknown reason".to_string())
        );
    }
    let text = outcome.text.unwrap_or_default();
    settings.set_last_language(&options.language);

    if args.copy {
        let mut clipboard = SystemClipboard::new();
        match output::dispatch(&text, OutputMode::Clipboard, &mut document, &mut clipboard) {
            DispatchOutcome::Failed { message } => anyhow::bail!("{message}"),
            _ => {
                settings.set_last_output_mode(OutputMode::Clipboard.as_str());
            }
        }
    } else {
        // Verbatim engine output, trailing newlines included.
        print!("{text}");
    }

    Ok(())
}

fn check_engine(config: &Config) -> anyhow::Result<()> {
    let binary = locate(&config.engine.binary_path)?;
    let version = validate(&binary)?;
    println!("OCR engine {} (version {version})", binary.display());
    Ok(())
}

fn list_languages(config: &Config) -> anyhow::Result<()> {
    let binary = locate(&config.engine.binary_path)?;
    let mut engine = OcrEngine::new(binary);
    for language in engine.list_languages()? {
        println!("{language}");
    }
    Ok(())
}

fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("textlift")
        .join("settings.json")
}
