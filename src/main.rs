use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use inkline::api;
use inkline::client::HttpCodec;
use inkline::dimensions::{convert, round_for_unit};
use inkline::models::{self, AppConfig, OutputFormat, Unit};
use inkline::requests::{build_enhancement, build_outline, EnhanceInput, OutlineInput};
use inkline::server;
use inkline::services::{ImageCodec, ImagingOptions, InMemoryBlobStore, LocalCodec};

#[derive(Parser)]
#[command(name = "inkline")]
#[command(about = "Inkline - image enhancer and outline extractor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Resample an image and stamp its print resolution
    Enhance {
        /// Source image
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Target width in --unit (derived from the source when omitted)
        #[arg(short = 'W', long)]
        width: Option<f64>,

        /// Target height in --unit (derived from the source when omitted)
        #[arg(short = 'H', long)]
        height: Option<f64>,

        /// "px" or "in"
        #[arg(short, long, default_value = "px", value_parser = parse_unit)]
        unit: Unit,

        /// Horizontal resolution (default from config)
        #[arg(long)]
        ppi: Option<u32>,

        /// Vertical resolution (defaults to --ppi)
        #[arg(long)]
        ppi_vertical: Option<u32>,

        /// Output format: png, jpg, bmp, tiff or webp (default from --output extension)
        #[arg(short, long)]
        format: Option<String>,

        /// Do not keep the source aspect ratio
        #[arg(long)]
        no_lock: bool,

        /// Process on a running inkline server instead of in-process
        #[arg(long)]
        server: Option<String>,
    },
    /// Trace the outline of an image
    Outline {
        /// Source image
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Line thickness level (1-5)
        #[arg(short, long, default_value_t = 1)]
        thickness: i64,

        /// Output format: png, jpg, bmp, tiff or webp (default from --output extension)
        #[arg(short, long)]
        format: Option<String>,

        /// Process on a running inkline server instead of in-process
        #[arg(long)]
        server: Option<String>,
    },
    /// Convert a length between pixels and inches
    Convert {
        value: f64,

        /// "px" or "in"
        #[arg(long, value_parser = parse_unit)]
        from: Unit,

        /// "px" or "in"
        #[arg(long, value_parser = parse_unit)]
        to: Unit,

        /// Resolution along the measured axis (default from config)
        #[arg(long)]
        ppi: Option<u32>,
    },
}

fn parse_unit(s: &str) -> Result<Unit, String> {
    Unit::parse(s).ok_or_else(|| format!("unknown unit '{s}' (expected px or in)"))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inkline API",
        description = "Image enhancer (resample + resolution) and outline extractor",
        version = "0.3.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_upload,
        api::handle_enhance,
        api::handle_extract_outline,
        api::handle_download,
        api::handle_file,
        api::handle_calculate_dimensions,
        api::handle_convert_units,
    ),
    components(schemas(
        api::UploadForm,
        api::UploadResponse,
        api::EnhanceRequest,
        api::OutlineRequest,
        api::ProcessResponse,
        api::CalculateDimensionsRequest,
        api::CalculateDimensionsResponse,
        api::ConvertUnitsRequest,
        api::ConvertUnitsResponse,
        models::ImageInfo,
        models::ProcessingResult,
        models::OutputFormat,
        models::BlobKind,
        models::Unit,
        models::Axis,
    )),
    tags(
        (name = "Images", description = "Upload, enhance and outline"),
        (name = "Files", description = "Stored image retrieval"),
        (name = "Helpers", description = "Dimension arithmetic for the wizard")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Enhance {
            input,
            output,
            width,
            height,
            unit,
            ppi,
            ppi_vertical,
            format,
            no_lock,
            server,
        }) => {
            init_cli_logging();
            let config = load_config();
            let ppi = ppi.unwrap_or(config.default_ppi);
            let request = EnhanceInput {
                width,
                height,
                unit,
                ppi_horizontal: ppi,
                ppi_vertical: ppi_vertical.unwrap_or(ppi),
                lock_aspect: !no_lock,
                format: output_format(format, &output),
                ..Default::default()
            };
            match server {
                Some(url) => run_enhance(&HttpCodec::new(url)?, &input, &output, request).await,
                None => run_enhance(&local_codec(&config), &input, &output, request).await,
            }
        }
        Some(Commands::Outline {
            input,
            output,
            thickness,
            format,
            server,
        }) => {
            init_cli_logging();
            let config = load_config();
            let request = OutlineInput {
                thickness,
                format: output_format(format, &output),
                ..Default::default()
            };
            match server {
                Some(url) => run_outline(&HttpCodec::new(url)?, &input, &output, request).await,
                None => run_outline(&local_codec(&config), &input, &output, request).await,
            }
        }
        Some(Commands::Convert {
            value,
            from,
            to,
            ppi,
        }) => {
            init_cli_logging();
            let ppi = ppi.unwrap_or(load_config().default_ppi);
            let length = models::Dimension::new(value, from)?;
            let converted = convert(length.value(), length.unit(), to, ppi)?;
            let label = match to {
                Unit::Pixels => "px",
                Unit::Physical => "in",
            };
            println!("{} {label}", round_for_unit(converted, to));
            Ok(())
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for one-shot commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkline=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn load_config() -> AppConfig {
    let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
    AppConfig::load(config_file.as_deref()).with_env_overrides()
}

fn local_codec(config: &AppConfig) -> LocalCodec {
    LocalCodec::new(
        Arc::new(InMemoryBlobStore::new()),
        ImagingOptions::from(config),
    )
}

/// Explicit --format wins, then the output extension, then PNG.
fn output_format(format: Option<String>, output: &Path) -> String {
    format
        .or_else(|| {
            output
                .to_str()
                .and_then(OutputFormat::from_file_name)
                .map(|f| f.extension().to_string())
        })
        .unwrap_or_else(|| OutputFormat::default().extension().to_string())
}

/// Upload a local file to the codec and return its reference and metadata.
async fn upload_file<C: ImageCodec + ?Sized>(
    codec: &C,
    input: &Path,
) -> anyhow::Result<models::ImageInfo> {
    let bytes = tokio::fs::read(input)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.png");
    Ok(codec.upload(file_name, bytes).await?)
}

async fn run_enhance<C: ImageCodec + ?Sized>(
    codec: &C,
    input: &Path,
    output: &Path,
    mut request: EnhanceInput,
) -> anyhow::Result<()> {
    // Reject bad parameters before the upload
    models::Resolution::new(request.ppi_horizontal, request.ppi_vertical)?;
    if request.width.is_some() && request.height.is_some() {
        build_enhancement(&EnhanceInput {
            source_ref: input.display().to_string(),
            ..request.clone()
        })?;
    }

    let info = upload_file(codec, input).await?;
    request.source_ref = info.filename.clone();
    request.reference = Some(info.size());
    let spec = build_enhancement(&request)?;

    let result = codec.enhance(&spec).await?;
    let bytes = codec.fetch(result.result_kind, &result.result_ref).await?;
    tokio::fs::write(output, &bytes).await?;

    println!(
        "Enhanced {} -> {} ({}x{} px, {}x{} ppi, {} bytes)",
        input.display(),
        output.display(),
        result.width,
        result.height,
        spec.resolution.horizontal(),
        spec.resolution.vertical(),
        bytes.len()
    );
    Ok(())
}

async fn run_outline<C: ImageCodec + ?Sized>(
    codec: &C,
    input: &Path,
    output: &Path,
    mut request: OutlineInput,
) -> anyhow::Result<()> {
    let info = upload_file(codec, input).await?;
    request.upload_ref = Some(info.filename);
    let spec = build_outline(&request)?;

    let result = codec.extract_outline(&spec).await?;
    let bytes = codec.fetch(result.result_kind, &result.result_ref).await?;
    tokio::fs::write(output, &bytes).await?;

    println!(
        "Outlined {} -> {} (thickness {}, {} bytes)",
        input.display(),
        output.display(),
        spec.thickness.get(),
        bytes.len()
    );
    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let storage_dir = std::env::var("STORAGE_DIR").ok();

    println!("Inkline v{VERSION}");
    println!("Image enhancer and outline extractor\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:5000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  STORAGE_DIR = {}",
        storage_dir.as_deref().unwrap_or("(not set)")
    );

    let config_source = match config_file {
        Some(ref path) if Path::new(path).exists() => path.to_string(),
        Some(_) => "embedded (file not found)".to_string(),
        None => "embedded".to_string(),
    };
    println!("\nConfig:  {config_source}");

    println!("\nCommands:");
    println!("  inkline serve     Start the HTTP server");
    println!("  inkline enhance   Resample an image and stamp its resolution");
    println!("  inkline outline   Trace the outline of an image");
    println!("  inkline convert   Convert between pixels and inches");
    println!("\nRun 'inkline --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let config = load_config();

    let state = server::create_app_state(config).await?;

    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Inkline server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
