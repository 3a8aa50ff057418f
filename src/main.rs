//! Raster Viewer - inspect and render image files from the command line.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raster_viewer::{
    config::{Cli, Command, InspectConfig, RenderConfig},
    io::format_file_size,
    FileSource, ImageCanvas, ImageViewer, LoadResult, LocalFile, RenderResult, ViewerConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Inspect(config) => run_inspect(config).await,
        Command::Render(config) => run_render(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "raster_viewer=debug"
    } else {
        "raster_viewer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open a local file and load it into a fresh viewer.
async fn open_and_load(
    path: &std::path::Path,
    media_type: Option<&str>,
    config: ViewerConfig,
) -> Result<(ImageViewer, LoadResult), String> {
    let mut file = LocalFile::open(path)
        .await
        .map_err(|e| format!("Cannot open {}: {}", path.display(), e))?;
    if let Some(media_type) = media_type {
        file = file.with_media_type(media_type);
    }
    debug!(
        path = %file.path().display(),
        media_type = file.media_type(),
        "Opened file"
    );

    let viewer = ImageViewer::new(config);
    let result = LoadResult::from(viewer.load_file(Some(&file)).await);
    Ok((viewer, result))
}

// =============================================================================
// Inspect Command
// =============================================================================

async fn run_inspect(config: InspectConfig) -> ExitCode {
    let media_type = config.media_type.as_deref();
    let (viewer, result) = match open_and_load(&config.path, media_type, ViewerConfig::default())
        .await
    {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let pages = viewer.pages().await;

    if config.json {
        let pages_json: Vec<serde_json::Value> = pages
            .iter()
            .map(|page| {
                serde_json::json!({
                    "index": page.index(),
                    "width": page.width(),
                    "height": page.height(),
                    "metadata": page.metadata(),
                })
            })
            .collect();

        let report = serde_json::json!({
            "result": result,
            "pages": pages_json,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        match (&result.file_info, &result.error) {
            (Some(info), _) => {
                println!("File:  {}", info.name);
                println!("Type:  {}", info.media_type);
                println!("Size:  {}", format_file_size(info.size));
                println!("Pages: {}", pages.len());
                println!();
                for page in pages.iter() {
                    println!(
                        "  Page {:>3}  {} x {}",
                        page.index() + 1,
                        page.width(),
                        page.height()
                    );
                    for (key, value) in page.metadata().iter() {
                        println!("            {}: {}", key, value);
                    }
                }
            }
            (None, error) => {
                println!(
                    "✗ {}: {}",
                    config.path.display(),
                    error.as_deref().unwrap_or("load failed")
                );
            }
        }
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// =============================================================================
// Render Command
// =============================================================================

async fn run_render(config: RenderConfig) -> ExitCode {
    let viewer_config = match config.viewer_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let media_type = config.media_type.as_deref();
    let (viewer, result) = match open_and_load(&config.path, media_type, viewer_config).await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(e) = result.error {
        error!("Failed to load {}: {}", config.path.display(), e);
        return ExitCode::FAILURE;
    }

    let page_count = result.page_count.unwrap_or(0);
    match viewer.jump_to_page(config.page).await {
        Ok(_) => {}
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let current = viewer
        .state()
        .await
        .map(|s| s.current_page() + 1)
        .unwrap_or(1);
    if i64::try_from(current).ok() != Some(config.page) {
        error!(
            "Page {} is out of range (file has {} page{})",
            config.page,
            page_count,
            if page_count == 1 { "" } else { "s" }
        );
        return ExitCode::FAILURE;
    }

    let mut canvas = ImageCanvas::default();
    let rendered = viewer.render_to_target(&mut canvas, None).await;
    let render_result = RenderResult::from_result(&rendered);
    if let Some(e) = render_result.error {
        error!("Render failed: {}", e);
        return ExitCode::FAILURE;
    }

    let overlay = canvas.overlay_lines().to_vec();
    let output = config.output_path();
    if let Err(e) = canvas.into_image().save(&output) {
        error!("Failed to write {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        page = config.page,
        pages = page_count,
        output = %output.display(),
        "Rendered page"
    );
    for line in &overlay {
        println!("{}", line);
    }
    println!("{}", output.display());

    ExitCode::SUCCESS
}
