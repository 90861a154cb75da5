use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use futures::executor::block_on;

use tee_tint::color::HexColor;
use tee_tint::config::{self, AppConfig};
use tee_tint::export::{
    CaptureOutcome, ExportPipeline, FileDownloads, LogNotifier, SoftwareRasterizer,
    SystemClipboard,
};
use tee_tint::preview::{FillMode, PreviewSurface};
use tee_tint::state::{highlighted_swatch, ColorInput, ColorState};
use tee_tint::Hsva;

#[derive(Parser)]
#[command(name = "tee-tint")]
#[command(about = "Preview a shirt color and export it as PNG", long_about = None)]
struct Cli {
    /// Settings file (default: $XDG_CONFIG_HOME/tee-tint/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply color inputs, capture the preview and save it as image.png
    Render(RenderArgs),
    /// List the swatch grid
    Swatches,
    /// Print the shade strip for a color
    Shades { color: HexColor },
    /// Write a settings file with the defaults
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Input events, applied in order:
    /// hex:<text>, hsv:<h>,<s>,<v>[,<a>], swatch:<hex>, shade:<factor>
    #[arg(short, long = "input", value_name = "EVENT")]
    inputs: Vec<ColorInput>,

    /// Pick swatch N from the grid before the input events
    #[arg(long, value_name = "N")]
    swatch: Option<usize>,

    /// Product image (PNG); the built-in shirt is used otherwise
    #[arg(long)]
    product: Option<PathBuf>,

    /// tint or background
    #[arg(long)]
    mode: Option<FillMode>,

    /// Directory image.png is saved to
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Also copy the image to the clipboard.
    /// On Linux this waits until the image is pasted elsewhere,
    /// at most `clipboard_wait_secs` from the settings file.
    #[arg(long)]
    copy: bool,

    /// Print the capture as a data URL
    #[arg(long)]
    data_url: bool,

    /// Leave the `color: #xxxxxx` caption out of the image
    #[arg(long)]
    no_label: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Render(args) => render(args, &config::load_config(&config_path)),
        Commands::Swatches => {
            let cfg = config::load_config(&config_path);
            let swatches = cfg.swatches();
            let current = highlighted_swatch(&swatches, &cfg.initial_color());
            for (i, swatch) in swatches.iter().enumerate() {
                let mark = if current == Some(i) { "  *" } else { "" };
                println!("{:>2}  {}{}", i, swatch, mark);
            }
            Ok(())
        }
        Commands::Shades { color } => {
            for shade in Hsva::from_hex(&color).shades() {
                println!("{}", shade.to_hex());
            }
            Ok(())
        }
        Commands::InitConfig { force } => {
            if config_path.exists() && !force {
                bail!("{} already exists (use --force)", config_path.display());
            }
            config::save_config(&config_path, &AppConfig::default())?;
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn render(args: RenderArgs, cfg: &AppConfig) -> anyhow::Result<()> {
    let swatches = cfg.swatches();
    let mut state = ColorState::new(cfg.initial_color());

    let mode = args.mode.unwrap_or(cfg.fill_mode);
    let surface = match args.product.as_ref().or(cfg.product_image.as_ref()) {
        Some(path) => PreviewSurface::from_file(path, mode, state.canonical().clone())
            .with_context(|| format!("loading product image {}", path.display()))?,
        None => PreviewSurface::shirt(mode, state.canonical().clone()),
    };
    let surface = Rc::new(RefCell::new(surface.with_label(cfg.show_label && !args.no_label)));

    let preview = surface.clone();
    state.subscribe(move |color| preview.borrow_mut().set_fill(&color.hex));
    let grid = swatches.clone();
    state.subscribe(move |color| {
        if let Some(i) = highlighted_swatch(&grid, &color.hex) {
            tracing::debug!("swatch {} highlighted", i);
        }
    });

    if let Some(index) = args.swatch {
        let swatch = swatches
            .get(index)
            .with_context(|| format!("no swatch {}, the grid has {}", index, swatches.len()))?;
        state.apply(ColorInput::SwatchPicked(swatch.clone()));
    }
    for input in args.inputs {
        if !state.apply(input) {
            tracing::info!(
                "{:?} is not a color yet, keeping {}",
                state.text(),
                state.canonical()
            );
        }
    }
    println!("color: {}", state.canonical());

    let downloads = FileDownloads::new(args.out.unwrap_or_else(|| cfg.download_dir()));
    let clipboard = SystemClipboard::new(Duration::from_secs(cfg.clipboard_wait_secs));
    let pipeline = ExportPipeline::new(SoftwareRasterizer, clipboard, downloads, LogNotifier);
    let snapshot = surface.borrow().clone();

    block_on(async {
        match pipeline.request_capture(Some(&snapshot)).await {
            CaptureOutcome::Ready => {}
            other => bail!("capture did not complete: {:?}", other),
        }
        let path = pipeline.download()?;
        println!("{}", path.display());

        if args.data_url {
            if let Some(image) = pipeline.captured() {
                println!("{}", image.data_url());
            }
        }

        if args.copy || cfg.autocopy {
            pipeline.probe_clipboard().await;
            if pipeline.copy_available() {
                // failure is already reported; the saved file stays usable
                if let Err(err) = pipeline.copy_to_clipboard().await {
                    tracing::debug!("copy skipped: {}", err);
                }
            } else if let Some(hint) = pipeline.copy_hint() {
                println!("{}", hint);
            }
        }

        pipeline.dismiss();
        Ok::<(), anyhow::Error>(())
    })
}
