use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "camagru", version)]
struct Cli {
    /// JSON config file; `CAMAGRU_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite stickers onto an image and store it as PNG.
    Compose(ComposeArgs),
    /// List the pre-installed stickers as JSON.
    Stickers,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Owning user id, used in the stored file name.
    #[arg(long)]
    user: String,

    /// Primary image: a `data:image/...;base64,` URI or a file path.
    #[arg(long)]
    image: String,

    /// Sticker id, data-URI, or path. Repeat to stack several.
    #[arg(long = "sticker")]
    stickers: Vec<String>,

    /// Left edge of each sticker; centered when omitted.
    #[arg(long, allow_negative_numbers = true)]
    x: Option<f64>,

    /// Top edge of each sticker; centered when omitted.
    #[arg(long, allow_negative_numbers = true)]
    y: Option<f64>,

    /// Sticker scale factor.
    #[arg(long)]
    scale: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let compositor = camagru::Compositor::new(&config)?;

    match cli.cmd {
        Command::Compose(args) => cmd_compose(&compositor, args),
        Command::Stickers => cmd_stickers(&compositor),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<camagru::CompositorConfig> {
    let mut config = match path {
        Some(p) => camagru::CompositorConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => camagru::CompositorConfig::default(),
    };
    config.apply_env(|k| std::env::var(k).ok())?;
    config.validate()?;
    Ok(config)
}

fn cmd_compose(compositor: &camagru::Compositor, args: ComposeArgs) -> anyhow::Result<()> {
    let placement = camagru::Placement {
        x: args.x,
        y: args.y,
        scale: args.scale,
    };
    let layers: Vec<camagru::OverlayLayer> = args
        .stickers
        .iter()
        .map(|s| camagru::OverlayLayer::new(s.as_str(), placement))
        .collect();

    let stored = compositor
        .composite_layers(&args.user, &args.image, &layers)
        .context("compose image")?;

    eprintln!(
        "wrote {} ({}x{})",
        stored.abs_path.display(),
        stored.dimensions.width,
        stored.dimensions.height
    );
    println!("{}", stored.rel_path);
    Ok(())
}

fn cmd_stickers(compositor: &camagru::Compositor) -> anyhow::Result<()> {
    let stickers = compositor.stickers().list()?;
    let json = serde_json::to_string_pretty(&stickers).context("serialize sticker list")?;
    println!("{json}");
    Ok(())
}
