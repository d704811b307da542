use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "themeloop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a headless show: bootstrap, maintain in the background, read every frame.
    Run(RunArgs),
    /// Print per-theme path counts and the derived cache budget.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Show configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Use generated in-memory images instead of decoding files.
    #[arg(long)]
    synthetic: bool,

    /// Number of frames to run.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Consumer frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Request a theme switch every N frames (0 disables switching).
    #[arg(long, default_value_t = 240)]
    switch_every: u64,

    /// Override the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Show configuration JSON.
    #[arg(long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<themeloop::ShowConfig> {
    let config = themeloop::ShowConfig::from_json_file(path)
        .with_context(|| format!("load show config '{}'", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[derive(Debug, Default)]
struct RunSummary {
    frames: u64,
    empty_reads: u64,
    switches_requested: u64,
    switches_observed: u64,
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = read_config(&args.config)?;
    if args.seed.is_some() {
        config.system.seed = args.seed;
    }
    if !args.fps.is_finite() || args.fps <= 0.0 {
        anyhow::bail!("--fps must be finite and > 0");
    }

    let loader: Arc<dyn themeloop::AssetLoader> = if args.synthetic {
        Arc::new(themeloop::SyntheticLoader::new(64))
    } else {
        let root = args.config.parent().unwrap_or_else(|| Path::new("."));
        Arc::new(themeloop::FsAssetLoader::new(root))
    };

    let started = Instant::now();
    let bank = themeloop::ThemeBank::from_config(&config, loader)?;
    eprintln!(
        "bootstrapped {} themes in {:.1} ms",
        bank.theme_count(),
        started.elapsed().as_secs_f64() * 1000.0
    );

    let (driver, mut pairs) = themeloop::MaintenanceDriver::spawn(
        bank,
        themeloop::DriverOpts::from_system(&config.system),
    )?;

    let frame_time = Duration::from_secs_f64(1.0 / args.fps);
    let mut summary = RunSummary::default();
    for frame in 0..args.frames {
        let frame_start = Instant::now();
        summary.switches_observed += pairs.catch_up();

        for alternate in [true, false] {
            let theme = pairs.get(alternate);
            if theme.get_image().is_empty() {
                summary.empty_reads += 1;
            }
            let _ = theme.get_text();
            let _ = theme.get_font();
        }

        if args.switch_every > 0 && frame > 0 && frame % args.switch_every == 0 {
            driver.request_change()?;
            summary.switches_requested += 1;
        }
        summary.frames += 1;

        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let bank = driver.shutdown()?;
    let slots = bank.slots();
    eprintln!("frames:              {}", summary.frames);
    eprintln!("empty reads:         {}", summary.empty_reads);
    eprintln!("switches requested:  {}", summary.switches_requested);
    eprintln!("switches observed:   {}", summary.switches_observed);
    eprintln!(
        "final pair:          {} / {}",
        bank.get(true).name(),
        bank.get(false).name()
    );
    eprintln!("final slots:         {slots:?}");
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;
    let per_slot = config.per_slot_target();

    println!("themes:            {}", config.themes.len());
    println!("image_cache_size:  {}", config.system.image_cache_size);
    println!("per-slot target:   {per_slot}");
    for (i, theme) in config.themes.iter().enumerate() {
        println!("  [{i}] {}", if theme.name.is_empty() { "<unnamed>" } else { &theme.name });
        println!("      images:      {}", theme.image_path.len());
        println!("      animations:  {}", theme.animation_path.len());
        println!("      fonts:       {}", theme.font_path.len());
        println!("      text lines:  {}", theme.text_line.len());
        if theme.image_path.len() < per_slot {
            println!("      note:        fewer images than the per-slot target");
        }
    }
    Ok(())
}
