use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use veneer::{CpuRasterizer, Engine, FrameIndex, Project};

#[derive(Parser, Debug)]
#[command(name = "veneer", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a project JSON and print a summary.
    Validate(ValidateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render every frame as a numbered PNG sequence.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based), or a timecode like 00:00:01:15.
    #[arg(long)]
    frame: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Proportional font file (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Monospace font file (TTF/OTF).
    #[arg(long)]
    mono_font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for frame-%06d.png files.
    #[arg(long)]
    out_dir: PathBuf,

    /// First frame to render (default 0).
    #[arg(long)]
    start: Option<i64>,

    /// Last frame to render, inclusive (default the final frame).
    #[arg(long)]
    end: Option<i64>,

    /// Proportional font file (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Monospace font file (TTF/OTF).
    #[arg(long)]
    mono_font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<Project> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("open project '{}'", path.display()))?;
    Ok(Project::from_json(&json)?)
}

fn make_rasterizer(
    project: &Project,
    in_path: &Path,
    font: Option<&Path>,
    mono_font: Option<&Path>,
) -> anyhow::Result<CpuRasterizer> {
    let asset_root = in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut raster = CpuRasterizer::new(project.canvas()?).with_asset_root(asset_root);
    if let Some(path) = font {
        raster.fonts_mut().load_regular(path)?;
    }
    if let Some(path) = mono_font {
        raster.fonts_mut().load_mono(path)?;
    }
    Ok(raster)
}

/// Wall-clock substitute for offline rendering: media time in milliseconds,
/// so pulse and cursor decorations animate deterministically with the frame.
fn media_ms(frame: FrameIndex, fps: f64) -> u64 {
    ((frame.0.max(0) as f64 / fps) * 1000.0).round() as u64
}

fn write_png(out: &Path, frame: &veneer::RasterFrame) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.unpremultiplied(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    println!(
        "ok: {}x{} @ {} fps, {} frames, {} overlays, {} tracked objects",
        project.video_width,
        project.video_height,
        project.fps,
        project.total_frames,
        project.overlays.len(),
        project.tracked_objects.len()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut engine = Engine::from_project(&project)?;
    let mut raster = make_rasterizer(
        &project,
        &args.in_path,
        args.font.as_deref(),
        args.mono_font.as_deref(),
    )?;

    let frame = match args.frame.parse::<i64>() {
        Ok(n) => FrameIndex(n),
        Err(_) => engine.timeline().parse_timecode(&args.frame)?,
    };
    engine.seek(frame);

    let plan = engine.render(media_ms(frame, project.fps), raster.fonts());
    let pixels = raster.rasterize(&plan)?;
    write_png(&args.out, &pixels)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut engine = Engine::from_project(&project)?;
    let mut raster = make_rasterizer(
        &project,
        &args.in_path,
        args.font.as_deref(),
        args.mono_font.as_deref(),
    )?;

    let start = args.start.unwrap_or(0).max(0);
    let end = args
        .end
        .unwrap_or(project.total_frames - 1)
        .min(project.total_frames - 1);
    anyhow::ensure!(start <= end, "empty frame range {start}..={end}");

    for n in start..=end {
        let frame = FrameIndex(n);
        engine.seek(frame);
        let plan = engine.render(media_ms(frame, project.fps), raster.fonts());
        let pixels = raster.rasterize(&plan)?;
        write_png(&args.out_dir.join(format!("frame-{n:06}.png")), &pixels)?;
    }

    eprintln!(
        "wrote {} frames to {}",
        end - start + 1,
        args.out_dir.display()
    );
    Ok(())
}
