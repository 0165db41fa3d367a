use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use ascii_render::{AsciiGrid as _, FillChoice};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "ascii-render", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a grid JSON file as a full-resolution PNG.
    Frame(FrameArgs),
    /// Render a quarter-size, glyph-free preview PNG.
    Thumb(ThumbArgs),
}

#[derive(Args, Debug)]
struct GeometryArgs {
    /// Viewport width the output must fit in.
    #[arg(long, default_value_t = 1280)]
    max_width: u32,

    /// Viewport height the output must fit in.
    #[arg(long, default_value_t = 720)]
    max_height: u32,

    /// Source frame width (defaults to the viewport width).
    #[arg(long)]
    camera_width: Option<u32>,

    /// Source frame height (defaults to the viewport height).
    #[arg(long)]
    camera_height: Option<u32>,
}

impl GeometryArgs {
    fn camera(&self) -> (u32, u32) {
        (
            self.camera_width.unwrap_or(self.max_width),
            self.camera_height.unwrap_or(self.max_height),
        )
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input grid JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Monospace font file (TTF/OTF). Falls back to a well-known system font.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    geometry: GeometryArgs,

    /// Row worker threads (0 = all cores). Overrides `ASCII_RENDER_THREADS`.
    #[arg(long)]
    threads: Option<usize>,

    /// Row fill implementation. Overrides `ASCII_RENDER_FILL`.
    #[arg(long, value_enum)]
    fill: Option<FillArg>,

    /// Print diagnostics about font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_font: bool,
}

#[derive(Parser, Debug)]
struct ThumbArgs {
    /// Input grid JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    geometry: GeometryArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FillArg {
    Auto,
    Portable,
    Accelerated,
}

impl From<FillArg> for FillChoice {
    fn from(v: FillArg) -> Self {
        match v {
            FillArg::Auto => FillChoice::Auto,
            FillArg::Portable => FillChoice::Portable,
            FillArg::Accelerated => FillChoice::Accelerated,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Thumb(args) => cmd_thumb(args),
    }
}

fn read_grid_json(path: &Path) -> anyhow::Result<ascii_render::ConversionResult> {
    let f = File::open(path).with_context(|| format!("open grid '{}'", path.display()))?;
    let r = BufReader::new(f);
    let grid: ascii_render::ConversionResult =
        serde_json::from_reader(r).with_context(|| "parse grid JSON")?;
    Ok(grid)
}

fn resolve_font(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p),
        None => ascii_render::find_system_monospace_font()
            .context("no --font given and no system monospace font found"),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let grid = read_grid_json(&args.in_path)?;
    let font_path = resolve_font(args.font)?;
    let font_bytes = std::fs::read(&font_path)
        .with_context(|| format!("read font '{}'", font_path.display()))?;

    let mut opts = ascii_render::RendererOpts::from_env();
    if let Some(n) = args.threads {
        opts = opts.with_threads(n);
    }
    if let Some(fill) = args.fill {
        opts = opts.with_fill(fill.into());
    }

    let rasterizer = ascii_render::FontGlyphRasterizer::from_bytes(font_bytes.clone())?;
    if args.dump_font {
        eprintln!("font diagnostics:");
        eprintln!("  path:    {}", font_path.display());
        eprintln!("  family:  {}", rasterizer.family_name());
        eprintln!("  sha256:  {}", sha256_hex(&font_bytes));
    }

    let mut renderer = ascii_render::AsciiRenderer::new(Box::new(rasterizer), opts);
    renderer.set_maximum_image_size(args.geometry.max_width, args.geometry.max_height);
    let (cw, ch) = args.geometry.camera();
    renderer.set_camera_image_size(cw, ch);
    if grid.rows() != renderer.ascii_rows() || grid.columns() != renderer.ascii_columns() {
        tracing::info!(
            grid_rows = grid.rows(),
            grid_columns = grid.columns(),
            fit_rows = renderer.ascii_rows(),
            fit_columns = renderer.ascii_columns(),
            "grid size differs from output fit; excess is clipped, shortfall stays black"
        );
    }

    let surface = renderer.create_bitmap(&grid);
    write_png(&surface.to_rgba_image(), &args.out)?;
    let failed = renderer.last_frame_stats().map_or(0, |s| s.failed_bands);
    if failed > 0 {
        eprintln!("warning: {failed} row band(s) failed");
    }
    Ok(())
}

fn cmd_thumb(args: ThumbArgs) -> anyhow::Result<()> {
    let grid = read_grid_json(&args.in_path)?;

    let mut geometry = ascii_render::OutputGeometry::default();
    geometry.set_maximum_size(args.geometry.max_width, args.geometry.max_height);
    let (cw, ch) = args.geometry.camera();
    geometry.set_source_size(cw, ch);

    let surface =
        ascii_render::render_thumbnail(&grid, geometry.output_width(), geometry.output_height());
    write_png(&surface.to_rgba_image(), &args.out)
}

fn write_png(img: &image::RgbaImage, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
