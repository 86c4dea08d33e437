use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use imgvert::{ConversionRequest, EncodeTarget, TraceParams, VectorOptions, convert};

#[derive(Parser, Debug)]
#[command(name = "imgvert", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one or more images to a target format.
    Convert(ConvertArgs),
    /// Run a JSON manifest of conversion jobs.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path(s); repeat for multiple files.
    #[arg(long = "in", required = true)]
    in_paths: Vec<PathBuf>,

    /// Target format.
    #[arg(long, value_enum)]
    format: FormatChoice,

    /// Encoding quality in [0, 1] (JPEG, and JPEG embedded in SVG).
    #[arg(long, default_value_t = 0.92)]
    quality: f32,

    /// Uniform scale multiplier.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Pixel-area cutoff below which SVG output traces rects instead of
    /// embedding a raster snapshot.
    #[arg(long, default_value_t = imgvert::vector::DEFAULT_TRACE_AREA_THRESHOLD)]
    trace_threshold: u64,

    /// Sampling stride for traced SVG output.
    #[arg(long, default_value_t = imgvert::trace::DEFAULT_STRIDE)]
    stride: u32,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// JSON manifest of jobs.
    #[arg(long)]
    manifest: PathBuf,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
    Webp,
    Gif,
    Svg,
}

impl FormatChoice {
    fn target(self) -> EncodeTarget {
        match self {
            Self::Png => EncodeTarget::Png,
            Self::Jpeg => EncodeTarget::Jpeg,
            Self::Webp => EncodeTarget::WebP,
            Self::Gif => EncodeTarget::Gif,
            Self::Svg => EncodeTarget::Svg,
        }
    }
}

/// One entry of the batch manifest.
#[derive(serde::Deserialize, Debug)]
struct ManifestJob {
    input: PathBuf,
    format: EncodeTarget,
    #[serde(default = "default_quality")]
    quality: f32,
    #[serde(default = "default_scale")]
    scale: f32,
    /// Output file name; defaults to the input stem with the target extension.
    #[serde(default)]
    output: Option<PathBuf>,
}

fn default_quality() -> f32 {
    0.92
}

fn default_scale() -> f32 {
    1.0
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let opts = VectorOptions {
        trace_area_threshold: args.trace_threshold,
        trace: TraceParams {
            stride: args.stride,
            ..TraceParams::default()
        },
    };

    let target = args.format.target();
    let mut failed = 0usize;
    for in_path in &args.in_paths {
        let out_path = args.out_dir.join(output_name(in_path, None, target));
        if let Err(err) = run_job(in_path, target, args.quality, args.scale, &opts, &out_path) {
            eprintln!("error: {}: {err:#}", in_path.display());
            failed += 1;
        }
    }

    finish(failed, args.in_paths.len())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let jobs = read_manifest(&args.manifest)?;
    let opts = VectorOptions::default();

    let total = jobs.len();
    let mut failed = 0usize;
    for job in &jobs {
        let out_path = args
            .out_dir
            .join(output_name(&job.input, job.output.as_deref(), job.format));
        if let Err(err) = run_job(&job.input, job.format, job.quality, job.scale, &opts, &out_path)
        {
            eprintln!("error: {}: {err:#}", job.input.display());
            failed += 1;
        }
    }

    finish(failed, total)
}

fn read_manifest(path: &Path) -> anyhow::Result<Vec<ManifestJob>> {
    let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
    let r = BufReader::new(f);
    let jobs: Vec<ManifestJob> =
        serde_json::from_reader(r).with_context(|| "parse manifest JSON")?;
    Ok(jobs)
}

fn run_job(
    in_path: &Path,
    target: EncodeTarget,
    quality: f32,
    scale: f32,
    opts: &VectorOptions,
    out_path: &Path,
) -> anyhow::Result<()> {
    let source =
        std::fs::read(in_path).with_context(|| format!("read '{}'", in_path.display()))?;

    let req = ConversionRequest {
        source,
        source_type: media_type_for(in_path).to_string(),
        target,
        quality,
        scale,
    };
    let rendered = convert(&req, opts)?;

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out_path, &rendered.bytes)
        .with_context(|| format!("write '{}'", out_path.display()))?;

    eprintln!("wrote {}", out_path.display());
    Ok(())
}

fn finish(failed: usize, total: usize) -> anyhow::Result<()> {
    if failed > 0 {
        anyhow::bail!("{failed} of {total} conversions failed");
    }
    Ok(())
}

fn output_name(in_path: &Path, explicit: Option<&Path>, target: EncodeTarget) -> PathBuf {
    if let Some(name) = explicit {
        return name.to_path_buf();
    }
    let stem = in_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    PathBuf::from(format!("{stem}.{}", extension_for(target)))
}

fn extension_for(target: EncodeTarget) -> &'static str {
    match target {
        EncodeTarget::Png => "png",
        EncodeTarget::Jpeg => "jpg",
        EncodeTarget::WebP => "webp",
        EncodeTarget::Gif => "gif",
        EncodeTarget::Svg => "svg",
    }
}

/// Declared media type from the file extension; the decoder still sniffs
/// raster content, so this only has to route SVG correctly.
fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("svg") => "image/svg+xml",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}
