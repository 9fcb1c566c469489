use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use fg_core::{BandField, Channel, Domain, DomainTransform, IrregularGrid, RectilinearGrid};
use fg_resample::{
    ACCUM_TOLERANCE, Compositor, GridResampler, OFFSET_TOLERANCE, ResamplingMode, Tolerances,
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fg_gallery")]
#[command(about = "Run fixed-grid resampling and compositing on band fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "transform")]
    Transform(TransformArgs),
    #[command(name = "resample")]
    Resample(ResampleArgs),
    #[command(name = "composite")]
    Composite(CompositeArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, default_value = "out/gallery")]
    out: PathBuf,
    /// Promote irregular fixture grids to rectilinear when spacing is uniform
    /// within this relative tolerance
    #[arg(long)]
    promote_tol: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct KernelArgs {
    #[arg(long, default_value = "weighted")]
    mode: ResamplingMode,
    #[arg(long, default_value_t = OFFSET_TOLERANCE)]
    offset_tol: f64,
    #[arg(long, default_value_t = ACCUM_TOLERANCE)]
    accum_tol: f64,
}

#[derive(Args, Debug, Clone)]
struct TransformArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, allow_hyphen_values = true)]
    scale_x: f64,
    #[arg(long, allow_hyphen_values = true)]
    offset_x: f64,
    #[arg(long, allow_hyphen_values = true)]
    scale_y: f64,
    #[arg(long, allow_hyphen_values = true)]
    offset_y: f64,
}

#[derive(Args, Debug, Clone)]
struct ResampleArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    kernel: KernelArgs,
    #[arg(long, required = true)]
    input: PathBuf,
    /// Band fixture whose grid is the resampling target
    #[arg(long, required = true)]
    target: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct CompositeArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    kernel: KernelArgs,
    #[arg(long, required = true)]
    red: PathBuf,
    #[arg(long, required = true)]
    green: PathBuf,
    #[arg(long, required = true)]
    blue: PathBuf,
    /// Band fixture whose grid is the composite target (default: red grid)
    #[arg(long)]
    target: Option<PathBuf>,
    /// Channel name suffix (default: per-run counter)
    #[arg(long)]
    label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GridDto {
    Rectilinear {
        first_x: f64,
        last_x: f64,
        length_x: usize,
        first_y: f64,
        last_y: f64,
        length_y: usize,
    },
    Irregular {
        x: Vec<f64>,
        y: Vec<f64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TransformDto {
    scale_x: f64,
    offset_x: f64,
    scale_y: f64,
    offset_y: f64,
}

/// Input band: samples inline (`null` = missing) or from a grayscale PNG
/// next to the fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BandFixture {
    name: String,
    grid: GridDto,
    #[serde(default)]
    samples: Option<Vec<Option<f32>>>,
    #[serde(default)]
    png: Option<PathBuf>,
    #[serde(default)]
    fill_value: Option<f32>,
    #[serde(default)]
    transform: Option<TransformDto>,
}

#[derive(Debug, Clone, Serialize)]
struct ChannelDto {
    name: String,
    samples: Vec<Option<f32>>,
}

#[derive(Debug, Clone, Serialize)]
struct FieldDto {
    grid: GridDto,
    channels: Vec<ChannelDto>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaTransform {
    scale_x: f64,
    offset_x: f64,
    scale_y: f64,
    offset_y: f64,
    buffers_shared: bool,
}

#[derive(Debug, Clone, Serialize)]
struct MetaResample {
    mode: String,
    path: String,
    offset_tol: f64,
    accum_tol: f64,
    valid_in: usize,
    valid_out: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaComposite {
    mode: String,
    paths: [String; 3],
    channel_names: Vec<String>,
    masked_pixels: usize,
    nan_rule: &'static str,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Transform(args) => run_transform(args),
        Command::Resample(args) => run_resample(args),
        Command::Composite(args) => run_composite(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fg_resample=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_transform(args: TransformArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "transform")?;
    let fixture: BandFixture = read_json(&args.input)?;
    if fixture.transform.is_some() {
        warn!(
            band = %fixture.name,
            "fixture transform ignored, using command line parameters"
        );
    }
    let band = load_band(&args.input, &fixture, &args.common, false)?;

    let transform = DomainTransform::new(args.scale_x, args.offset_x, args.scale_y, args.offset_y);
    let out = transform
        .apply(&band)
        .with_context(|| format!("transforming band '{}'", fixture.name))?;

    write_json(case_dir.join("result.json"), &field_dto(&out))?;
    write_json(
        case_dir.join("meta.json"),
        &MetaTransform {
            scale_x: args.scale_x,
            offset_x: args.offset_x,
            scale_y: args.scale_y,
            offset_y: args.offset_y,
            buffers_shared: out.channels()[0].shares_samples_with(&band.channels()[0]),
        },
    )?;

    info!(out = %case_dir.display(), "transform written");
    Ok(())
}

fn run_resample(args: ResampleArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "resample")?;
    let band = load_fixture(&args.input, &args.common)?;
    let target = load_fixture(&args.target, &args.common)?;
    let target_grid = *target
        .grid()
        .with_context(|| format!("target grid from {}", args.target.display()))?;

    let resampler = resampler_from(&args.kernel);
    let path = resampler
        .path(&band, &target_grid)
        .with_context(|| format!("selecting path for {}", args.input.display()))?;
    let out = resampler
        .resample(&band, &target_grid)
        .with_context(|| format!("resampling {}", args.input.display()))?;

    write_json(case_dir.join("result.json"), &field_dto(&out))?;
    for ch in out.channels() {
        write_csv(case_dir.join(format!("{}.csv", ch.name())), ch.samples())?;
    }
    write_json(
        case_dir.join("meta.json"),
        &MetaResample {
            mode: resampler.mode.to_string(),
            path: format!("{path:?}"),
            offset_tol: resampler.tolerances.offset,
            accum_tol: resampler.tolerances.accum,
            valid_in: count_valid(&band),
            valid_out: count_valid(&out),
        },
    )?;

    info!(?path, out = %case_dir.display(), "resample written");
    Ok(())
}

fn run_composite(args: CompositeArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "composite")?;
    let red = load_fixture(&args.red, &args.common)?;
    let green = load_fixture(&args.green, &args.common)?;
    let blue = load_fixture(&args.blue, &args.common)?;

    let target = match &args.target {
        Some(path) => {
            let field = load_fixture(path, &args.common)?;
            Some(
                *field
                    .grid()
                    .with_context(|| format!("target grid from {}", path.display()))?,
            )
        }
        None => None,
    };

    let compositor = Compositor::new(resampler_from(&args.kernel));
    let target_grid = match target {
        Some(g) => g,
        None => *red.grid().context("red band grid")?,
    };
    let mut paths = [String::new(), String::new(), String::new()];
    for (slot, band) in paths.iter_mut().zip([&red, &green, &blue]) {
        let path = compositor
            .resampler()
            .path(band, &target_grid)
            .context("selecting band path")?;
        *slot = format!("{path:?}");
    }

    let rgb = match &args.label {
        Some(label) => compositor.composite_labeled(&red, &green, &blue, target.as_ref(), label),
        None => compositor.composite(&red, &green, &blue, target.as_ref()),
    }
    .context("compositing bands")?;

    let masked = rgb.len() - count_valid_pixels(&rgb);
    info!(masked, pixels = rgb.len(), "composite built");

    write_json(case_dir.join("result.json"), &field_dto(&rgb))?;
    for ch in rgb.channels() {
        write_csv(case_dir.join(format!("{}.csv", ch.name())), ch.samples())?;
    }
    write_json(
        case_dir.join("meta.json"),
        &MetaComposite {
            mode: compositor.resampler().mode.to_string(),
            paths,
            channel_names: rgb.channels().iter().map(|c| c.name().to_owned()).collect(),
            masked_pixels: masked,
            nan_rule: "pixel is NaN in all channels if NaN in any band",
        },
    )?;

    Ok(())
}

fn resampler_from(kernel: &KernelArgs) -> GridResampler {
    GridResampler::new(kernel.mode).with_tolerances(Tolerances {
        offset: kernel.offset_tol,
        accum: kernel.accum_tol,
    })
}

fn prepare_case(common: &CommonArgs, case_name: &str) -> Result<PathBuf> {
    let case_dir = common.out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

/// Loads a fixture and applies its own domain transform, if any.
fn load_fixture(path: &Path, common: &CommonArgs) -> Result<BandField> {
    let fixture: BandFixture = read_json(path)?;
    load_band(path, &fixture, common, true)
}

fn load_band(
    path: &Path,
    fixture: &BandFixture,
    common: &CommonArgs,
    apply_transform: bool,
) -> Result<BandField> {
    let mut domain = match &fixture.grid {
        GridDto::Rectilinear {
            first_x,
            last_x,
            length_x,
            first_y,
            last_y,
            length_y,
        } => Domain::Rectilinear(
            RectilinearGrid::new(*first_x, *last_x, *length_x, *first_y, *last_y, *length_y)
                .with_context(|| format!("grid of {}", path.display()))?,
        ),
        GridDto::Irregular { x, y } => Domain::Irregular(
            IrregularGrid::new(x.clone(), y.clone())
                .with_context(|| format!("grid of {}", path.display()))?,
        ),
    };

    if let Some(tol) = common.promote_tol
        && let Domain::Irregular(g) = &domain
    {
        let promoted = g
            .to_rectilinear(tol)
            .with_context(|| format!("promoting grid of {}", path.display()))?;
        domain = Domain::Rectilinear(promoted);
    }

    let mut samples = match (&fixture.samples, &fixture.png) {
        (Some(values), None) => values.iter().map(|v| v.unwrap_or(f32::NAN)).collect(),
        (None, Some(png)) => {
            let png_path = path.parent().unwrap_or(Path::new(".")).join(png);
            load_png_samples(&png_path)?
        }
        (Some(_), Some(_)) => bail!(
            "fixture {} sets both 'samples' and 'png'.",
            path.display()
        ),
        (None, None) => bail!(
            "fixture {} needs either 'samples' or 'png'.",
            path.display()
        ),
    };

    if let Some(fill) = fixture.fill_value {
        for v in samples.iter_mut().filter(|v| **v == fill) {
            *v = f32::NAN;
        }
    }

    let band = BandField::with_domain(domain, vec![Channel::new(&fixture.name, samples)])
        .with_context(|| format!("constructing band field from {}", path.display()))?;

    match fixture.transform {
        Some(t) if apply_transform => {
            DomainTransform::new(t.scale_x, t.offset_x, t.scale_y, t.offset_y)
                .apply(&band)
                .with_context(|| format!("applying fixture transform of {}", path.display()))
        }
        _ => Ok(band),
    }
}

fn load_png_samples(path: &Path) -> Result<Vec<f32>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening band image {}", path.display()))?;
    Ok(luma_samples(&dyn_img))
}

/// Grayscale samples at the image's native scale: 8-bit images stay in
/// `0..=255`, so a fixture's `fill_value` is given in the same units as
/// the pixel values. Everything else is read as 16-bit luma.
fn luma_samples(img: &DynamicImage) -> Vec<f32> {
    match img {
        DynamicImage::ImageLuma8(luma) => luma.as_raw().iter().map(|&v| f32::from(v)).collect(),
        other => other.to_luma16().into_raw().into_iter().map(f32::from).collect(),
    }
}

fn field_dto(field: &BandField) -> FieldDto {
    let grid = match field.domain() {
        Domain::Rectilinear(g) => GridDto::Rectilinear {
            first_x: g.first_x(),
            last_x: g.last_x(),
            length_x: g.length_x(),
            first_y: g.first_y(),
            last_y: g.last_y(),
            length_y: g.length_y(),
        },
        Domain::Irregular(g) => GridDto::Irregular {
            x: g.x().to_vec(),
            y: g.y().to_vec(),
        },
    };

    let channels = field
        .channels()
        .iter()
        .map(|ch| ChannelDto {
            name: ch.name().to_owned(),
            samples: ch
                .samples()
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect(),
        })
        .collect();

    FieldDto { grid, channels }
}

fn count_valid(field: &BandField) -> usize {
    field
        .channels()
        .iter()
        .map(|ch| ch.samples().iter().filter(|v| !v.is_nan()).count())
        .sum()
}

fn count_valid_pixels(field: &BandField) -> usize {
    (0..field.len())
        .filter(|&k| field.channels().iter().all(|ch| !ch.samples()[k].is_nan()))
        .count()
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.is_file() {
        bail!("fixture file does not exist: {}", path.display());
    }
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn write_csv(path: PathBuf, values: &[f32]) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "index,value").context("writing csv header")?;
    for (i, v) in values.iter().enumerate() {
        writeln!(file, "{i},{v}").context("writing csv row")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

    use super::luma_samples;

    #[test]
    fn eight_bit_png_keeps_native_scale() {
        let img = GrayImage::from_raw(2, 1, vec![0, 255]).expect("valid image");
        assert_eq!(luma_samples(&DynamicImage::ImageLuma8(img)), vec![0.0, 255.0]);
    }

    #[test]
    fn sixteen_bit_png_is_read_as_is() {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(2, 1, vec![7, 4095]).expect("valid image");
        assert_eq!(luma_samples(&DynamicImage::ImageLuma16(img)), vec![7.0, 4095.0]);
    }
}
