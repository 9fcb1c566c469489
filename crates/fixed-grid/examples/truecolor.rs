//! Example: true-color style composite from mixed-resolution imager bands.
//!
//! Builds three synthetic bands in fixed-grid counts: a 0.5 km red band and
//! two 1 km bands. Each band is moved into view-angle radians with its own
//! scale/offset, then all three are composited onto the 1 km grid. The red
//! band lands exactly half a fine step into each coarse cell, so it takes the
//! 2x integer path.
//!
//! A JSON summary is written to stdout or to `--out`.
//!
//! Run from the workspace root:
//!   cargo run -p fixed-grid --example truecolor -- --help

use std::num::NonZeroUsize;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use fixed_grid::{
    BandField, Compositor, DomainTransform, GridResampler, RectilinearGrid, ResamplingMode,
    minmax,
};
use serde::Serialize;

// Per-resolution x/y scale factors and offsets in radians.
const KM1_X: (f64, f64) = (2.8e-5, -0.151858);
const KM1_Y: (f64, f64) = (-2.8e-5, 0.151858);
const KM05_X: (f64, f64) = (1.4e-5, -0.151865);
const KM05_Y: (f64, f64) = (-1.4e-5, 0.151865);

#[derive(Parser, Debug)]
#[command(about = "Composite synthetic 0.5 km and 1 km bands onto the 1 km grid")]
struct Args {
    /// Width and height of the 1 km bands, in pixels
    #[arg(long, default_value = "256")]
    size: NonZeroUsize,

    /// Resampling mode: nearest or weighted
    #[arg(long, default_value = "weighted")]
    mode: ResamplingMode,

    /// Fraction of the red band's last rows blanked to NaN (simulated edge of scan)
    #[arg(long, default_value_t = 0.1)]
    blank_frac: f64,

    /// Output JSON path (default: stdout)
    #[arg(long)]
    out: Option<String>,
}

#[derive(Serialize)]
struct ChannelSummary {
    name: String,
    valid: usize,
    min: f32,
    max: f32,
}

#[derive(Serialize)]
struct Summary {
    mode: String,
    red_path: String,
    width: usize,
    height: usize,
    elapsed_ms: f64,
    channels: Vec<ChannelSummary>,
}

fn counts_band(
    name: &str,
    size: NonZeroUsize,
    x: (f64, f64),
    y: (f64, f64),
) -> Result<BandField> {
    let size = size.get();
    let grid = RectilinearGrid::new(0.0, (size - 1) as f64, size, 0.0, (size - 1) as f64, size)
        .context("building count grid")?;
    let samples = (0..size * size)
        .map(|k| {
            let (col, row) = ((k % size) as f32, (k / size) as f32);
            (col * 0.37 + row * 0.11).sin() * 0.5 + 0.5
        })
        .collect();
    let band = BandField::single(grid, name, samples).context("building band")?;

    DomainTransform::new(x.0, x.1, y.0, y.1)
        .apply(&band)
        .with_context(|| format!("transforming {name} to view angles"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let fine = NonZeroUsize::new(args.size.get() * 2).context("fine band size")?;
    let mut red = counts_band("band02", fine, KM05_X, KM05_Y)?;
    let green = counts_band("band03", args.size, KM1_X, KM1_Y)?;
    let blue = counts_band("band01", args.size, KM1_X, KM1_Y)?;

    let fine = fine.get();
    let blank_rows = ((fine as f64) * args.blank_frac).round() as usize;
    if let Some(ch) = red.channel_mut(0) {
        let samples = ch.make_mut();
        let start = fine.saturating_sub(blank_rows) * fine;
        samples[start..].fill(f32::NAN);
    }

    let target = *green.grid().context("green band grid")?;
    let resampler = GridResampler::new(args.mode);
    let red_path = resampler.path(&red, &target).context("selecting red path")?;

    let compositor = Compositor::new(resampler);
    let start = Instant::now();
    let rgb = compositor
        .composite(&red, &green, &blue, Some(&target))
        .context("compositing bands")?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    let channels = rgb
        .channels()
        .iter()
        .map(|ch| {
            let mm = minmax(ch.samples());
            ChannelSummary {
                name: ch.name().to_owned(),
                valid: ch.samples().iter().filter(|v| !v.is_nan()).count(),
                min: mm.min,
                max: mm.max,
            }
        })
        .collect();

    let summary = Summary {
        mode: args.mode.to_string(),
        red_path: format!("{red_path:?}"),
        width: target.length_x(),
        height: target.length_y(),
        elapsed_ms,
        channels,
    };

    match args.out {
        Some(path) => {
            let file = std::fs::File::create(&path).with_context(|| format!("creating {path}"))?;
            serde_json::to_writer_pretty(file, &summary)
                .with_context(|| format!("writing JSON to {path}"))?;
            println!("summary written to {path}");
        }
        None => {
            let text = serde_json::to_string_pretty(&summary).context("serializing summary")?;
            println!("{text}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn zero_size_is_rejected() {
        assert!(Args::try_parse_from(["truecolor", "--size", "0"]).is_err());
        let args = Args::try_parse_from(["truecolor", "--size", "1"]).expect("valid args");
        assert_eq!(args.size.get(), 1);
    }
}
