use std::sync::atomic::{AtomicU64, Ordering};

use fg_core::{BandField, Channel, Error, RectilinearGrid};
use tracing::debug;

use crate::resampler::GridResampler;

/// Merges three single-channel bands into one red/green/blue field.
///
/// Each composite gets channel names `red_<id>`, `green_<id>`, `blue_<id>`.
/// Ids come from a counter owned by the compositor unless the caller
/// supplies a label.
#[derive(Debug, Default)]
pub struct Compositor {
    resampler: GridResampler,
    next_id: AtomicU64,
}

impl Compositor {
    pub fn new(resampler: GridResampler) -> Self {
        Self {
            resampler,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn resampler(&self) -> &GridResampler {
        &self.resampler
    }

    /// Composites onto `target`, or onto the red band's grid when `None`.
    pub fn composite(
        &self,
        red: &BandField,
        green: &BandField,
        blue: &BandField,
        target: Option<&RectilinearGrid>,
    ) -> Result<BandField, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.composite_labeled(red, green, blue, target, &id.to_string())
    }

    pub fn composite_labeled(
        &self,
        red: &BandField,
        green: &BandField,
        blue: &BandField,
        target: Option<&RectilinearGrid>,
        label: &str,
    ) -> Result<BandField, Error> {
        let bands = [red, green, blue];
        let grids = [red.grid()?, green.grid()?, blue.grid()?];
        for band in bands {
            if band.num_channels() != 1 {
                return Err(Error::ChannelCount {
                    expected: 1,
                    actual: band.num_channels(),
                });
            }
        }
        let target = *target.unwrap_or(grids[0]);

        let aligned = grids.iter().all(|g| **g == target);
        debug!(aligned, label, "compositing rgb bands");

        let mut channels = Vec::with_capacity(3);
        for (band, name) in bands.into_iter().zip(["red", "green", "blue"]) {
            let ch = if aligned {
                band.channels()[0].renamed(format!("{name}_{label}"))
            } else {
                let out = self.resampler.resample(band, &target)?;
                out.channels()[0].renamed(format!("{name}_{label}"))
            };
            channels.push(ch);
        }

        mask_partial_pixels(&mut channels);
        BandField::new(target, channels)
    }
}

/// Sets every channel to NaN wherever any channel is NaN.
///
/// Buffers are only copied when a pixel actually changes.
fn mask_partial_pixels(channels: &mut [Channel]) {
    let len = channels.first().map_or(0, |c| c.samples().len());
    let partial: Vec<usize> = (0..len)
        .filter(|&k| {
            let nan = channels.iter().filter(|c| c.samples()[k].is_nan()).count();
            nan > 0 && nan < channels.len()
        })
        .collect();

    if partial.is_empty() {
        return;
    }

    for ch in channels.iter_mut() {
        let samples = ch.make_mut();
        for &k in &partial {
            samples[k] = f32::NAN;
        }
    }
}

/// Composites with a fresh [`Compositor`], so ids restart at 0 on every
/// call and every result is named `red_0`, `green_0`, `blue_0`. Keep one
/// compositor, or use [`Compositor::composite_labeled`], when the names of
/// successive composites must differ.
pub fn composite(
    red: &BandField,
    green: &BandField,
    blue: &BandField,
    target: Option<&RectilinearGrid>,
) -> Result<BandField, Error> {
    Compositor::default().composite(red, green, blue, target)
}

#[cfg(test)]
mod tests {
    use fg_core::{BandField, Channel, Error, RectilinearGrid};

    use super::{Compositor, composite};

    fn band(g: RectilinearGrid, name: &str, samples: Vec<f32>) -> BandField {
        BandField::single(g, name, samples).expect("valid field")
    }

    fn assert_strict_nan(out: &BandField) {
        let ch = out.channels();
        for k in 0..out.len() {
            let nan = ch.iter().filter(|c| c.samples()[k].is_nan()).count();
            assert!(nan == 0 || nan == 3, "pixel {k} is partially valid");
        }
    }

    #[test]
    fn mismatched_resolution_resamples_onto_red_grid() {
        let red_grid = RectilinearGrid::new(0.0, 1.0, 2, 0.0, 1.0, 2).expect("valid grid");
        let fine_grid = RectilinearGrid::new(0.0, 1.0, 4, 0.0, 1.0, 4).expect("valid grid");

        let red = band(red_grid, "b02", vec![1.0, 2.0, 3.0, 4.0]);
        let green = band(fine_grid, "b03", (0..16).map(|v| v as f32).collect());
        let blue = band(fine_grid, "b01", vec![9.0; 16]);

        let out = composite(&red, &green, &blue, None).expect("composite");

        assert_eq!(out.grid(), Ok(&red_grid));
        assert_eq!(out.num_channels(), 3);
        assert!(out.channels().iter().all(|c| c.samples().len() == 4));
        assert_strict_nan(&out);

        // (0, 0) coincides with the first sample of every band
        assert_eq!(out.get(0, 0, 0), Some(1.0));
        assert_eq!(out.get(1, 0, 0), Some(0.0));
        assert_eq!(out.get(2, 0, 0), Some(9.0));

        // the other targets land on the last fine row or column, which
        // cannot anchor a cell, and the NaN spreads to the aliased red band
        for c in out.channels() {
            assert!(c.samples()[1..].iter().all(|v| v.is_nan()), "{}", c.name());
        }
        assert_eq!(red.channels()[0].samples(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn nan_in_one_band_masks_whole_pixel() {
        let g = RectilinearGrid::new(0.0, 2.0, 3, 0.0, 2.0, 3).expect("valid grid");
        let mut r = vec![0.5; 9];
        r[4] = f32::NAN;
        let red = band(g, "r", r);
        let green = band(g, "g", vec![0.25; 9]);
        let blue = band(g, "b", vec![0.75; 9]);

        let out = composite(&red, &green, &blue, None).expect("composite");

        for c in out.channels() {
            assert!(c.samples()[4].is_nan());
        }
        for k in (0..9).filter(|&k| k != 4) {
            assert_eq!(out.get(0, k % 3, k / 3), Some(0.5));
            assert_eq!(out.get(1, k % 3, k / 3), Some(0.25));
            assert_eq!(out.get(2, k % 3, k / 3), Some(0.75));
        }
        // inputs untouched
        assert_eq!(green.channels()[0].samples()[4], 0.25);
        assert_eq!(blue.channels()[0].samples()[4], 0.75);
    }

    #[test]
    fn aligned_bands_without_gaps_are_not_copied() {
        let g = RectilinearGrid::new(0.0, 1.0, 2, 0.0, 1.0, 2).expect("valid grid");
        let red = band(g, "r", vec![1.0; 4]);
        let green = band(g, "g", vec![2.0; 4]);
        let blue = band(g, "b", vec![3.0; 4]);

        let out = composite(&red, &green, &blue, Some(&g)).expect("composite");
        assert!(out.channels()[0].shares_samples_with(&red.channels()[0]));
        assert!(out.channels()[2].shares_samples_with(&blue.channels()[0]));
    }

    #[test]
    fn explicit_target_and_all_nan_pixels() {
        let coarse = RectilinearGrid::new(0.0, 3.0, 4, 0.0, 3.0, 4).expect("valid grid");
        let target = RectilinearGrid::new(0.5, 2.5, 2, 0.5, 2.5, 2).expect("valid grid");
        let red = band(coarse, "r", vec![f32::NAN; 16]);
        let green = band(coarse, "g", vec![1.0; 16]);
        let blue = band(coarse, "b", vec![1.0; 16]);

        let out = composite(&red, &green, &blue, Some(&target)).expect("composite");
        assert_eq!(out.grid(), Ok(&target));
        assert!(
            out.channels()
                .iter()
                .all(|c| c.samples().iter().all(|v| v.is_nan()))
        );
    }

    #[test]
    fn ids_are_minted_per_compositor() {
        let g = RectilinearGrid::new(0.0, 1.0, 2, 0.0, 1.0, 2).expect("valid grid");
        let red = band(g, "r", vec![1.0; 4]);

        let c = Compositor::default();
        let first = c.composite(&red, &red, &red, None).expect("composite");
        let second = c.composite(&red, &red, &red, None).expect("composite");
        assert_eq!(first.channels()[0].name(), "red_0");
        assert_eq!(second.channels()[1].name(), "green_1");

        let labeled = c
            .composite_labeled(&red, &red, &red, None, "truecolor")
            .expect("composite");
        assert_eq!(labeled.channels()[2].name(), "blue_truecolor");

        let other = Compositor::default();
        let fresh = other.composite(&red, &red, &red, None).expect("composite");
        assert_eq!(fresh.channels()[0].name(), "red_0");
    }

    #[test]
    fn free_function_restarts_ids_every_call() {
        let g = RectilinearGrid::new(0.0, 1.0, 2, 0.0, 1.0, 2).expect("valid grid");
        let red = band(g, "r", vec![1.0; 4]);

        let a = composite(&red, &red, &red, None).expect("composite");
        let b = composite(&red, &red, &red, None).expect("composite");
        assert_eq!(a.channels()[0].name(), "red_0");
        assert_eq!(b.channels()[0].name(), "red_0");
    }

    #[test]
    fn multi_channel_input_is_rejected() {
        let g = RectilinearGrid::new(0.0, 1.0, 2, 0.0, 1.0, 2).expect("valid grid");
        let red = band(g, "r", vec![1.0; 4]);
        let two = BandField::new(
            g,
            vec![Channel::new("a", vec![0.0; 4]), Channel::new("b", vec![0.0; 4])],
        )
        .expect("valid field");

        let err = composite(&red, &two, &red, None).unwrap_err();
        assert_eq!(
            err,
            Error::ChannelCount {
                expected: 1,
                actual: 2
            }
        );
    }
}
