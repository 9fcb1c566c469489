use std::sync::Arc;

use crate::Error;
use crate::grid::{Domain, IrregularGrid, RectilinearGrid};

/// One named channel of samples, shared by reference count.
///
/// Cloning a channel never copies samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    samples: Arc<Vec<f32>>,
}

impl Channel {
    pub fn new(name: impl Into<String>, samples: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            samples: Arc::new(samples),
        }
    }

    pub fn from_shared(name: impl Into<String>, samples: Arc<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn shared(&self) -> &Arc<Vec<f32>> {
        &self.samples
    }

    /// Copy-on-write access to the samples.
    pub fn make_mut(&mut self) -> &mut Vec<f32> {
        Arc::make_mut(&mut self.samples)
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Arc::clone(&self.samples),
        }
    }

    /// True when both channels point at the same sample buffer.
    pub fn shares_samples_with(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

/// Multi-channel sample field over a gridded domain.
///
/// Samples are row-major, `index = row * length_x + col`. `NaN` marks a
/// missing sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BandField {
    domain: Domain,
    channels: Vec<Channel>,
}

impl BandField {
    pub fn new(grid: RectilinearGrid, channels: Vec<Channel>) -> Result<Self, Error> {
        Self::with_domain(Domain::Rectilinear(grid), channels)
    }

    pub fn single(
        grid: RectilinearGrid,
        name: impl Into<String>,
        samples: Vec<f32>,
    ) -> Result<Self, Error> {
        Self::new(grid, vec![Channel::new(name, samples)])
    }

    pub fn irregular(grid: IrregularGrid, channels: Vec<Channel>) -> Result<Self, Error> {
        Self::with_domain(Domain::Irregular(grid), channels)
    }

    pub fn with_domain(domain: Domain, channels: Vec<Channel>) -> Result<Self, Error> {
        if channels.is_empty() {
            return Err(Error::NoChannels);
        }

        let expected = domain.len();
        for ch in &channels {
            if ch.samples().len() != expected {
                return Err(Error::SizeMismatch {
                    expected,
                    actual: ch.samples().len(),
                });
            }
        }

        Ok(Self { domain, channels })
    }

    /// Field over `grid` with one NaN-filled channel per name.
    pub fn new_nan<S: AsRef<str>>(grid: RectilinearGrid, names: &[S]) -> Result<Self, Error> {
        let len = grid.len();
        let channels = names
            .iter()
            .map(|n| Channel::new(n.as_ref(), vec![f32::NAN; len]))
            .collect();
        Self::new(grid, channels)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn grid(&self) -> Result<&RectilinearGrid, Error> {
        self.domain.rectilinear()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, i: usize) -> Option<&Channel> {
        self.channels.get(i)
    }

    pub fn channel_mut(&mut self, i: usize) -> Option<&mut Channel> {
        self.channels.get_mut(i)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample of channel `ch` at column `x`, row `y` on a rectilinear domain.
    pub fn get(&self, ch: usize, x: usize, y: usize) -> Option<f32> {
        let grid = self.grid().ok()?;
        if x >= grid.length_x() || y >= grid.length_y() {
            return None;
        }
        let channel = self.channels.get(ch)?;
        channel.samples().get(y * grid.length_x() + x).copied()
    }

    pub fn into_channels(self) -> Vec<Channel> {
        self.channels
    }

    /// Same samples over a new domain of the same size.
    pub(crate) fn rebind(&self, domain: Domain) -> Result<Self, Error> {
        Self::with_domain(domain, self.channels.clone())
    }
}
