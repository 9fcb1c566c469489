use crate::Error;
use crate::field::BandField;
use crate::grid::{Axis, Domain, IrregularGrid, RectilinearGrid};

/// Per-axis affine remap `c' = c * scale + offset`, used to bring fixed-grid
/// counts into view-angle radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainTransform {
    pub scale_x: f64,
    pub offset_x: f64,
    pub scale_y: f64,
    pub offset_y: f64,
}

impl DomainTransform {
    pub fn new(scale_x: f64, offset_x: f64, scale_y: f64, offset_y: f64) -> Self {
        Self {
            scale_x,
            offset_x,
            scale_y,
            offset_y,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 1.0, 0.0)
    }

    pub fn apply_grid(&self, grid: &RectilinearGrid) -> Result<RectilinearGrid, Error> {
        let x = Axis::checked(
            grid.first_x() * self.scale_x + self.offset_x,
            grid.last_x() * self.scale_x + self.offset_x,
            grid.length_x(),
            'x',
        )?;
        let y = Axis::checked(
            grid.first_y() * self.scale_y + self.offset_y,
            grid.last_y() * self.scale_y + self.offset_y,
            grid.length_y(),
            'y',
        )?;
        Ok(RectilinearGrid::from_axes(x, y))
    }

    pub fn apply_irregular(&self, grid: &IrregularGrid) -> Result<IrregularGrid, Error> {
        if self.scale_x == 0.0 {
            return Err(Error::DegenerateAxis { axis: 'x' });
        }
        if self.scale_y == 0.0 {
            return Err(Error::DegenerateAxis { axis: 'y' });
        }
        IrregularGrid::new(
            grid.x()
                .iter()
                .map(|c| c * self.scale_x + self.offset_x)
                .collect(),
            grid.y()
                .iter()
                .map(|c| c * self.scale_y + self.offset_y)
                .collect(),
        )
    }

    /// Remaps the domain of `field`. Sample buffers are shared, not copied.
    pub fn apply(&self, field: &BandField) -> Result<BandField, Error> {
        let domain = match field.domain() {
            Domain::Rectilinear(g) => Domain::Rectilinear(self.apply_grid(g)?),
            Domain::Irregular(g) => Domain::Irregular(self.apply_irregular(g)?),
        };
        field.rebind(domain)
    }
}

impl Default for DomainTransform {
    fn default() -> Self {
        Self::identity()
    }
}

pub fn transform(
    field: &BandField,
    scale_x: f64,
    offset_x: f64,
    scale_y: f64,
    offset_y: f64,
) -> Result<BandField, Error> {
    DomainTransform::new(scale_x, offset_x, scale_y, offset_y).apply(field)
}
