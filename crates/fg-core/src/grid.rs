use crate::Error;

/// One uniformly sampled axis: `length` samples from `first` to `last`
/// inclusive.
///
/// `first > last` is allowed and gives a negative step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    first: f64,
    last: f64,
    length: usize,
}

impl Axis {
    pub fn new(first: f64, last: f64, length: usize) -> Result<Self, Error> {
        Self::checked(first, last, length, 'x')
    }

    pub(crate) fn checked(first: f64, last: f64, length: usize, axis: char) -> Result<Self, Error> {
        if length < 2 || !first.is_finite() || !last.is_finite() || first == last {
            return Err(Error::DegenerateAxis { axis });
        }
        Ok(Self {
            first,
            last,
            length,
        })
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn step(&self) -> f64 {
        (self.last - self.first) / (self.length - 1) as f64
    }

    /// Lower and upper coordinate bounds regardless of axis direction.
    pub fn bounds(&self) -> (f64, f64) {
        (self.first.min(self.last), self.first.max(self.last))
    }

    pub fn coordinate(&self, i: usize) -> f64 {
        self.first + i as f64 * self.step()
    }
}

/// Axis-aligned 2D sampling grid, row-major with X varying fastest.
///
/// Equality is exact value equality of all six defining fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectilinearGrid {
    x: Axis,
    y: Axis,
}

impl RectilinearGrid {
    pub fn new(
        first_x: f64,
        last_x: f64,
        length_x: usize,
        first_y: f64,
        last_y: f64,
        length_y: usize,
    ) -> Result<Self, Error> {
        Ok(Self {
            x: Axis::checked(first_x, last_x, length_x, 'x')?,
            y: Axis::checked(first_y, last_y, length_y, 'y')?,
        })
    }

    pub fn from_axes(x: Axis, y: Axis) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> &Axis {
        &self.x
    }

    pub fn y(&self) -> &Axis {
        &self.y
    }

    pub fn first_x(&self) -> f64 {
        self.x.first
    }

    pub fn last_x(&self) -> f64 {
        self.x.last
    }

    pub fn length_x(&self) -> usize {
        self.x.length
    }

    pub fn step_x(&self) -> f64 {
        self.x.step()
    }

    pub fn first_y(&self) -> f64 {
        self.y.first
    }

    pub fn last_y(&self) -> f64 {
        self.y.last
    }

    pub fn length_y(&self) -> usize {
        self.y.length
    }

    pub fn step_y(&self) -> f64 {
        self.y.step()
    }

    /// Number of samples, `length_x * length_y`.
    pub fn len(&self) -> usize {
        self.x.length * self.y.length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Gridded domain described by explicit per-axis coordinates, which need not
/// be uniformly spaced.
#[derive(Debug, Clone, PartialEq)]
pub struct IrregularGrid {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl IrregularGrid {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, Error> {
        if x.len() < 2 {
            return Err(Error::DegenerateAxis { axis: 'x' });
        }
        if y.len() < 2 {
            return Err(Error::DegenerateAxis { axis: 'y' });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len() * self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Promotes the grid to a [`RectilinearGrid`] when every spacing on both
    /// axes matches the axis mean spacing within `rel_tol * |mean|`.
    pub fn to_rectilinear(&self, rel_tol: f64) -> Result<RectilinearGrid, Error> {
        let x = uniform_axis(&self.x, rel_tol, 'x')?;
        let y = uniform_axis(&self.y, rel_tol, 'y')?;
        Ok(RectilinearGrid { x, y })
    }
}

fn uniform_axis(coords: &[f64], rel_tol: f64, axis: char) -> Result<Axis, Error> {
    let n = coords.len();
    let first = coords[0];
    let last = coords[n - 1];
    let mean = (last - first) / (n - 1) as f64;
    let tol = rel_tol * mean.abs();

    let uniform = coords
        .windows(2)
        .all(|w| ((w[1] - w[0]) - mean).abs() <= tol);
    if !uniform {
        return Err(Error::NotRectilinear);
    }

    Axis::checked(first, last, n, axis)
}

/// Sampling domain of a band field.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Rectilinear(RectilinearGrid),
    Irregular(IrregularGrid),
}

impl Domain {
    pub fn len(&self) -> usize {
        match self {
            Self::Rectilinear(g) => g.len(),
            Self::Irregular(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rectilinear(&self) -> Result<&RectilinearGrid, Error> {
        match self {
            Self::Rectilinear(g) => Ok(g),
            Self::Irregular(_) => Err(Error::NotRectilinear),
        }
    }
}

impl From<RectilinearGrid> for Domain {
    fn from(grid: RectilinearGrid) -> Self {
        Self::Rectilinear(grid)
    }
}

impl From<IrregularGrid> for Domain {
    fn from(grid: IrregularGrid) -> Self {
        Self::Irregular(grid)
    }
}
