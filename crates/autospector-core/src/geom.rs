use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the normalized grid the model reports boxes on.
pub const GRID: i64 = 1000;

/// Grid units to percentage of the container (0..=1000 -> 0..=100).
pub fn pct(v: i64) -> f64 {
    v as f64 / 10.0
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoxError {
    #[error("expected 4 box coordinates, got {0}")]
    WrongArity(usize),
    #[error("box coordinates outside the 0..=1000 grid: {0:?}")]
    OutOfRange([i64; 4]),
    #[error("box has no area: {0:?}")]
    Degenerate([i64; 4]),
}

/// A `[ymin, xmin, ymax, xmax]` box on the 1000x1000 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormBox {
    pub ymin: i64,
    pub xmin: i64,
    pub ymax: i64,
    pub xmax: i64,
}

impl NormBox {
    pub const fn new(ymin: i64, xmin: i64, ymax: i64, xmax: i64) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    /// Strict parse: exactly four values, inside the grid, positive area.
    pub fn from_slice(v: &[i64]) -> Result<Self, BoxError> {
        let raw = to_array(v)?;
        if raw.iter().any(|c| !(0..=GRID).contains(c)) {
            return Err(BoxError::OutOfRange(raw));
        }
        Self::with_area(raw)
    }

    /// Clamp every coordinate into the grid, then require positive area.
    pub fn clamped(v: &[i64]) -> Result<Self, BoxError> {
        let raw = to_array(v)?;
        Self::with_area(raw.map(|c| c.clamp(0, GRID)))
    }

    /// Like [`NormBox::clamped`], but also swaps reversed edges.
    /// Returns whether anything had to change.
    pub fn repaired(v: &[i64]) -> Result<(Self, bool), BoxError> {
        let raw = to_array(v)?;
        let c = raw.map(|c| c.clamp(0, GRID));
        let fixed = [
            c[0].min(c[2]),
            c[1].min(c[3]),
            c[0].max(c[2]),
            c[1].max(c[3]),
        ];
        let b = Self::with_area(fixed)?;
        Ok((b, fixed != raw))
    }

    fn with_area(c: [i64; 4]) -> Result<Self, BoxError> {
        if c[0] >= c[2] || c[1] >= c[3] {
            return Err(BoxError::Degenerate(c));
        }
        Ok(Self::new(c[0], c[1], c[2], c[3]))
    }

    pub fn to_array(&self) -> [i64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    pub fn width(&self) -> i64 {
        (self.xmax - self.xmin).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.ymax - self.ymin).max(0)
    }

    pub fn to_percent(&self) -> PercentRect {
        PercentRect {
            top: pct(self.ymin),
            left: pct(self.xmin),
            width: pct(self.width()),
            height: pct(self.height()),
        }
    }
}

fn to_array(v: &[i64]) -> Result<[i64; 4], BoxError> {
    <[i64; 4]>::try_from(v).map_err(|_| BoxError::WrongArity(v.len()))
}

/// Placement as percentages of the container, independent of pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x_pct: f64, y_pct: f64) -> bool {
        x_pct >= self.left && x_pct <= self.right() && y_pct >= self.top && y_pct <= self.bottom()
    }

    /// Resolve against a concrete container of `width` x `height` pixels.
    pub fn to_pixels(&self, width: f64, height: f64) -> PixelRect {
        PixelRect {
            x: self.left / 100.0 * width,
            y: self.top / 100.0 * height,
            width: self.width / 100.0 * width,
            height: self.height / 100.0 * height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
