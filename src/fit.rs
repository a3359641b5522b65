//! Aspect-fit region computation for drawing media onto a fixed surface.
//!
//! Crops the source to the destination's aspect ratio and maps the crop
//! onto the full destination. The destination is never letterboxed and the
//! source is never scaled non-uniformly. Pure geometry, no allocations,
//! `no_std` compatible.
//!
//! # Example
//!
//! ```
//! use canvasfit::compute_aspect_fit_crop;
//!
//! let crop = compute_aspect_fit_crop(210.0, 90.0, 320.0, 180.0).unwrap();
//!
//! // 210×90 is wider than 16:9, so 25 px are trimmed from each side.
//! assert_eq!(crop.source_x, 25.0);
//! assert_eq!(crop.source_width, 160.0);
//! assert_eq!((crop.dest_width, crop.dest_height), (320.0, 180.0));
//! ```

use core::cmp::Ordering;

use num_traits::Float;

use crate::error::{Error, Result, positive};

/// Relative tolerance used when deciding whether two aspect ratios match.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Width × height of a source medium or destination surface.
///
/// Both sides are strictly positive and finite; [`Rect2D::new`] refuses
/// anything else.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect2D {
    pub width: f64,
    pub height: f64,
}

impl Rect2D {
    /// Create a rectangle, failing on non-positive or non-finite sides.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        Ok(Self {
            width: positive("width", width)?,
            height: positive("height", height)?,
        })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Where the crop window sits along the cropped axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gravity {
    /// Trim equal margins from both ends.
    #[default]
    Center,
    /// Position by fraction. `(0.0, 0.0)` = top-left, `(1.0, 1.0)` = bottom-right.
    Percentage(f64, f64),
}

impl Gravity {
    fn fraction(&self, horizontal: bool) -> f64 {
        match *self {
            Self::Center => 0.5,
            Self::Percentage(x, y) => {
                let pct = if horizontal { x } else { y };
                // NaN clamps to NaN, treat it as centered.
                if pct.is_nan() { 0.5 } else { pct.clamp(0.0, 1.0) }
            }
        }
    }
}

/// Axis-aligned rectangle in surface coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// Snap to whole pixels inside `(0, 0, max_w, max_h)`.
    ///
    /// Edges are rounded independently so adjacent regions stay adjacent,
    /// then clamped to the bounds. A region that misses the bounds snaps to
    /// an empty rect on the nearest edge.
    pub fn to_pixels(&self, max_w: u32, max_h: u32) -> PixelRect {
        let (x, width) = snap_span(self.x, self.width, max_w);
        let (y, height) = snap_span(self.y, self.height, max_h);
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Start and length of `[start, start + len)` in whole pixels of `0..=max`.
fn snap_span(start: f64, len: f64, max: u32) -> (u32, u32) {
    let lo = round_px(start).min(max);
    let hi = round_px(start + len).clamp(lo, max);
    (lo, hi - lo)
}

fn round_px(v: f64) -> u32 {
    // `as` saturates: negative and NaN become 0, overflow becomes u32::MAX.
    Float::round(v) as u32
}

/// Pixel-aligned part of an image, as passed to a blit or a decoder crop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column.
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row.
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// No pixels selected. A crop thinner than half a pixel snaps to this.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether every pixel of a `width × height` image is selected.
    pub const fn covers(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// Source sub-rectangle paired with the destination rectangle it maps onto.
///
/// Field order matches the nine-argument form of a 2D drawing primitive
/// (image, then source rect, then destination rect).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropMap {
    pub source_x: f64,
    pub source_y: f64,
    pub source_width: f64,
    pub source_height: f64,
    pub dest_x: f64,
    pub dest_y: f64,
    pub dest_width: f64,
    pub dest_height: f64,
}

impl CropMap {
    /// The part of the source that is drawn.
    pub fn source_region(&self) -> Region {
        Region {
            x: self.source_x,
            y: self.source_y,
            width: self.source_width,
            height: self.source_height,
        }
    }

    /// Where the source region lands. Always the whole destination.
    pub fn dest_region(&self) -> Region {
        Region {
            x: self.dest_x,
            y: self.dest_y,
            width: self.dest_width,
            height: self.dest_height,
        }
    }

    /// Whether any part of a `source_width × source_height` source is cut away.
    pub fn needs_crop(&self, source_width: f64, source_height: f64) -> bool {
        self.source_width < source_width || self.source_height < source_height
    }

    /// Uniform scale factor from source region to destination.
    pub fn scale(&self) -> f64 {
        self.dest_width / self.source_width
    }

    /// The eight values in drawing-primitive order:
    /// `sx, sy, sw, sh, dx, dy, dw, dh`.
    pub fn to_draw_args(&self) -> [f64; 8] {
        [
            self.source_x,
            self.source_y,
            self.source_width,
            self.source_height,
            self.dest_x,
            self.dest_y,
            self.dest_width,
            self.dest_height,
        ]
    }

    /// Source region snapped to whole pixels of a `source_w × source_h` image.
    pub fn source_pixels(&self, source_w: u32, source_h: u32) -> PixelRect {
        self.source_region().to_pixels(source_w, source_h)
    }
}

/// Aspect-fit configuration for one destination surface.
///
/// # Example
///
/// ```
/// use canvasfit::{AspectFit, Gravity};
///
/// let crop = AspectFit::new(200.0, 100.0)
///     .unwrap()
///     .gravity(Gravity::Percentage(0.5, 0.0))
///     .compute(100.0, 200.0)
///     .unwrap();
///
/// // Taller source keeps its top edge.
/// assert_eq!((crop.source_y, crop.source_height), (0.0, 50.0));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AspectFit {
    pub display: Rect2D,
    pub gravity: Gravity,
    pub tolerance: f64,
}

impl AspectFit {
    /// Fit into a `display_width × display_height` destination.
    pub fn new(display_width: f64, display_height: f64) -> Result<Self> {
        Ok(Self::from_rect(Rect2D {
            width: positive("display_width", display_width)?,
            height: positive("display_height", display_height)?,
        }))
    }

    /// Fit into an already validated destination.
    pub fn from_rect(display: Rect2D) -> Self {
        Self {
            display,
            gravity: Gravity::Center,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Set gravity for crop positioning.
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the relative tolerance for treating aspect ratios as equal.
    ///
    /// Zero requires bit-exact ratios. Negative or non-finite values are
    /// rejected when computing.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Compute the crop for a `source_width × source_height` medium.
    pub fn compute(&self, source_width: f64, source_height: f64) -> Result<CropMap> {
        let source = Rect2D {
            width: positive("source_width", source_width)?,
            height: positive("source_height", source_height)?,
        };
        self.compute_rect(source)
    }

    /// Compute the crop for an already validated source rectangle.
    pub fn compute_rect(&self, source: Rect2D) -> Result<CropMap> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::InvalidArgument {
                argument: "tolerance",
                value: self.tolerance,
            });
        }
        // Public fields may bypass the constructors.
        positive("display_width", self.display.width)?;
        positive("display_height", self.display.height)?;
        positive("source_width", source.width)?;
        positive("source_height", source.height)?;

        let source_aspect = finite_aspect("source aspect ratio", &source)?;
        let display_aspect = finite_aspect("display aspect ratio", &self.display)?;

        let collapsed = || Error::InvalidArgument {
            argument: "display aspect ratio",
            value: display_aspect,
        };

        // Each arm yields the trimmed amount and the kept extent on one axis.
        let ((width_diff, crop_width), (height_diff, crop_height)) =
            match compare_aspect(source_aspect, display_aspect, self.tolerance) {
                Ordering::Greater => {
                    // Source is wider: keep full height, trim width.
                    let correct_width = scaled_side(
                        source.height,
                        self.display.width,
                        self.display.height,
                        display_aspect * source.height,
                    )
                    .ok_or_else(collapsed)?
                    .min(source.width);
                    ((source.width - correct_width, correct_width), (0.0, source.height))
                }
                Ordering::Less => {
                    // Source is taller: keep full width, trim height.
                    let correct_height = scaled_side(
                        source.width,
                        self.display.height,
                        self.display.width,
                        source.width / display_aspect,
                    )
                    .ok_or_else(collapsed)?
                    .min(source.height);
                    ((0.0, source.width), (source.height - correct_height, correct_height))
                }
                Ordering::Equal => ((0.0, source.width), (0.0, source.height)),
            };

        // The kept extent is used as is: `source - diff` cancels to zero when
        // the trim dwarfs what is kept. Computed sides were checked above, so
        // only a subnormal source side can fail here.
        if !crop_width.is_normal() {
            return Err(Error::InvalidArgument {
                argument: "source_width",
                value: source.width,
            });
        }
        if !crop_height.is_normal() {
            return Err(Error::InvalidArgument {
                argument: "source_height",
                value: source.height,
            });
        }

        let crop = CropMap {
            source_x: width_diff * self.gravity.fraction(true),
            source_y: height_diff * self.gravity.fraction(false),
            source_width: crop_width,
            source_height: crop_height,
            dest_x: 0.0,
            dest_y: 0.0,
            dest_width: self.display.width,
            dest_height: self.display.height,
        };

        log::trace!(
            "aspect fit {}x{} -> {}x{}: source ({}, {}, {}, {})",
            source.width,
            source.height,
            self.display.width,
            self.display.height,
            crop.source_x,
            crop.source_y,
            crop.source_width,
            crop.source_height,
        );
        Ok(crop)
    }
}

/// Compute the centered crop that draws a source onto a destination
/// without distortion or letterboxing.
///
/// All four dimensions must be positive and finite.
pub fn compute_aspect_fit_crop(
    source_width: f64,
    source_height: f64,
    display_width: f64,
    display_height: f64,
) -> Result<CropMap> {
    AspectFit::new(display_width, display_height)?.compute(source_width, source_height)
}

// ============================================================================
// Internal geometry
// ============================================================================

/// `side * num / den`, exact for integer-valued inputs. Uses `fallback`
/// when the product or quotient leaves the normal range, and `None` when
/// the fallback does too.
fn scaled_side(side: f64, num: f64, den: f64, fallback: f64) -> Option<f64> {
    let product = side * num;
    let exact = product / den;
    if product.is_normal() && exact.is_normal() {
        Some(exact)
    } else if fallback.is_normal() {
        Some(fallback)
    } else {
        None
    }
}

fn finite_aspect(argument: &'static str, rect: &Rect2D) -> Result<f64> {
    positive(argument, rect.aspect_ratio())
}

/// Three-way aspect comparison. Ratios within `tolerance` of each other,
/// relative to the larger one, compare as equal.
fn compare_aspect(source: f64, display: f64, tolerance: f64) -> Ordering {
    if Float::abs(source - display) <= tolerance * source.max(display) {
        Ordering::Equal
    } else if source > display {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}
