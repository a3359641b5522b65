//! Geometry helpers for drawing images and video frames onto a 2D surface.
//!
//! Pure computation: no pixel operations, no allocations, `no_std`
//! compatible. The caller owns the surface, the media and the frame
//! callback; this crate only computes what to draw and when.
//!
//! # Modules
//!
//! - [`fit`] — Aspect-fit center-crop from a source onto a fixed destination
//! - [`angle`] — Degree/radian conversion
//! - [`pacing`] — Frame-rate throttling and rate reporting
//! - [`error`] — The crate error type

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

pub mod angle;
pub mod error;
pub mod fit;
pub mod pacing;

pub use angle::{degrees_to_radians, radians_to_degrees};
pub use error::{Error, Result};
pub use fit::{AspectFit, CropMap, Gravity, PixelRect, Rect2D, Region, compute_aspect_fit_crop};
pub use pacing::{FrameDecision, FrameLoop, FramePacer, RateCounter, RateReport};
