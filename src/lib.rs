//! Imgvert converts images between raster encodings and SVG, one
//! self-contained request at a time.
//!
//! The public API is request-oriented:
//!
//! - Build a [`ConversionRequest`] (source bytes, declared media type, target,
//!   quality, scale)
//! - Run it through [`convert`] (or a batch through [`convert_all`])
//! - Consume the returned [`Rendered`] payload
//!
//! SVG output uses an explicit two-way strategy: small images are traced into
//! a grid of filled rects by a fixed-stride pixel sampler; large images embed
//! a compressed raster snapshot instead. See [`VectorStrategy`].
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub mod batch;
pub mod convert;
pub mod trace;
pub mod vector;

pub use crate::foundation::core::Bitmap;
pub use crate::foundation::error::{ImgvertError, ImgvertResult};

pub use crate::batch::convert_all;
pub use crate::convert::{ConversionRequest, EncodeTarget, Rendered, convert};
pub use crate::trace::{SampleGrid, TraceParams, trace_rects};
pub use crate::vector::{VectorOptions, VectorStrategy, minify_markup};
