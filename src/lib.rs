//! # qrlogo
//!
//! Generates SVG QR codes with an SVG logo composited into the center.
//!
//! `qrlogo` encodes a URL at error correction level High, renders every dark
//! module as a square and leaves a circular hole in the middle. The logo is
//! scaled so its width fills that hole, centered, and its elements are moved
//! into the output document. Level High recovers about 30% of damaged
//! codewords, which is what keeps the code readable with a hole in it.
//!
//! ## Features
//!
//! - Encode a URL given literally or read from a file.
//! - Carve a circular exclusion zone sized in pixels (4 modules by default).
//! - Place logos sized by `viewBox` or by `width`/`height` with units.
//! - Write a well-formed SVG 1.1 document, atomically.
//! - Optionally write the plain QR code next to it for comparison.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use qrlogo::{composite, Config, LogSink};
//!
//! let written = composite(
//!     Path::new("octocat.svg"),
//!     "https://github.com/",
//!     None,
//!     &Config::default(),
//!     &LogSink,
//! ).expect("Failed to write QR code");
//! println!("{}", written.display());
//! ```
//!
//! ## Modules
//!
//! - [`geometry`]: Distance and exclusion zone tests.
//! - [`matrix`]: URL encoding into a square module grid.
//! - [`render`]: Module grid to squares.
//! - [`logo`]: Logo bounds and placement transform.
//! - [`svg`]: Owned SVG tree, parser and writer.
//! - [`compose`]: Output document assembly.
//! - [`helper`]: The end-to-end pipeline.

pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod helper;
pub mod logo;
pub mod matrix;
pub mod render;
pub mod svg;

pub use config::Config;
pub use diagnostics::{DiagnosticSink, LogSink, NoopSink};
pub use error::{Error, Result};
pub use helper::{composite, composite_modules, default_output_path, resolve_url};
