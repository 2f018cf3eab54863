//! Logo placement.
//!
//! The logo's intrinsic box is read from its `viewBox`, or from its
//! `width`/`height` attributes, and mapped onto a disk as wide as the
//! exclusion zone in the middle of the canvas.

use std::fmt;

use crate::error::{Error, Result};
use crate::svg::Element;

/// The logo's intrinsic box, in its own user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogoBounds {
    /// Reads the bounds of a logo's `<svg>` element.
    ///
    /// A `viewBox` wins over `width`/`height`. Unit suffixes such as `px` or
    /// `mm` are stripped from `width`/`height`; the origin is then `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogoGeometry`] when neither form is usable or the
    /// width is not positive.
    pub fn from_element(svg: &Element) -> Result<Self> {
        let bounds = match svg.attr("viewBox") {
            Some(view_box) => parse_view_box(view_box).ok_or_else(|| {
                Error::LogoGeometry(format!("viewBox {view_box:?} is not four numbers"))
            })?,
            None => LogoBounds {
                min_x: 0.0,
                min_y: 0.0,
                width: length_attr(svg, "width")?,
                height: length_attr(svg, "height")?,
            },
        };
        bounds.validate()?;
        Ok(bounds)
    }

    fn validate(&self) -> Result<()> {
        let values = [self.min_x, self.min_y, self.width, self.height];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(Error::LogoGeometry(format!("non-finite bounds {self:?}")));
        }
        if self.width <= 0.0 {
            return Err(Error::LogoGeometry(format!(
                "width must be positive, got {}",
                self.width
            )));
        }
        Ok(())
    }
}

/// Parse a viewBox string like "0 0 100 100" or "0,0,100,100".
pub fn parse_view_box(s: &str) -> Option<LogoBounds> {
    let parts: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok())
        .collect::<Option<_>>()?;
    match parts[..] {
        [min_x, min_y, width, height] => Some(LogoBounds {
            min_x,
            min_y,
            width,
            height,
        }),
        _ => None,
    }
}

/// Parse a length such as "200", "200px" or "12.5mm", ignoring the unit.
pub fn parse_length(s: &str) -> Option<f64> {
    s.trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .trim_end()
        .parse()
        .ok()
}

fn length_attr(svg: &Element, name: &str) -> Result<f64> {
    let raw = svg.attr(name).ok_or_else(|| {
        Error::LogoGeometry(format!("logo has neither a viewBox nor a {name} attribute"))
    })?;
    parse_length(raw).ok_or_else(|| Error::LogoGeometry(format!("{name}={raw:?} is not a length")))
}

/// Translation and uniform scale applied to the logo group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Transform {
    /// Scales the logo so its width equals the exclusion diameter and centers
    /// it on a square canvas of side `canvas`.
    ///
    /// The height follows the width, so a logo that is much taller than wide
    /// overflows the exclusion zone. A non-zero view-box origin is cancelled
    /// out, so the visible box is what gets centered.
    pub fn centered(bounds: &LogoBounds, radius: f64, canvas: f64) -> Result<Self> {
        bounds.validate()?;
        let scale = radius * 2.0 / bounds.width;
        Ok(Transform {
            translate_x: (canvas - bounds.width * scale) / 2.0 - bounds.min_x * scale,
            translate_y: (canvas - bounds.height * scale) / 2.0 - bounds.min_y * scale,
            scale,
        })
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({} {}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}
