use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors produced while building a logo QR code.
///
/// Every variant is fatal: the pipeline aborts on the first one and never
/// leaves a partially written output file behind.
#[derive(Debug, Error)]
pub enum Error {
    /// The encoded matrix is not square.
    #[error("QR code not square: width={width}, height={height}")]
    InputShape { width: u32, height: u32 },

    /// The logo's bounding box is missing, unparseable or has no width.
    #[error("cannot determine logo geometry: {0}")]
    LogoGeometry(String),

    /// The QR encoder rejected the data, usually because it is too long.
    #[error("cannot encode URL as a QR code: {0}")]
    Encode(String),

    #[error("malformed SVG: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed SVG attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("malformed SVG: {0}")]
    MalformedSvg(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
