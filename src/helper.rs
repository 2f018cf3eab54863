use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use log::Level;

use crate::compose::{compose, modules_to_tree};
use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::logo::{LogoBounds, Transform};
use crate::matrix::{encode_url, QrMatrix};
use crate::render::{render_modules, RenderMode};
use crate::svg::{write_svg, Document};

/*---- Utilities ----*/

/// Returns the URL to encode for a command-line argument.
///
/// If `arg` names an existing file, the file's contents are used with
/// trailing whitespace removed; otherwise `arg` itself is the URL.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file exists but cannot be read as UTF-8.
pub fn resolve_url(arg: &str) -> Result<String> {
    let path = Path::new(arg);
    if !path.is_file() {
        return Ok(arg.to_string());
    }
    let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    Ok(content.trim_end().to_string())
}

/// `<logo dir>/<logo stem>-qrcode.svg`.
///
/// # Example
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use qrlogo::helper::default_output_path;
///
/// assert_eq!(
///     default_output_path(Path::new("assets/octocat.svg")),
///     PathBuf::from("assets/octocat-qrcode.svg")
/// );
/// ```
pub fn default_output_path(logo_path: &Path) -> PathBuf {
    logo_path.with_file_name(format!("{}-qrcode.svg", file_prefix(logo_path)))
}

fn file_prefix(logo_path: &Path) -> String {
    logo_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "logo".to_string())
}

/// Writes the QR code without the logo hole, for comparison.
fn write_diagnostic_artifact(matrix: &QrMatrix, logo_path: &Path, config: &Config) -> Result<PathBuf> {
    let dir = config.diagnostic_dir.clone().unwrap_or_else(env::temp_dir);
    let path = dir.join(format!("{}-qrcode-plain.svg", file_prefix(logo_path)));
    let rects = render_modules(matrix, config.module_size, config.radius, RenderMode::Full)?;
    let tree = modules_to_tree(matrix.canvas_size(config.module_size)?, &rects, &config.fill);
    write_svg(&path, &tree)?;
    Ok(path)
}

/*---- Pipeline ----*/

/// Generates an SVG QR code for `url` with the SVG logo at `logo_path` in the middle.
///
/// # Arguments
///
/// * `logo_path` - The SVG logo to place in the center.
/// * `url` - The URL to encode, or the path of a file containing it.
/// * `out_path` - Optional. Where to write the result. If not provided, `<logo stem>-qrcode.svg` next to the logo.
/// * `config` - Module size, exclusion radius and diagnostic options.
/// * `sink` - Receives progress messages.
///
/// # Returns
///
/// The path of the written file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use qrlogo::{composite, Config, NoopSink};
///
/// let written = composite(
///     Path::new("assets/octocat.svg"),
///     "https://github.com/",
///     None,
///     &Config::default(),
///     &NoopSink,
/// ).unwrap();
/// assert_eq!(written, Path::new("assets/octocat-qrcode.svg"));
/// ```
pub fn composite(
    logo_path: &Path,
    url: &str,
    out_path: Option<&Path>,
    config: &Config,
    sink: &dyn DiagnosticSink,
) -> Result<PathBuf> {
    config.validate()?;
    let url = resolve_url(url)?;
    sink.log(
        Level::Debug,
        &format!(
            "generating QR code for logo {} and url {url:?}",
            logo_path.display()
        ),
    );
    let image = encode_url(&url)?;
    composite_modules(logo_path, &image, out_path, config, sink)
}

/// Same as [`composite`], starting from an already encoded one-pixel-per-module image.
///
/// The image is checked for squareness before any file is read or written.
pub fn composite_modules(
    logo_path: &Path,
    image: &GrayImage,
    out_path: Option<&Path>,
    config: &Config,
    sink: &dyn DiagnosticSink,
) -> Result<PathBuf> {
    config.validate()?;
    let matrix = QrMatrix::from_image(image)?;
    let canvas = matrix.canvas_size(config.module_size)?;
    sink.log(
        Level::Debug,
        &format!(
            "QR matrix is {0}x{0} modules, canvas {canvas}px",
            matrix.side()
        ),
    );

    // Best-effort: a failure is reported and the run goes on.
    if config.write_diagnostic_artifact {
        match write_diagnostic_artifact(&matrix, logo_path, config) {
            Ok(path) => sink.log(
                Level::Debug,
                &format!("wrote plain QR code to {}", path.display()),
            ),
            Err(err) => sink.log(
                Level::Warn,
                &format!("could not write plain QR code: {err}"),
            ),
        }
    }

    let rects = render_modules(
        &matrix,
        config.module_size,
        config.radius,
        RenderMode::Exclusion,
    )?;
    sink.log(
        Level::Debug,
        &format!(
            "kept {} of {} dark modules",
            rects.len(),
            matrix.dark_count()
        ),
    );

    let logo = Document::open(logo_path)?.into_svg();
    let bounds = LogoBounds::from_element(&logo)?;
    sink.log(Level::Debug, &format!("logo bounds: {bounds:?}"));
    let transform = Transform::centered(&bounds, config.radius, canvas as f64)?;
    sink.log(Level::Debug, &format!("transform: {transform}"));

    let tree = compose(canvas, &rects, &config.fill, &transform, logo);
    let out_path = match out_path {
        Some(path) => path.to_path_buf(),
        None => default_output_path(logo_path),
    };
    write_svg(&out_path, &tree)?;
    sink.log(
        Level::Info,
        &format!("wrote {}", out_path.display()),
    );
    Ok(out_path)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopSink;
    use crate::svg::PREAMBLE;
    use std::cell::RefCell;

    const LOGO: &str = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="200px" height="200px">
  <circle cx="100" cy="100" r="90" fill="orange"/>
  <text x="50" y="110">QR</text>
</svg>
"#;

    fn write_logo(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn read_written(path: &Path) -> Document {
        let written = fs::read_to_string(path).unwrap();
        assert!(written.starts_with(PREAMBLE));
        Document::parse(&written).unwrap()
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("assets/octocat.svg")),
            PathBuf::from("assets/octocat-qrcode.svg")
        );
        assert_eq!(
            default_output_path(Path::new("octocat.svg")),
            PathBuf::from("octocat-qrcode.svg")
        );
        assert_eq!(
            default_output_path(Path::new("logos/my.logo.svg")),
            PathBuf::from("logos/my.logo-qrcode.svg")
        );
    }

    #[test]
    fn test_resolve_url_literal() {
        let url = "https://example.com/does-not-exist.txt";
        assert_eq!(resolve_url(url).unwrap(), url);
    }

    #[test]
    fn test_resolve_url_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("url.txt");
        fs::write(&path, "https://github.com/\n\n").unwrap();
        let resolved = resolve_url(path.to_str().unwrap()).unwrap();
        assert_eq!(resolved, "https://github.com/");
    }

    #[test]
    fn test_resolve_url_directory_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        let arg = dir.path().to_str().unwrap();
        assert_eq!(resolve_url(arg).unwrap(), arg);
    }

    #[test]
    fn test_composite_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "badge.svg", LOGO);
        let written = composite(&logo, "https://github.com/", None, &Config::default(), &NoopSink).unwrap();
        assert_eq!(written, dir.path().join("badge-qrcode.svg"));

        let doc = read_written(&written);
        let root = doc.root();
        let matrix = QrMatrix::encode("https://github.com/").unwrap();
        let size = (matrix.side() * 10).to_string();
        assert_eq!(root.attr("width"), Some(size.as_str()));
        assert_eq!(root.attr("height"), Some(size.as_str()));

        let expected = render_modules(&matrix, 10, 40.0, RenderMode::Exclusion).unwrap();
        let rects = root.elements().filter(|e| e.name == "rect").count();
        assert_eq!(rects, expected.len());

        let group = root.elements().last().unwrap();
        assert_eq!(group.name, "g");
        let canvas = (matrix.side() * 10) as f64;
        let transform = Transform {
            translate_x: (canvas - 80.0) / 2.0,
            translate_y: (canvas - 80.0) / 2.0,
            scale: 0.4,
        };
        assert_eq!(group.attr("transform"), Some(transform.to_string().as_str()));
        let names: Vec<&str> = group.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["circle", "text"]);
    }

    #[test]
    fn test_composite_url_file_is_encoded_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let url_file = dir.path().join("url.txt");
        fs::write(&url_file, "https://github.com/\n").unwrap();

        let from_file = dir.path().join("from-file.svg");
        let literal = dir.path().join("literal.svg");
        let config = Config::default();
        composite(&logo, url_file.to_str().unwrap(), Some(&from_file), &config, &NoopSink).unwrap();
        composite(&logo, "https://github.com/", Some(&literal), &config, &NoopSink).unwrap();
        assert_eq!(
            fs::read_to_string(&from_file).unwrap(),
            fs::read_to_string(&literal).unwrap()
        );
    }

    #[test]
    fn test_composite_missing_file_path_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let missing = dir.path().join("nope.txt");
        let missing = missing.to_str().unwrap();

        let out_literal = dir.path().join("a.svg");
        let out_other = dir.path().join("b.svg");
        let config = Config::default();
        composite(&logo, missing, Some(&out_literal), &config, &NoopSink).unwrap();
        composite(&logo, "https://github.com/", Some(&out_other), &config, &NoopSink).unwrap();

        let image = encode_url(missing).unwrap();
        let out_expected = dir.path().join("c.svg");
        composite_modules(&logo, &image, Some(&out_expected), &config, &NoopSink).unwrap();
        let literal = fs::read_to_string(&out_literal).unwrap();
        assert_eq!(literal, fs::read_to_string(&out_expected).unwrap());
        assert_ne!(literal, fs::read_to_string(&out_other).unwrap());
    }

    #[test]
    fn test_non_square_matrix_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let out = dir.path().join("out.svg");
        let config = Config::default().with_diagnostic_artifact(Some(dir.path().to_path_buf()));
        let err = composite_modules(&logo, &GrayImage::new(21, 25), Some(&out), &config, &NoopSink)
            .unwrap_err();
        assert!(matches!(err, Error::InputShape { width: 21, height: 25 }));
        assert!(!out.exists());
        assert!(!dir.path().join("logo-qrcode-plain.svg").exists());
    }

    #[test]
    fn test_bad_logo_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", r#"<svg width="0" height="10"><rect/></svg>"#);
        let out = dir.path().join("out.svg");
        let err = composite(&logo, "https://github.com/", Some(&out), &Config::default(), &NoopSink)
            .unwrap_err();
        assert!(matches!(err, Error::LogoGeometry(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_logo_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("absent.svg");
        let err = composite(&logo, "https://github.com/", None, &Config::default(), &NoopSink)
            .unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path, logo),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_diagnostic_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let config = Config::default().with_diagnostic_artifact(Some(dir.path().to_path_buf()));
        let messages = RefCell::new(Vec::new());
        let sink = |level: Level, message: &str| messages.borrow_mut().push((level, message.to_string()));
        composite(&logo, "https://github.com/", None, &config, &sink).unwrap();

        let plain = read_written(&dir.path().join("logo-qrcode-plain.svg"));
        let matrix = QrMatrix::encode("https://github.com/").unwrap();
        assert_eq!(plain.root().elements().count(), matrix.dark_count());
        assert!(plain.root().elements().all(|e| e.name == "rect"));

        let messages = messages.into_inner();
        assert!(messages.iter().any(|(level, m)| *level == Level::Info && m.starts_with("wrote ")));
        assert!(messages.iter().any(|(_, m)| m.starts_with("transform: translate(")));
    }

    #[test]
    fn test_diagnostic_artifact_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let config = Config::default().with_diagnostic_artifact(Some(dir.path().join("missing")));
        let warnings = RefCell::new(0);
        let sink = |level: Level, _: &str| {
            if level == Level::Warn {
                *warnings.borrow_mut() += 1;
            }
        };
        let written = composite(&logo, "https://github.com/", None, &config, &sink).unwrap();
        assert!(written.exists());
        assert_eq!(warnings.into_inner(), 1);
    }

    #[test]
    fn test_custom_module_size() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let config = Config::default().with_module_size(4).with_fill("#0f172a");
        let written = composite(&logo, "HELLO", None, &config, &NoopSink).unwrap();
        let doc = read_written(&written);
        let rect = doc.root().elements().next().unwrap();
        assert_eq!(rect.attr("width"), Some("4"));
        assert_eq!(rect.attr("fill"), Some("#0f172a"));
    }

    #[test]
    fn test_oversized_canvas_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), "logo.svg", LOGO);
        let out = dir.path().join("out.svg");
        let config = Config::default().with_module_size(5_000_000);
        assert!(config.validate().is_ok());
        let err = composite_modules(&logo, &GrayImage::new(1000, 1000), Some(&out), &config, &NoopSink)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_huge_module_size_is_config_error() {
        let config = Config::default().with_module_size(2_000_000_000);
        let err = composite(Path::new("logo.svg"), "https://github.com/", None, &config, &NoopSink)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_config() {
        let config = Config::default().with_module_size(0);
        let err = composite(Path::new("logo.svg"), "x", None, &config, &NoopSink).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
