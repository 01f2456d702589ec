#![forbid(unsafe_code)]

//! PNG/PDF/SVG export of a laid-out schematic.

use crate::render::{ExportRequest, HeadlessError};
use base64::Engine as _;
use std::collections::BTreeMap;
use wirescope_render::svg::escape_xml;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("export scale must be a positive number, got {scale}")]
    InvalidScale { scale: f64 },
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
    #[error("failed to serialize connection counts: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Encoded export output, ready to hand to a download link.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:` URL usable as a download `href`.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

fn export_filename(base: &str, format: ExportFormat) -> String {
    let base = base.trim();
    let base = if base.is_empty() { "schematic" } else { base };
    let ext = format.extension();
    let has_ext = base
        .rsplit_once('.')
        .is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext));
    if has_ext {
        base.to_string()
    } else {
        format!("{base}.{ext}")
    }
}

/// Renders `request` to `format`. PNG output is scaled by `resolution * zoom`.
pub fn export(request: &ExportRequest, format: ExportFormat) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Svg => embed_connection_counts(&request.svg, &request.connection_counts)?
            .into_bytes(),
        ExportFormat::Png => {
            let scale = request.config.resolution * request.config.zoom;
            if !(scale.is_finite() && scale > 0.0) {
                return Err(RasterError::InvalidScale { scale });
            }
            let options = RasterOptions {
                scale: scale as f32,
                background: Some("white".to_string()),
            };
            svg_to_png(&request.svg, &options)?
        }
        ExportFormat::Pdf => svg_to_pdf(&request.svg)?,
    };
    tracing::debug!(
        format = format.extension(),
        bytes = bytes.len(),
        "exported schematic"
    );
    Ok(ExportArtifact {
        filename: export_filename(&request.config.filename, format),
        format,
        bytes,
    })
}

/// Inserts the per-connector connection counts as a JSON `<metadata>` element right after the
/// root `<svg>` start tag.
pub fn embed_connection_counts(svg: &str, counts: &BTreeMap<String, usize>) -> Result<String> {
    let json = serde_json::to_string(counts)?;
    let metadata = format!(
        r#"<metadata id="connection-counts">{}</metadata>"#,
        escape_xml(&json)
    );
    let Some(root) = svg.find("<svg") else {
        return Err(RasterError::SvgParse);
    };
    let Some(close) = svg[root..].find('>') else {
        return Err(RasterError::SvgParse);
    };
    let at = root + close + 1;
    let mut out = String::with_capacity(svg.len() + metadata.len());
    out.push_str(&svg[..at]);
    out.push_str(&metadata);
    out.push_str(&svg[at..]);
    Ok(out)
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    // Keep output stable-ish across environments while still using system fonts.
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

/// Width and height of the root `viewBox="minX minY w h"`; a non-validating scan.
fn parse_svg_viewbox_size(svg: &str) -> Option<(f32, f32)> {
    let i = svg.find("viewBox=\"")?;
    let rest = &svg[i + "viewBox=\"".len()..];
    let end = rest.find('"')?;
    let mut it = rest[..end].split_whitespace();
    let _min_x = it.next()?.parse::<f32>().ok()?;
    let _min_y = it.next()?.parse::<f32>().ok()?;
    let width = it.next()?.parse::<f32>().ok()?;
    let height = it.next()?.parse::<f32>().ok()?;
    (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
        .then_some((width, height))
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    // usvg already maps the root viewBox (negative mins included) onto (0,0).
    let (width, height) = parse_svg_viewbox_size(svg).unwrap_or_else(|| {
        let size = tree.size();
        (size.width(), size.height())
    });

    let width_px = (width * scale).ceil().max(1.0) as u32;
    let height_px = (height * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(color) = background.and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            255,
        )),
        6 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        )),
        8 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        )),
        _ => None,
    }
}
