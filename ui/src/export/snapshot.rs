//! PNG snapshots of the mounted card.
//!
//! The card keeps an up-to-date [`SnapshotScene`] describing what is on
//! screen. Capturing renders that scene as SVG and rasterizes it: through a
//! canvas in the browser, through resvg on desktop.

use tracing::{debug, info};
use uuid::Uuid;

use super::download::{download_bytes, export_file_name, Delivery};
use super::error::ExportError;
use crate::config::KpiConfig;
use crate::kpi::display::KpiDisplay;
use crate::theme::{Alignment, KpiTheme};

pub const SNAPSHOT_WIDTH: u32 = 640;
pub const SNAPSHOT_HEIGHT: u32 = 320;

/// Handle to a mounted card. A remount produces a new `id`, which is how
/// stale capture requests are told apart from current ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRegion {
    pub id: Uuid,
    pub scene: SnapshotScene,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotScene {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub font_family: String,
    pub font_color: String,
    pub negative_color: String,
    pub alignment: Alignment,
    pub title: Option<String>,
    pub description: Option<String>,
    pub headline: String,
    pub headline_size: f32,
    pub subline: Option<String>,
    pub comparison: Option<SceneComparison>,
    pub meta_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneComparison {
    pub text: String,
    pub negative: bool,
    /// Already localized "vs …" label.
    pub period: Option<String>,
}

impl SnapshotScene {
    /// Describe the card as currently displayed. `versus` renders the
    /// localized period label.
    pub fn compose(
        config: &KpiConfig,
        theme: &KpiTheme,
        display: &KpiDisplay,
        versus: impl Fn(&str) -> String,
    ) -> Self {
        Self {
            width: SNAPSHOT_WIDTH,
            height: SNAPSHOT_HEIGHT,
            background: "#FFFFFF".to_string(),
            font_family: theme.font_family.clone(),
            font_color: theme.font_color_normal.clone(),
            negative_color: theme.kpi_negative_color.clone(),
            alignment: theme.kpi_alignment,
            title: config.title.clone().filter(|t| !t.is_empty()),
            description: config.description.clone().filter(|d| !d.is_empty()),
            headline: display.headline.clone(),
            headline_size: display.font_size,
            subline: display.subline.clone(),
            comparison: display.comparison.as_ref().map(|line| SceneComparison {
                text: line.text.clone(),
                negative: line.negative,
                period: line.period.as_deref().map(&versus),
            }),
            meta_size: display.meta_font_size,
        }
    }
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// SVG rendering of the scene. Text is laid out top to bottom and vertically
/// centred as a block.
pub fn svg_markup(scene: &SnapshotScene) -> String {
    const PADDING: f32 = 24.0;
    const TITLE_SIZE: f32 = 18.0;
    const DESCRIPTION_SIZE: f32 = 13.0;

    let width = scene.width as f32;
    let height = scene.height as f32;
    let (anchor, x) = match scene.alignment {
        Alignment::Left => ("start", PADDING),
        Alignment::Center => ("middle", width / 2.0),
        Alignment::Right => ("end", width - PADDING),
    };
    let family = escape_xml(&scene.font_family);
    let color = escape_xml(&scene.font_color);

    let mut header = String::new();
    let mut header_y = PADDING;
    if let Some(title) = &scene.title {
        header_y += TITLE_SIZE;
        header.push_str(&format!(
            "  <text x='{PADDING}' y='{header_y}' fill='{color}' font-family='{family}' font-size='{TITLE_SIZE}' font-weight='600'>{}</text>\n",
            escape_xml(title)
        ));
        header_y += 6.0;
    }
    if let Some(description) = &scene.description {
        header_y += DESCRIPTION_SIZE;
        header.push_str(&format!(
            "  <text x='{PADDING}' y='{header_y}' fill='{color}' font-family='{family}' font-size='{DESCRIPTION_SIZE}'>{}</text>\n",
            escape_xml(description)
        ));
        header_y += 6.0;
    }

    // (text, size, colour, weight)
    let mut lines: Vec<(String, f32, String, &str)> = vec![(
        escape_xml(&scene.headline),
        scene.headline_size,
        color.clone(),
        "700",
    )];
    if let Some(subline) = &scene.subline {
        lines.push((escape_xml(subline), scene.meta_size, color.clone(), "400"));
    }
    if let Some(comparison) = &scene.comparison {
        let fill = if comparison.negative {
            escape_xml(&scene.negative_color)
        } else {
            color.clone()
        };
        let mut text = format!("{} {}", if comparison.negative { "▼" } else { "▲" }, comparison.text);
        if let Some(period) = &comparison.period {
            text.push(' ');
            text.push_str(period);
        }
        lines.push((escape_xml(&text), scene.meta_size, fill, "400"));
    }

    let block: f32 = lines.iter().map(|(_, size, _, _)| size * 1.2).sum();
    let body_top = header_y.max((height - block) / 2.0);
    let mut y = body_top;
    let mut body = String::new();
    for (text, size, fill, weight) in &lines {
        y += size * 1.2;
        body.push_str(&format!(
            "  <text x='{x}' y='{:.1}' text-anchor='{anchor}' fill='{fill}' font-family='{family}' font-size='{size}' font-weight='{weight}'>{text}</text>\n",
            y - size * 0.25
        ));
    }

    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>\n  <rect width='{w}' height='{h}' fill='{bg}'/>\n{header}{body}</svg>",
        w = scene.width,
        h = scene.height,
        bg = escape_xml(&scene.background),
    )
}

/// Rasterize the region and save it as `<name>-<timestamp>.png`.
pub async fn export_snapshot(
    region: Option<SnapshotRegion>,
    name: String,
) -> Result<Delivery, ExportError> {
    let region = region.ok_or(ExportError::RegionUnavailable)?;
    debug!(region = %region.id, "rasterizing snapshot");
    let png = rasterize(&region.scene).await?;
    let filename = export_file_name(&name, "png");
    let delivery = download_bytes(&filename, "image/png", png)?;
    info!(%filename, ?delivery, "snapshot export saved");
    Ok(delivery)
}

async fn rasterize(scene: &SnapshotScene) -> Result<Vec<u8>, ExportError> {
    #[cfg(target_arch = "wasm32")]
    {
        rasterize_web(scene).await
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // Font discovery and resvg are synchronous; keep them off the UI thread.
        let scene = scene.clone();
        tokio::task::spawn_blocking(move || rasterize_desktop(&scene))
            .await
            .map_err(|err| ExportError::Raster(format!("rasterizer task failed: {err}")))?
    }
}

#[cfg(target_arch = "wasm32")]
async fn rasterize_web(scene: &SnapshotScene) -> Result<Vec<u8>, ExportError> {
    use base64::Engine as _;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Url,
    };

    let fail = |message: &str| ExportError::Raster(message.to_string());

    let markup = svg_markup(scene);
    let opts = BlobPropertyBag::new();
    opts.set_type("image/svg+xml");
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(&markup));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
        .map_err(|_| fail("unable to build SVG blob"))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|_| fail("unable to create SVG URL"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| fail("document unavailable"))?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| fail("unable to create canvas"))?
        .dyn_into()
        .map_err(|_| fail("canvas cast failed"))?;
    canvas.set_width(scene.width);
    canvas.set_height(scene.height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|_| fail("canvas context unavailable"))?
        .ok_or_else(|| fail("canvas context missing"))?
        .dyn_into()
        .map_err(|_| fail("context cast failed"))?;

    let image = HtmlImageElement::new().map_err(|_| fail("unable to create image"))?;
    image.set_src(&url);
    let decoded = JsFuture::from(image.decode()).await;
    Url::revoke_object_url(&url).ok();
    decoded.map_err(|_| fail("image decode failed"))?;

    context
        .draw_image_with_html_image_element(&image, 0.0, 0.0)
        .map_err(|_| fail("unable to draw image"))?;

    let data_url = canvas
        .to_data_url_with_type("image/png")
        .map_err(|_| fail("unable to serialise canvas"))?;
    let payload = data_url
        .split(',')
        .nth(1)
        .ok_or_else(|| fail("malformed data URL"))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|err| ExportError::Raster(err.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
static FONT_DB: once_cell::sync::Lazy<std::sync::Arc<usvg::fontdb::Database>> =
    once_cell::sync::Lazy::new(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system fonts for snapshots");
        std::sync::Arc::new(db)
    });

#[cfg(not(target_arch = "wasm32"))]
fn rasterize_desktop(scene: &SnapshotScene) -> Result<Vec<u8>, ExportError> {
    use tiny_skia::{Pixmap, Transform};

    let markup = svg_markup(scene);
    let mut options = usvg::Options::default();
    options.fontdb = FONT_DB.clone();

    let tree = usvg::Tree::from_str(&markup, &options)
        .map_err(|err| ExportError::Raster(err.to_string()))?;
    let mut pixmap = Pixmap::new(scene.width, scene.height).ok_or_else(|| {
        ExportError::Raster(format!(
            "cannot allocate a {}x{} pixmap",
            scene.width, scene.height
        ))
    })?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; PNG wants straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, scene.width, scene.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| ExportError::Raster(err.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|err| ExportError::Raster(err.to_string()))?;
        writer
            .finish()
            .map_err(|err| ExportError::Raster(err.to_string()))?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::display::ComparisonLine;

    fn display() -> KpiDisplay {
        KpiDisplay {
            headline: "$1,200".into(),
            subline: None,
            comparison: Some(ComparisonLine {
                text: "-4%".into(),
                negative: true,
                infinite: false,
                period: Some("last week".into()),
            }),
            font_size: 44.0,
            meta_font_size: 14.0,
            loading: false,
        }
    }

    fn scene() -> SnapshotScene {
        let config = KpiConfig {
            title: Some("Revenue <EU> & UK".into()),
            ..KpiConfig::default()
        };
        SnapshotScene::compose(&config, &KpiTheme::default(), &display(), |period| {
            format!("vs {period}")
        })
    }

    #[test]
    fn compose_localizes_period_and_keeps_polarity() {
        let scene = scene();
        let comparison = scene.comparison.as_ref().unwrap();
        assert_eq!(comparison.period.as_deref(), Some("vs last week"));
        assert!(comparison.negative);
        assert_eq!(scene.headline_size, 44.0);
    }

    #[test]
    fn markup_escapes_text_and_uses_negative_colour() {
        let svg = svg_markup(&scene());
        assert!(svg.contains("Revenue &lt;EU&gt; &amp; UK"));
        assert!(svg.contains("fill='#FF6B6C'"));
        assert!(svg.contains("vs last week"));
        assert!(svg.contains("text-anchor='middle'"));
    }

    #[test]
    fn remounted_region_differs_from_the_old_one() {
        let a = SnapshotRegion {
            id: Uuid::new_v4(),
            scene: scene(),
        };
        let b = SnapshotRegion {
            id: Uuid::new_v4(),
            scene: scene(),
        };
        assert_eq!(a.scene, b.scene);
        assert_ne!(a, b);
    }

    #[test]
    fn missing_region_is_reported() {
        let err = futures::executor::block_on(export_snapshot(None, "Revenue".into())).unwrap_err();
        assert!(matches!(err, ExportError::RegionUnavailable));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn desktop_rasterizer_produces_png() {
        let bytes = rasterize_desktop(&scene()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn desktop_rasterizing_runs_on_the_blocking_pool() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let bytes = runtime.block_on(rasterize(&scene())).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
