//! Line chart rendering

use crate::config::is_file;
use crate::data::MarketTable;
use crate::error::{AgentError, Result};
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;
const FONT_FAMILY: &str = "sans-serif";

/// Y-axis label
pub const Y_AXIS_LABEL: &str = "Price per MWh ($)";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

// plotters keeps one global font per family; this tracks which file is
// registered under FONT_FAMILY and the bytes already leaked for each file.
static FONTS: Mutex<FontRegistry> = Mutex::new(FontRegistry::new());

struct FontRegistry {
    active: Option<PathBuf>,
    loaded: BTreeMap<PathBuf, &'static [u8]>,
}

impl FontRegistry {
    const fn new() -> Self {
        Self {
            active: None,
            loaded: BTreeMap::new(),
        }
    }

    /// Make the font resolved from `preferred` the active one
    ///
    /// Returns false when no usable font exists.
    fn select(&mut self, preferred: Option<&Path>) -> bool {
        let Some(path) = find_font(preferred) else {
            warn!("No TrueType font found; chart will be rendered without text");
            self.active = None;
            return false;
        };
        if self.active.as_deref() == Some(path.as_path()) {
            return true;
        }

        let cached = self.loaded.get(&path).copied();
        let bytes = match cached {
            Some(bytes) => bytes,
            None => match std::fs::read(&path) {
                Ok(bytes) => {
                    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                    self.loaded.insert(path.clone(), bytes);
                    bytes
                }
                Err(e) => {
                    warn!("Failed to read font {}: {}", path.display(), e);
                    return false;
                }
            },
        };

        if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_err() {
            warn!("Font {} could not be loaded; chart will have no text", path.display());
            return false;
        }
        debug!("Using chart font {}", path.display());
        self.active = Some(path);
        true
    }
}

fn font_registry() -> MutexGuard<'static, FontRegistry> {
    FONTS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Chart title for a topic
pub fn chart_title(topic: &str) -> String {
    format!("{topic} Price Trend")
}

/// Render `table` as a line chart with markers and a grid, writing a PNG
/// to `path`
///
/// Text needs a TrueType font. `font` is tried first, then a list of
/// common system locations; without any font the chart is drawn with no
/// title or axis labels. The font is resolved on every call, and charts
/// are drawn one at a time so each uses the font it asked for.
pub fn render_chart(table: &MarketTable, title: &str, path: &Path, font: Option<&Path>) -> Result<()> {
    let mut fonts = font_registry();
    let has_text = fonts.select(font);
    let labels = table.labels();
    let points: Vec<(i32, f64)> = (0_i32..)
        .zip(table.prices())
        .map(|(x, price)| (x, f64::from(price)))
        .collect();

    let (low, high) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let y_range = (low - 5.0).max(0.0)..(high + 5.0);
    let x_range = -1..i32::try_from(labels.len()).unwrap_or(i32::MAX);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if has_text {
        builder
            .caption(title, (FONT_FAMILY, 28))
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_error)?;

    let month_label = |x: &i32| {
        usize::try_from(*x)
            .ok()
            .and_then(|i| labels.get(i))
            .map(ToString::to_string)
            .unwrap_or_default()
    };

    let mut mesh = chart.configure_mesh();
    if has_text {
        mesh.x_labels(labels.len() + 2)
            .x_label_formatter(&month_label)
            .x_desc("Month")
            .y_desc(Y_AXIS_LABEL)
            .label_style((FONT_FAMILY, 15));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw().map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(points.clone(), BLUE.stroke_width(2)))
        .map_err(chart_error)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, BLUE.filled())),
        )
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    debug!("Chart written to {}", path.display());
    Ok(())
}

fn chart_error<E: std::fmt::Display>(err: E) -> AgentError {
    AgentError::ChartError(err.to_string())
}

fn find_font(preferred: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = preferred {
        if is_file(path) {
            return Some(path.to_path_buf());
        }
        warn!("Configured chart font {} does not exist", path.display());
    }

    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| is_file(p))
}
