//! Expense charts rendered to PNG.
//!
//! Both charts draw into an in-memory RGB buffer through plotters'
//! `BitMapBackend` and are then encoded with `image`. Text goes through
//! plotters' ttf backend, so a sans-serif system font must be installed.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;


/// Canvas width in pixels.
pub const WIDTH: u32 = 640;
/// Canvas height in pixels.
pub const HEIGHT: u32 = 480;

/// Fixed category labels, in display order.
pub const LABELS: [&str; 3] = ["R&D", "Admin", "Marketing"];

const BAR_TITLE: &str = "Startup Expenses";
const BAR_X_DESC: &str = "Expense Category";
const BAR_Y_DESC: &str = "Amount in $";
const PIE_TITLE: &str = "Startup Expenses Distribution";
const PIE_START_ANGLE_DEG: f64 = 140.0;
/// Widest y-axis span handed to plotters; its tick search overflows near `f64::MAX`.
const MAX_AXIS_SPAN: f64 = f64::MAX / 100.0;

const PALETTE: [RGBColor; 3] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
];

/// Result type for chart rendering.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors raised while drawing or encoding a chart.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("amounts between {lower} and {upper} are too large to chart")]
    OutOfRange { lower: f64, upper: f64 },
}

fn drawing<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Expense amounts keyed by the fixed category labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseMapping {
    amounts: [f64; 3],
}

impl ExpenseMapping {
    pub fn new(r_d: f64, administration: f64, marketing: f64) -> Self {
        Self {
            amounts: [r_d, administration, marketing],
        }
    }
}

/// Bar chart: one bar per category, amounts on the y axis.
pub fn render_bar(mapping: &ExpenseMapping) -> Result<Vec<u8>> {
    let (lower, upper) = value_range(&mapping.amounts)?;

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(BAR_TITLE, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(72)
            .build_cartesian_2d((0usize..LABELS.len()).into_segmented(), lower..upper)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(LABELS.len())
            .x_label_formatter(&|segment| match segment {
                SegmentValue::CenterOf(i) => LABELS.get(*i).copied().unwrap_or_default().to_string(),
                _ => String::new(),
            })
            .x_desc(BAR_X_DESC)
            .y_desc(BAR_Y_DESC)
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(PALETTE[0].filled())
                    .margin(24)
                    .data(mapping.amounts.iter().copied().enumerate()),
            )
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
    }
    encode_png(buffer)
}

/// Pie chart with percentage labels, first slice at 140 degrees.
///
/// Negative amounts count as zero. When nothing is left to divide, an empty
/// disc is drawn instead of slices.
pub fn render_pie(mapping: &ExpenseMapping) -> Result<Vec<u8>> {
    let sizes = pie_shares(&mapping.amounts);
    let total: f64 = sizes.iter().sum();

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let area = root.titled(PIE_TITLE, ("sans-serif", 24)).map_err(drawing)?;

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.35;

        if total > 0.0 {
            // plotters measures angles clockwise in screen space
            let mut pie = Pie::new(&center, &radius, &sizes, &PALETTE, &LABELS);
            pie.start_angle(-PIE_START_ANGLE_DEG);
            pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
            pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
            area.draw(&pie).map_err(drawing)?;
        } else {
            area.draw(&Circle::new(
                center,
                radius as i32,
                RGBColor(200, 200, 200).stroke_width(2),
            ))
            .map_err(drawing)?;
        }

        root.present().map_err(drawing)?;
    }
    encode_png(buffer)
}

/// y-axis bounds that always include zero and leave headroom above the tallest bar.
fn value_range(amounts: &[f64; 3]) -> Result<(f64, f64)> {
    let max = amounts.iter().copied().fold(0.0_f64, f64::max);
    let min = amounts.iter().copied().fold(0.0_f64, f64::min);

    let upper = if max > 0.0 { max * 1.1 } else { 1.0 };
    let lower = if min < 0.0 { min * 1.1 } else { 0.0 };

    let span = upper - lower;
    if !span.is_finite() || span > MAX_AXIS_SPAN {
        return Err(ChartError::OutOfRange {
            lower: min,
            upper: max,
        });
    }
    Ok((lower, upper))
}

/// Non-negative slice sizes scaled so the largest is 1; the sum stays finite.
fn pie_shares(amounts: &[f64; 3]) -> [f64; 3] {
    let sizes = amounts.map(|v| v.max(0.0));
    let largest = sizes.iter().copied().fold(0.0_f64, f64::max);
    if largest > 0.0 {
        sizes.map(|v| v / largest)
    } else {
        sizes
    }
}

fn encode_png(buffer: Vec<u8>) -> Result<Vec<u8>> {
    let image = RgbImage::from_raw(WIDTH, HEIGHT, buffer)
        .ok_or_else(|| ChartError::Drawing("pixel buffer does not match canvas".to_string()))?;

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
