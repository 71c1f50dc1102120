//! Bar charts of benchmark scores, one PNG per metric.
//!
//! Bars are ordered from the highest score to the lowest and labelled with the
//! disambiguated `instance type / region` label of each row. Chart text uses the
//! report's regular font, registered with `plotters` on first use.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use log::{debug, warn};
use plotters::prelude::*;
use plotters::style::register_font;

use crate::color::Rgb;
use crate::config::{Config, Metric};
use crate::dataset::{DatasetError, InstanceTable, SortOrder};
use crate::fonts::chart_font_bytes;
use crate::images::with_png_density;
use crate::outcome::ItemOutcome;

pub const CHART_WIDTH_PX: u32 = 1000;
pub const CHART_HEIGHT_PX: u32 = 600;
/// Resolution written into chart PNGs; 1000 × 600 px is a 10 × 6 inch figure.
pub const CHART_DPI: f64 = 100.0;
pub const DEFAULT_X_LABEL: &str = "Instance Types";

const CHART_FONT_FAMILY: &str = "benchmark-report-chart";

/// Errors raised while rendering a single chart.
#[derive(Debug)]
pub enum ChartError {
    /// The metric column is missing or holds non-numeric values.
    Data(DatasetError),
    /// The chart font could not be located or read.
    Font(genpdf::error::Error),
    /// The chart font was read but is not a usable TrueType font.
    InvalidFont,
    /// The table has no rows to chart.
    Empty,
    /// `plotters` failed to draw the chart.
    Draw(String),
    /// The bitmap could not be encoded as PNG.
    Encode(image::ImageError),
    /// The PNG could not be written.
    Io(std::io::Error),
}

impl From<DatasetError> for ChartError {
    fn from(err: DatasetError) -> Self {
        Self::Data(err)
    }
}

impl From<genpdf::error::Error> for ChartError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Font(err)
    }
}

impl From<image::ImageError> for ChartError {
    fn from(err: image::ImageError) -> Self {
        Self::Encode(err)
    }
}

impl From<std::io::Error> for ChartError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(err) => write!(f, "{err}"),
            Self::Font(err) => write!(f, "Chart font unavailable: {err}"),
            Self::InvalidFont => f.write_str("Chart font is not a valid TrueType font"),
            Self::Empty => f.write_str("No rows to chart"),
            Self::Draw(message) => write!(f, "Failed to draw chart: {message}"),
            Self::Encode(err) => write!(f, "Failed to encode chart image: {err}"),
            Self::Io(err) => write!(f, "Failed to write chart image: {err}"),
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(err) => Some(err),
            Self::Font(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidFont | Self::Empty | Self::Draw(_) => None,
        }
    }
}

fn draw_error(err: impl fmt::Display) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// What to chart for one metric and where to write it.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkSpec {
    metric: Metric,
    column: String,
    chart_title: String,
    y_label: String,
    x_label: String,
    output_file: String,
    bar_color: Rgb,
}

impl BenchmarkSpec {
    /// Creates the spec for `metric`, reading scores from `column`.
    pub fn new(metric: Metric, column: impl Into<String>, bar_color: Rgb) -> Self {
        let descriptor = metric.descriptor();
        Self {
            metric,
            column: column.into(),
            chart_title: descriptor.chart_title.to_owned(),
            y_label: descriptor.y_axis_label.to_owned(),
            x_label: DEFAULT_X_LABEL.to_owned(),
            output_file: descriptor.output_file.to_owned(),
            bar_color,
        }
    }

    pub fn with_x_label(mut self, x_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn chart_title(&self) -> &str {
        &self.chart_title
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn bar_color(&self) -> Rgb {
        self.bar_color
    }
}

/// Builds one spec per metric of every active family.
///
/// Metrics without a configured column cannot be charted; they are reported as
/// skipped in the returned outcomes.
pub fn benchmark_specs(config: &Config) -> (Vec<BenchmarkSpec>, Vec<ItemOutcome>) {
    let mut specs = Vec::new();
    let mut skipped = Vec::new();
    for metric in config.active_metrics() {
        let descriptor = metric.descriptor();
        match config.metric_column(metric) {
            Some(column) => specs.push(BenchmarkSpec::new(metric, column, config.chart_color)),
            None => {
                warn!(
                    "{} is not set; skipping '{}'",
                    descriptor.column_variable, descriptor.output_file
                );
                skipped.push(ItemOutcome::skipped(
                    descriptor.output_file,
                    format!("{} is not set", descriptor.column_variable),
                ));
            }
        }
    }
    (specs, skipped)
}

/// Labels and scores for one chart, highest score first.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    title: String,
    labels: Vec<String>,
    values: Vec<Option<f64>>,
}

impl ChartSeries {
    /// The chart title, which is the metric's column name.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Scores in bar order; empty cells have no bar.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

/// Sorts the table by `metric_column`, highest first, and pairs each score with its
/// label. Rows with equal scores keep their current order.
pub fn chart_series(
    table: &InstanceTable,
    label_column: &str,
    metric_column: &str,
) -> Result<ChartSeries, DatasetError> {
    let mut sorted = table.clone();
    sorted.sort_by_numeric(metric_column, SortOrder::Descending)?;
    let labels = sorted
        .column(label_column)?
        .into_iter()
        .map(str::to_owned)
        .collect();
    let values = sorted.numeric_column(metric_column)?;
    Ok(ChartSeries {
        title: metric_column.to_owned(),
        labels,
        values,
    })
}

fn register_chart_font(fonts_dir: Option<&Path>) -> Result<(), ChartError> {
    static REGISTERED: OnceLock<()> = OnceLock::new();
    if REGISTERED.get().is_some() {
        return Ok(());
    }

    let bytes = chart_font_bytes(fonts_dir)?;
    // plotters keeps registered fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(CHART_FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| ChartError::InvalidFont)?;
    let _ = REGISTERED.set(());
    debug!("Registered chart font");
    Ok(())
}

/// Space below the plot for vertical tick labels, in pixels.
fn label_area_height(labels: &[String]) -> u32 {
    let longest = labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0) as u32;
    (longest * 8 + 50).clamp(60, CHART_HEIGHT_PX / 2)
}

/// Renders `series` as a PNG bar chart.
///
/// The chart font must already be registered.
pub fn render_bar_chart(series: &ChartSeries, spec: &BenchmarkSpec) -> Result<Vec<u8>, ChartError> {
    if series.is_empty() {
        return Err(ChartError::Empty);
    }

    let mut pixels = vec![0u8; (CHART_WIDTH_PX * CHART_HEIGHT_PX * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (CHART_WIDTH_PX, CHART_HEIGHT_PX))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let top = series.max_value();
        let top = if top > 0.0 { top * 1.05 } else { 1.0 };
        let labels = series.labels();

        let mut chart = ChartBuilder::on(&root)
            .caption(series.title(), (CHART_FONT_FAMILY, 22))
            .margin(12)
            .x_label_area_size(label_area_height(labels))
            .y_label_area_size(90)
            .build_cartesian_2d((0..series.len()).into_segmented(), 0f64..top)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(series.len())
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(index) | SegmentValue::Exact(index) => {
                    labels.get(*index).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .x_label_style(
                (CHART_FONT_FAMILY, 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_label_style((CHART_FONT_FAMILY, 13))
            .axis_desc_style((CHART_FONT_FAMILY, 16))
            .x_desc(spec.x_label())
            .y_desc(spec.y_label())
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(RGBColor::from(spec.bar_color()).filled())
                    .margin(3)
                    .data(
                        series
                            .values()
                            .iter()
                            .enumerate()
                            .filter_map(|(index, value)| value.map(|value| (index, value))),
                    ),
            )
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }

    let bitmap = RgbImage::from_raw(CHART_WIDTH_PX, CHART_HEIGHT_PX, pixels)
        .ok_or_else(|| ChartError::Draw("bitmap buffer has the wrong size".to_owned()))?;
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(bitmap).write_to(&mut png, ImageOutputFormat::Png)?;
    Ok(with_png_density(&png, CHART_DPI).unwrap_or(png))
}

/// Writes charts for a labelled table into a directory.
#[derive(Clone, Debug)]
pub struct ChartGenerator {
    output_dir: PathBuf,
    fonts_dir: Option<PathBuf>,
}

impl ChartGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fonts_dir: None,
        }
    }

    pub fn with_fonts_dir(mut self, fonts_dir: Option<PathBuf>) -> Self {
        self.fonts_dir = fonts_dir;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders and writes the chart for `spec`, returning the written path.
    pub fn generate(
        &self,
        table: &InstanceTable,
        label_column: &str,
        spec: &BenchmarkSpec,
    ) -> Result<PathBuf, ChartError> {
        let series = chart_series(table, label_column, spec.column())?;
        self.write_chart(&series, spec)
    }

    fn write_chart(&self, series: &ChartSeries, spec: &BenchmarkSpec) -> Result<PathBuf, ChartError> {
        register_chart_font(self.fonts_dir.as_deref())?;
        let png = render_bar_chart(series, spec)?;
        let path = self.output_dir.join(spec.output_file());
        std::fs::write(&path, png)?;
        Ok(path)
    }

    /// Generates every chart in `specs`, continuing past failures.
    ///
    /// `progress` hears about each chart once its data has been read and again if
    /// it is skipped.
    pub fn generate_all<F>(
        &self,
        table: &InstanceTable,
        label_column: &str,
        specs: &[BenchmarkSpec],
        mut progress: F,
    ) -> Vec<ItemOutcome>
    where
        F: FnMut(ChartProgress<'_>),
    {
        specs
            .iter()
            .map(|spec| {
                let file = spec.output_file();
                let written = chart_series(table, label_column, spec.column())
                    .map_err(ChartError::from)
                    .and_then(|series| {
                        progress(ChartProgress::Generating(file));
                        self.write_chart(&series, spec)
                    });
                match written {
                    Ok(path) => {
                        debug!("Wrote {}", path.display());
                        ItemOutcome::completed(file)
                    }
                    Err(err) => {
                        warn!("Skipping '{}': {}", file, err);
                        let reason = err.to_string();
                        progress(ChartProgress::Skipped {
                            file,
                            reason: &reason,
                        });
                        ItemOutcome::skipped(file, reason)
                    }
                }
            })
            .collect()
    }
}

/// Per-chart events reported by [`ChartGenerator::generate_all`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartProgress<'a> {
    /// The data was read and the chart is being drawn.
    Generating(&'a str),
    /// The chart was left out.
    Skipped { file: &'a str, reason: &'a str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchmarkFamily;

    fn table() -> InstanceTable {
        InstanceTable::from_reader(
            "Label,Score,Other\nA,10,1\nB,30,2\nC,20,3\nD,30,4\n".as_bytes(),
        )
        .expect("table")
    }

    #[test]
    fn series_is_sorted_descending_with_stable_ties() {
        let series = chart_series(&table(), "Label", "Score").expect("series");
        assert_eq!(series.title(), "Score");
        assert_eq!(series.labels(), ["B", "D", "C", "A"]);
        assert_eq!(
            series.values(),
            [Some(30.0), Some(30.0), Some(20.0), Some(10.0)]
        );
    }

    #[test]
    fn missing_metric_column_is_an_error() {
        let err = chart_series(&table(), "Label", "Nope").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(column) if column == "Nope"));
    }

    fn record(events: &mut Vec<String>, event: ChartProgress<'_>) {
        events.push(match event {
            ChartProgress::Generating(file) => format!("generating {file}"),
            ChartProgress::Skipped { file, .. } => format!("skipped {file}"),
        });
    }

    #[test]
    fn absent_column_is_skipped_without_generating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let generator = ChartGenerator::new(dir.path());
        let specs = [BenchmarkSpec::new(Metric::Linpack, "Absent", Rgb::new(0, 0, 255))];
        let mut events = Vec::new();
        let outcomes =
            generator.generate_all(&table(), "Label", &specs, |event| record(&mut events, event));

        assert_eq!(events, ["skipped linpack.png"]);
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].is_completed());
        assert!(!dir.path().join("linpack.png").exists());
    }

    #[test]
    fn absent_column_leaves_other_charts_alone() {
        if !crate::fonts::report_fonts_available(None) {
            eprintln!("skipping chart generation test: fonts unavailable");
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let generator = ChartGenerator::new(dir.path());
        let specs = [
            BenchmarkSpec::new(Metric::Linpack, "Absent", Rgb::new(0, 0, 255)),
            BenchmarkSpec::new(Metric::SysbenchSingleCore, "Score", Rgb::new(0, 128, 0)),
        ];
        let mut events = Vec::new();
        let outcomes =
            generator.generate_all(&table(), "Label", &specs, |event| record(&mut events, event));

        assert_eq!(events, ["skipped linpack.png", "generating sysbench-single.png"]);
        assert!(matches!(
            outcomes.as_slice(),
            [ItemOutcome::Skipped { .. }, ItemOutcome::Completed { .. }]
        ));
        assert!(!dir.path().join("linpack.png").exists());
        assert!(dir.path().join("sysbench-single.png").is_file());
    }

    #[test]
    fn specs_cover_active_families_only() {
        let mut config = Config::default();
        config.selection = vec!["linpack".to_owned(), "coremark-standard".to_owned()];
        config
            .metric_columns
            .insert(Metric::Linpack, "LINPACK MFLOPS".to_owned());

        let (specs, skipped) = benchmark_specs(&config);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].output_file(), "linpack.png");
        assert_eq!(specs[0].x_label(), DEFAULT_X_LABEL);
        assert_eq!(skipped.len(), BenchmarkFamily::CoremarkStandard.metrics().len());
    }

    #[test]
    fn label_area_grows_with_label_length() {
        let short = label_area_height(&["a".to_owned()]);
        let long = label_area_height(&["m5.24xlarge / eu-west-2 (12)".to_owned()]);
        assert!(long > short);
        assert!(long <= CHART_HEIGHT_PX / 2);
    }

    #[test]
    fn renders_png_at_chart_resolution() {
        if !crate::fonts::report_fonts_available(None) {
            eprintln!("skipping chart rendering test: fonts unavailable");
            return;
        }
        register_chart_font(None).expect("font registered");
        let spec = BenchmarkSpec::new(Metric::Linpack, "Score", Rgb::new(0, 0, 255));
        let series = chart_series(&table(), "Label", "Score").expect("series");
        let png = render_bar_chart(&series, &spec).expect("chart rendered");

        let image = crate::images::LoadedImage::from_bytes(&png).expect("decodes");
        assert_eq!(image.pixel_size(), (CHART_WIDTH_PX, CHART_HEIGHT_PX));
        assert!((image.dpi_x - CHART_DPI).abs() < 0.5);
    }
}
