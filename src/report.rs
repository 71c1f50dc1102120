//! The benchmark report: section content, summary tables and rendering.
//!
//! A report is produced in two steps. [`ReportBuilder::plan`] turns the CSV table
//! and configuration into an ordered list of [`DocumentSection`] values together
//! with the numbering state. [`ReportBuilder::render`] then walks the plan and
//! drives a [`LayoutEngine`].

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::config::{BenchmarkFamily, ColumnNames, Config, Metric};
use crate::dataset::{DatasetError, InstanceTable, SortOrder};
use crate::fonts::load_report_fonts;
use crate::layout::{
    Align, BulletOptions, HyperlinkOptions, ImageOptions, LayoutEngine, LayoutError, RuleOptions,
    TextOptions,
};
use crate::model::{DocNumbers, DocumentSection, Reference};
use crate::outcome::ItemOutcome;
use crate::table::{render_pretty, table_width};
use crate::writer::{GenpdfWriter, PageWriter};

pub const REPORT_TITLE: &str = "YellowDog Benchmark Report";
pub const CONTACT_REFERENCE_TEXT: &str = "Contact YellowDog:";
pub const CONTACT_URL: &str = "https://yellowdog.co/contact";

const SUMMARY_TABLE_FONT_SIZE: f64 = 8.0;
const PRICE_NOTE_FONT_SIZE: f64 = 9.0;
const REFERENCE_LINK_INDENT: f64 = 6.0;
const REFERENCE_GAP: f64 = 0.1;

/// Errors that abort report generation.
#[derive(Debug)]
pub enum ReportError {
    /// The CSV could not be read, or lacks a column the report needs.
    Dataset(DatasetError),
    /// The report fonts could not be loaded.
    Fonts(genpdf::error::Error),
    /// Laying out or writing the PDF failed.
    Layout(LayoutError),
}

impl From<DatasetError> for ReportError {
    fn from(err: DatasetError) -> Self {
        Self::Dataset(err)
    }
}

impl From<LayoutError> for ReportError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(err) => write!(f, "Invalid benchmark data: {err}"),
            Self::Fonts(err) => write!(f, "Failed to load report fonts: {err}"),
            Self::Layout(err) => write!(f, "Failed to produce the PDF: {err}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dataset(err) => Some(err),
            Self::Fonts(err) => Some(err),
            Self::Layout(err) => Some(err),
        }
    }
}

/// The steps of report generation, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportStage {
    CollectInputs,
    BuildNarrativeSections,
    ConditionallyAppendBenchmarkSections,
    ComputeSummaryTable,
    AppendClosingSections,
    RenderTitleAndIntro,
    RenderInstanceTable,
    RenderAllSections,
    RenderReferences,
    Finalize,
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectInputs => "collect inputs",
            Self::BuildNarrativeSections => "build narrative sections",
            Self::ConditionallyAppendBenchmarkSections => "append benchmark sections",
            Self::ComputeSummaryTable => "compute summary table",
            Self::AppendClosingSections => "append closing sections",
            Self::RenderTitleAndIntro => "render title and introduction",
            Self::RenderInstanceTable => "render instance table",
            Self::RenderAllSections => "render sections",
            Self::RenderReferences => "render references",
            Self::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

fn enter(stage: ReportStage) {
    debug!("Report stage: {stage}");
}

/// One row of the summary table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryRow {
    pub benchmark: String,
    pub best: String,
    pub worst: String,
}

fn instance_name(table: &InstanceTable, row: usize, columns: &ColumnNames) -> String {
    let cell = |column: &str| table.value(row, column).unwrap_or_default();
    format!(
        "{} / {} / {}",
        cell(&columns.provider),
        cell(&columns.region),
        cell(&columns.instance_type)
    )
}

/// Finds the best and worst performing instance for each metric column.
///
/// Rows are sorted ascending by the metric, ties keeping CSV order; the first row is
/// the worst and the last row with a value is the best. Columns that are missing or
/// hold non-numeric values are skipped and reported in the returned outcomes.
pub fn performance_rows(
    table: &InstanceTable,
    columns: &ColumnNames,
    metric_columns: &[String],
) -> (Vec<SummaryRow>, Vec<ItemOutcome>) {
    let mut rows = Vec::new();
    let mut outcomes = Vec::new();
    for metric_column in metric_columns {
        let mut sorted = table.clone();
        if let Err(err) = sorted.sort_by_numeric(metric_column, SortOrder::Ascending) {
            warn!("Leaving '{metric_column}' out of the summary: {err}");
            outcomes.push(ItemOutcome::skipped(metric_column.as_str(), err.to_string()));
            continue;
        }
        let scored = sorted
            .numeric_column(metric_column)
            .map(|values| values.iter().filter(|value| value.is_some()).count())
            .unwrap_or(0);
        if scored == 0 {
            warn!("Leaving '{metric_column}' out of the summary: no scores");
            outcomes.push(ItemOutcome::skipped(metric_column.as_str(), "no scores"));
            continue;
        }
        rows.push(SummaryRow {
            benchmark: metric_column.clone(),
            best: instance_name(&sorted, scored - 1, columns),
            worst: instance_name(&sorted, 0, columns),
        });
        outcomes.push(ItemOutcome::completed(metric_column.as_str()));
    }
    (rows, outcomes)
}

/// Renders the summary rows as a pretty table; `None` when there is nothing to show.
pub fn performance_table(rows: &[SummaryRow]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }
    let cells: Vec<[&str; 3]> = rows
        .iter()
        .map(|row| [row.benchmark.as_str(), row.best.as_str(), row.worst.as_str()])
        .collect();
    Some(render_pretty(
        &["Benchmark", "Best-Performing", "Worst-Performing"],
        &cells,
    ))
}

/// The instance table: one row per instance, ordered by RAM then vCPUs.
pub fn instance_table(table: &InstanceTable, columns: &ColumnNames) -> Result<String, DatasetError> {
    let mut sorted = table.clone();
    sorted.sort_by_columns(&[columns.ram.as_str(), columns.vcpus.as_str()])?;
    let headers = columns.instance_table_columns();
    let projected = sorted.project(&headers)?;
    Ok(render_pretty(projected.headers(), projected.rows()))
}

/// Point size for a fixed-width table of `width` characters, so it fits the page.
pub fn instance_table_font_size(width: usize) -> f64 {
    match width {
        w if w > 110 => 7.0,
        w if w > 99 => 7.75,
        w if w > 88 => 8.0,
        _ => 9.0,
    }
}

/// The sentence naming the selected benchmarks, with names in bold.
pub fn selected_benchmarks_sentence(names: &[&str]) -> String {
    let listed = match names {
        [] => return "No benchmarks were selected.".to_owned(),
        [only] => return format!("The following benchmark was selected: **{only}**."),
        [first, second] => format!("**{first}** and **{second}**"),
        [rest @ .., last] => {
            let head: Vec<String> = rest.iter().map(|name| format!("**{name}**")).collect();
            format!("{}, and **{last}**", head.join(", "))
        }
    };
    format!("The following benchmarks were selected: {listed}.")
}

fn instance_count_sentence(count: usize) -> String {
    if count == 1 {
        "The following instance was provisioned:".to_owned()
    } else {
        format!("The following **{count} instances** were provisioned:")
    }
}

fn chart_files(metrics: &[Metric]) -> Vec<&'static str> {
    metrics
        .iter()
        .map(|metric| metric.descriptor().output_file)
        .collect()
}

fn narrative_sections(numbers: &mut DocNumbers, config: &Config) -> Vec<DocumentSection> {
    let templates = numbers.reference(
        "YellowDog Dynamic Compute Requirement Templates:",
        "https://docs.yellowdog.co/#/the-platform/dynamic-templates",
    );
    let compute_selection = DocumentSection::new("Compute Selection")
        .with_page_break_before(false)
        .with_paragraph(format!(
            "Compute instance types to benchmark are selected via a YellowDog Dynamic \
             Compute Template. This approach enables compute selection based on a range \
             of dynamic constraints and preferences such as 'instances must have 8 \
             VCPUs', or 'instances must be in Europe, with a preference for the most \
             RAM'. For more information on customising Dynamic Compute Templates please \
             see the YellowDog Documentation {}.",
            templates.citation()
        ))
        .with_reference(templates);

    let user_data = numbers.reference(
        "YellowDog User Data Support:",
        "https://docs.yellowdog.co/#/the-platform/user-data",
    );
    let optimisation = DocumentSection::new("Benchmark Optimisation")
        .with_page_break_before(false)
        .with_paragraph(format!(
            "No attempts have been made to optimise compute instances or their software \
             stacks for the purposes of running the benchmarks. Requirements vary \
             significantly between users, workloads, and environments, and tuning is \
             often required to achieve the best benchmark results. Instances are tested \
             as per the default configuration applied by the given cloud provider and \
             with 'vanilla' software installations. If you have specific configurations \
             or optimisations that you wish to apply to instances prior to benchmarking, \
             this can be achieved by applying cloud configuration via YellowDog user \
             data when provisioning {}.",
            user_data.citation()
        ))
        .with_reference(user_data);

    vec![
        DocumentSection::new("Methodology")
            .with_page_break_before(false)
            .with_paragraph(
                "The benchmarks illustrated in this report were generated using the \
                 YellowDog Platform. YellowDog offers its customers this complimentary \
                 benchmarking tool to aid in the selection of optimal compute while \
                 demonstrating the power of the YellowDog Platform. Customers are free \
                 to enhance, optimise and customise the benchmarks for their own \
                 application workloads and compute choices.",
            ),
        compute_selection,
        DocumentSection::new("Benchmark Selection")
            .with_page_break_before(false)
            .with_paragraph(
                "Specific benchmarks can be selected from the full set of benchmarks \
                 available using the configuration file for the benchmark Work \
                 Requirement, or by using environment or command line variables. Please \
                 see the the benchmark documentation for more details.",
            )
            .with_paragraph("The available benchmark names that can be selected are:")
            .with_bullets(
                BenchmarkFamily::ALL
                    .iter()
                    .map(|family| config.identifier(*family).to_owned()),
            ),
        optimisation,
    ]
}

fn family_sections(family: BenchmarkFamily, numbers: &mut DocNumbers) -> Vec<DocumentSection> {
    match family {
        BenchmarkFamily::Sysbench => {
            let reference = numbers.reference(
                "Sysbench Wikipedia:",
                "https://en.wikipedia.org/wiki/Sysbench",
            );
            vec![
                DocumentSection::new("Sysbench CPU Benchmark")
                    .with_paragraph(format!(
                        "Sysbench {} is a scriptable, multi-threaded benchmark tool based \
                         on LuaJIT. It is most frequently used for database benchmarks, \
                         but can also be used to create arbitrarily complex workloads that \
                         do not involve a database server, as well as general tests on \
                         memory and storage performance.",
                        reference.citation()
                    ))
                    .with_paragraph(
                        "When benchmarking the CPU performance of your selected instance \
                         types we run sysbench in two modes, measuring single-core and \
                         multi-core (one thread per vCPU) performance.",
                    )
                    .with_charts(chart_files(&[
                        Metric::SysbenchSingleCore,
                        Metric::SysbenchMultiCore,
                    ]))
                    .with_reference(reference),
                DocumentSection::new("Sysbench Memory Benchmark")
                    .with_paragraph(
                        "The Sysbench memory benchmark is run with a 1MB memory block size \
                         and a total memory throughput of 10GB, using one thread per vCPU.",
                    )
                    .with_charts(chart_files(&[Metric::SysbenchMemory])),
                DocumentSection::new("Sysbench Storage Benchmark")
                    .with_paragraph(
                        "The Sysbench storage ('fileio') benchmark is run with a total \
                         file size of 1GB, a duration of 60s, and one thread per vCPU.",
                    )
                    .with_charts(chart_files(&[
                        Metric::SysbenchStorageReads,
                        Metric::SysbenchStorageWrites,
                        Metric::SysbenchStorageFsyncs,
                    ])),
            ]
        }
        BenchmarkFamily::MysqlTpcc => {
            let reference = numbers.reference(
                "Sysbench MySQL TPC-C:",
                "https://github.com/Percona-Lab/sysbench-tpcc",
            );
            vec![DocumentSection::new("MySQL TPC-C (Sysbench) Benchmark")
                .with_paragraph(format!(
                    "The MySQL TPC-C benchmark uses Sysbench and the Percona TPC-C \
                     benchmark scripts {}. MySQL and the benchmark itself run on the same \
                     instance. The benchmark is reduced in scale to allow it run on \
                     instances with standard-sized root volumes, and to conclude in a \
                     reasonable duration.",
                    reference.citation()
                ))
                .with_paragraph("The following values are used:")
                .with_bullets([
                    "tables = 1",
                    "time = 30 (setup), 60 (benchmark run)",
                    "scale = 1",
                    "threads = 16",
                ])
                .with_charts(chart_files(&[Metric::MysqlTpcc]))
                .with_closing_paragraph(
                    "Note: If TPS is zero then the instance doesn't have enough memory \
                     (2GB) to run MySQL, and the benchmark was omitted.",
                )
                .with_reference(reference)]
        }
        BenchmarkFamily::CoremarkStandard => {
            let reference =
                numbers.reference("CoreMark:", "https://github.com/eembc/coremark.git");
            vec![DocumentSection::new("CoreMark Benchmark")
                .with_paragraph(format!(
                    "The CoreMark benchmark {} stresses the CPU pipeline. The benchmark is \
                     compiled and run twice, once in single-threaded form, and once in a \
                     form compiled to run with multiple threads, one per vCPU.",
                    reference.citation()
                ))
                .with_charts(chart_files(&[
                    Metric::CoremarkSingleCore,
                    Metric::CoremarkMultiCore,
                ]))
                .with_reference(reference)]
        }
        BenchmarkFamily::CoremarkPro => {
            let reference =
                numbers.reference("CoreMark Pro:", "https://github.com/eembc/coremark-pro.git");
            vec![DocumentSection::new("CoreMark Pro Benchmark")
                .with_paragraph(format!(
                    "The CoreMark Pro benchmark {} tests the entire processor, adding \
                     comprehensive support for multi-core technology, a combination of \
                     integer and floating-point workloads, and data sets for utilising \
                     larger memory subsystems.",
                    reference.citation()
                ))
                .with_paragraph(
                    "The benchmark is compiled on the target instance before it's run.",
                )
                .with_charts(chart_files(&[
                    Metric::CoremarkProSingleCore,
                    Metric::CoremarkProMultiCore,
                ]))
                .with_reference(reference)]
        }
        BenchmarkFamily::Linpack => {
            let reference = numbers.reference(
                "LINPACK:",
                "https://people.sc.fsu.edu/~jburkardt/c_src/linpack_bench/linpack_bench.html",
            );
            vec![DocumentSection::new("LINPACK Benchmark")
                .with_paragraph(format!(
                    "The LINPACK benchmark {} is a test problem used to rate the \
                     performance of a computer on a simple linear algebra problem. The \
                     benchmark reports the number of millions of floating point operations \
                     per second (MFLOPS).",
                    reference.citation()
                ))
                .with_paragraph(
                    "The benchmark is compiled on the target instance before being run.",
                )
                .with_charts(chart_files(&[Metric::Linpack]))
                .with_reference(reference)]
        }
    }
}

fn closing_sections(summary_table: Option<String>) -> Vec<DocumentSection> {
    vec![
        DocumentSection::new("Overall Summary of Results")
            .with_paragraph(
                "The table below shows the best and worst performing instance types for \
                 the benchmark(s) performed.",
            )
            .with_table(summary_table),
        DocumentSection::new("Disclaimer")
            .with_page_break_before(false)
            .with_paragraph(
                "While YellowDog does its best to provide helpful and accurate results, \
                 the benchmark(s) presented in this report are intended to be \
                 illustrative only, and do not necessarily represent the performance that \
                 would be achieved under real world conditions. Results should be \
                 independently confirmed with representative compute instances, software \
                 and workloads, before decisions are made.",
            ),
    ]
}

/// Everything decided before the first page is drawn.
#[derive(Clone, Debug)]
pub struct ReportPlan {
    pub sections: Vec<DocumentSection>,
    pub benchmark_names: Vec<&'static str>,
    pub summary_rows: Vec<SummaryRow>,
    pub skipped: Vec<ItemOutcome>,
    numbers: DocNumbers,
}

impl ReportPlan {
    /// References in the order they are listed, excluding the contact reference.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.sections.iter().filter_map(DocumentSection::reference)
    }
}

/// Builds the benchmark report from a labelled-or-raw CSV table.
#[derive(Clone, Debug)]
pub struct ReportBuilder<'a> {
    config: &'a Config,
    chart_dir: PathBuf,
    generated_at: DateTime<Utc>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a Config, chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            chart_dir: chart_dir.into(),
            generated_at: Utc::now(),
        }
    }

    /// Overrides the timestamp printed in the introduction.
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Decides the sections, numbering and summary for `table`.
    pub fn plan(&self, table: &InstanceTable) -> ReportPlan {
        let mut numbers = DocNumbers::new();

        enter(ReportStage::BuildNarrativeSections);
        let mut sections = narrative_sections(&mut numbers, self.config);

        enter(ReportStage::ConditionallyAppendBenchmarkSections);
        let mut benchmark_names = Vec::new();
        let mut metric_columns = Vec::new();
        let mut skipped = Vec::new();
        for family in self.config.active_families() {
            sections.extend(family_sections(family, &mut numbers));
            benchmark_names.extend_from_slice(family.display_names());
            for metric in family.metrics() {
                let descriptor = metric.descriptor();
                match self.config.metric_column(*metric) {
                    Some(column) => metric_columns.push(column.to_owned()),
                    None => {
                        warn!(
                            "{} is not set; leaving it out of the summary",
                            descriptor.column_variable
                        );
                        skipped.push(ItemOutcome::skipped(
                            descriptor.column_variable,
                            "column not configured",
                        ));
                    }
                }
            }
        }

        enter(ReportStage::ComputeSummaryTable);
        let (summary_rows, summary_outcomes) =
            performance_rows(table, &self.config.columns, &metric_columns);
        skipped.extend(
            summary_outcomes
                .into_iter()
                .filter(|outcome| !outcome.is_completed()),
        );
        let summary_table = if metric_columns.is_empty() {
            None
        } else {
            performance_table(&summary_rows)
        };

        enter(ReportStage::AppendClosingSections);
        sections.extend(closing_sections(summary_table));

        ReportPlan {
            sections,
            benchmark_names,
            summary_rows,
            skipped,
            numbers,
        }
    }

    /// Lays out the whole report through `engine`.
    ///
    /// Returns the items that were left out: missing chart images and summary columns.
    pub fn render<W: PageWriter>(
        &self,
        table: &InstanceTable,
        plan: &ReportPlan,
        engine: &mut LayoutEngine<W>,
    ) -> Result<Vec<ItemOutcome>, ReportError> {
        let mut numbers = plan.numbers.clone();
        let mut skipped = plan.skipped.clone();
        let paragraph = TextOptions::paragraph();

        enter(ReportStage::RenderTitleAndIntro);
        engine.print_title(REPORT_TITLE, &TextOptions::title())?;
        engine.print_heading(
            &format!("{}. Introduction", numbers.next_section()),
            &TextOptions::heading(),
        )?;
        engine.print_paragraph(
            &format!(
                "This is an automatically generated benchmark report created using the \
                 YellowDog Platform, produced on {} at {} UTC.",
                self.generated_at.format("%A, %d %B"),
                self.generated_at.format("%H:%M")
            ),
            &paragraph,
        )?;
        engine.print_horizontal_line(&RuleOptions::default())?;
        engine.print_paragraph(
            "As organisations accelerate the migration of workloads to the cloud it \
             becomes increasingly important to ensure optimisation of cloud compute \
             choices for these workloads.  YellowDog has visibility of thousands of \
             different compute instance types across the major cloud providers. Compute \
             needs vary across cloud consumers, with a range of motivations to optimise \
             for cost, performance, environmental impact, and geographic locality.",
            &paragraph,
        )?;
        engine.print_paragraph(
            "This complimentary report has been generated by YellowDog's benchmarking \
             tool. To discuss more complex benchmarking needs, please speak to our support \
             team [1].",
            &paragraph,
        )?;

        enter(ReportStage::RenderInstanceTable);
        engine.print_heading(
            &format!("{}. Benchmarks and Instances", numbers.next_section()),
            &TextOptions::heading(),
        )?;
        engine.print_paragraph(
            &selected_benchmarks_sentence(&plan.benchmark_names),
            &paragraph,
        )?;
        engine.print_paragraph(&instance_count_sentence(table.len()), &paragraph)?;
        let instances = instance_table(table, &self.config.columns)?;
        engine.print_paragraph(
            &instances,
            &fixed_table_options(instance_table_font_size(table_width(&instances))),
        )?;
        engine.print_paragraph(
            &format!(
                "The '{}' is the on-demand price for the Instance Type, for the given \
                 Provider and Region, and for an OS image without additional licensing \
                 fees.",
                self.config.columns.price
            ),
            &paragraph
                .clone()
                .with_font_size(PRICE_NOTE_FONT_SIZE)
                .with_italic(true),
        )?;

        enter(ReportStage::RenderAllSections);
        for section in &plan.sections {
            self.render_section(section, &mut numbers, engine, &mut skipped)?;
        }

        enter(ReportStage::RenderReferences);
        engine.insert_page_break()?;
        engine.print_heading(
            &format!("{}. References", numbers.next_section()),
            &TextOptions::heading(),
        )?;
        print_reference(
            engine,
            &Reference::new(1, CONTACT_REFERENCE_TEXT, CONTACT_URL),
        )?;
        for reference in plan.references() {
            print_reference(engine, reference)?;
        }

        Ok(skipped)
    }

    fn render_section<W: PageWriter>(
        &self,
        section: &DocumentSection,
        numbers: &mut DocNumbers,
        engine: &mut LayoutEngine<W>,
        skipped: &mut Vec<ItemOutcome>,
    ) -> Result<(), ReportError> {
        let paragraph = TextOptions::paragraph();
        let bullet = BulletOptions::default();

        if section.page_break_before() {
            engine.insert_page_break()?;
        }
        engine.print_heading(
            &format!("{}. {}", numbers.next_section(), section.heading()),
            &TextOptions::heading(),
        )?;
        for text in section.paragraphs_before() {
            engine.print_paragraph(text, &paragraph)?;
        }
        if let Some(table) = section.table() {
            engine.print_paragraph(table, &fixed_table_options(SUMMARY_TABLE_FONT_SIZE))?;
        }
        for text in section.bullets_before() {
            engine.print_bulleted_text(text, &bullet)?;
        }
        for chart in section.charts() {
            let path = self.chart_dir.join(chart);
            if !path.is_file() {
                warn!("Chart '{}' not found; leaving it out", path.display());
                skipped.push(ItemOutcome::skipped(chart.as_str(), "chart image not found"));
                continue;
            }
            engine.print_image_file(&path, &ImageOptions::default())?;
        }
        for text in section.paragraphs_after() {
            engine.print_paragraph(text, &paragraph)?;
        }
        Ok(())
    }

    /// Reads `csv_path` and writes the PDF report to `pdf_path`.
    pub fn generate(
        &self,
        csv_path: impl AsRef<Path>,
        pdf_path: impl AsRef<Path>,
    ) -> Result<Vec<ItemOutcome>, ReportError> {
        self.generate_with(csv_path, pdf_path, |_| {})
    }

    /// Like [`ReportBuilder::generate`]; `before_write` is called with the output
    /// path once the whole report has been laid out.
    pub fn generate_with<F>(
        &self,
        csv_path: impl AsRef<Path>,
        pdf_path: impl AsRef<Path>,
        before_write: F,
    ) -> Result<Vec<ItemOutcome>, ReportError>
    where
        F: FnOnce(&Path),
    {
        enter(ReportStage::CollectInputs);
        let table = InstanceTable::from_path(csv_path)?;
        let plan = self.plan(&table);

        let fonts =
            load_report_fonts(self.config.assets.fonts_dir.as_deref()).map_err(ReportError::Fonts)?;
        let writer = GenpdfWriter::new(fonts, REPORT_TITLE).map_err(LayoutError::from)?;
        let mut engine = LayoutEngine::with_image_files(
            writer,
            self.config.assets.header_image.as_deref(),
            self.config.assets.footer_image.as_deref(),
        )?;

        let skipped = self.render(&table, &plan, &mut engine)?;

        enter(ReportStage::Finalize);
        before_write(pdf_path.as_ref());
        engine.generate_pdf_file(pdf_path)?;
        Ok(skipped)
    }
}

fn fixed_table_options(font_size: f64) -> TextOptions {
    TextOptions::paragraph()
        .with_align(Align::Center)
        .with_font_size(font_size)
        .with_bold(true)
        .with_fixed_width(true)
        .with_markdown(false)
}

fn print_reference<W: PageWriter>(
    engine: &mut LayoutEngine<W>,
    reference: &Reference,
) -> Result<(), LayoutError> {
    let paragraph = TextOptions::paragraph();
    let before = paragraph.before;
    engine.print_paragraph(
        &format!("{} {}", reference.citation(), reference.text()),
        &paragraph
            .with_align(Align::Left)
            .with_gaps(before, REFERENCE_GAP),
    )?;
    engine.print_hyperlink(
        reference.url(),
        reference.url(),
        &HyperlinkOptions {
            indent: REFERENCE_LINK_INDENT,
            before: REFERENCE_GAP,
            ..HyperlinkOptions::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testing::RecordingWriter;
    use chrono::TimeZone;

    const CSV: &str = "\
Provider,Region,Instance Type,RAM (GB),vCPUs,CPU Model,Price/Hr,LINPACK MFLOPS,CoreMark SC
aws, us-east, A, 8, 2, Xeon, 0.1, 1500, 200
aws, us-east, A, 4, 2, Xeon, 0.1, 2500,
gcp, us-west, B, 4, 1, EPYC, 0.2, 900, 300
";

    fn table() -> InstanceTable {
        InstanceTable::from_reader(CSV.as_bytes()).expect("table")
    }

    fn config(selection: &[&str]) -> Config {
        let mut config = Config::default();
        config.selection = selection.iter().map(|s| (*s).to_owned()).collect();
        config
            .metric_columns
            .insert(Metric::Linpack, "LINPACK MFLOPS".to_owned());
        config
            .metric_columns
            .insert(Metric::CoremarkSingleCore, "CoreMark SC".to_owned());
        config.assets.header_image = None;
        config.assets.footer_image = None;
        config
    }

    #[test]
    fn benchmark_sentence_lists_names() {
        assert_eq!(selected_benchmarks_sentence(&[]), "No benchmarks were selected.");
        assert_eq!(
            selected_benchmarks_sentence(&["LINPACK"]),
            "The following benchmark was selected: **LINPACK**."
        );
        assert_eq!(
            selected_benchmarks_sentence(&["CoreMark", "LINPACK"]),
            "The following benchmarks were selected: **CoreMark** and **LINPACK**."
        );
        assert_eq!(
            selected_benchmarks_sentence(&["A", "B", "C"]),
            "The following benchmarks were selected: **A**, **B**, and **C**."
        );
    }

    #[test]
    fn table_font_shrinks_with_width() {
        assert_eq!(instance_table_font_size(120), 7.0);
        assert_eq!(instance_table_font_size(100), 7.75);
        assert_eq!(instance_table_font_size(99), 8.0);
        assert_eq!(instance_table_font_size(88), 9.0);
    }

    #[test]
    fn summary_picks_best_and_worst() {
        let columns = ColumnNames::default();
        let (rows, outcomes) = performance_rows(
            &table(),
            &columns,
            &["LINPACK MFLOPS".to_owned(), "CoreMark SC".to_owned(), "Nope".to_owned()],
        );
        assert_eq!(
            rows[0],
            SummaryRow {
                benchmark: "LINPACK MFLOPS".to_owned(),
                best: "aws / us-east / A".to_owned(),
                worst: "gcp / us-west / B".to_owned(),
            }
        );
        // The empty cell is ignored when picking the best.
        assert_eq!(rows[1].best, "gcp / us-west / B");
        assert_eq!(rows[1].worst, "aws / us-east / A");
        assert_eq!(rows.len(), 2);
        assert!(!outcomes[2].is_completed());
    }

    #[test]
    fn single_row_is_both_best_and_worst() {
        let table = InstanceTable::from_reader(
            "Provider,Region,Instance Type,Score\naws,eu,m5,3\n".as_bytes(),
        )
        .expect("table");
        let (rows, _) = performance_rows(&table, &ColumnNames::default(), &["Score".to_owned()]);
        assert_eq!(rows[0].best, rows[0].worst);
    }

    #[test]
    fn instance_table_is_sorted_by_ram_then_vcpus() {
        let rendered = instance_table(&table(), &ColumnNames::default()).expect("table");
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[3].contains("gcp"));
        assert!(lines[4].contains("aws") && lines[4].contains(" 4 "));
        assert!(lines[5].contains(" 8 "));
    }

    #[test]
    fn plan_numbers_references_in_section_order() {
        let config = config(&["coremark-standard", "linpack"]);
        let builder = ReportBuilder::new(&config, "charts");
        let plan = builder.plan(&table());

        let numbers: Vec<u32> = plan.references().map(Reference::number).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5]);
        assert_eq!(plan.benchmark_names, vec!["CoreMark", "LINPACK"]);

        let headings: Vec<&str> = plan.sections.iter().map(DocumentSection::heading).collect();
        assert_eq!(
            headings,
            vec![
                "Methodology",
                "Compute Selection",
                "Benchmark Selection",
                "Benchmark Optimisation",
                "CoreMark Benchmark",
                "LINPACK Benchmark",
                "Overall Summary of Results",
                "Disclaimer",
            ]
        );
        assert!(plan.sections[4].paragraphs_before()[0].contains("[4]"));
        // CoreMark multi-core has no configured column.
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.summary_rows.len(), 2);
    }

    #[test]
    fn no_selection_has_no_summary_table() {
        let config = config(&[]);
        let plan = ReportBuilder::new(&config, "charts").plan(&table());
        let summary = plan
            .sections
            .iter()
            .find(|section| section.heading() == "Overall Summary of Results")
            .expect("summary section");
        assert!(summary.table().is_none());
    }

    #[test]
    fn render_skips_missing_charts_and_lists_references() {
        let config = config(&["linpack"]);
        let chart_dir = tempfile::tempdir().expect("tempdir");
        let builder = ReportBuilder::new(&config, chart_dir.path())
            .with_generated_at(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap());
        let table = table();
        let plan = builder.plan(&table);

        let mut engine =
            LayoutEngine::new(RecordingWriter::default(), None, None).expect("engine");
        let skipped = builder.render(&table, &plan, &mut engine).expect("rendered");

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].item(), "linpack.png");

        let text: Vec<&str> = engine
            .writer()
            .texts()
            .map(|text| text.text.as_str())
            .collect();
        assert!(text.contains(&"Tuesday,"));
        assert!(text.contains(&"14:07"));
        assert!(text.contains(&"https://yellowdog.co/contact"));
        assert!(!text.contains(&"https://github.com/eembc/coremark.git"));
        assert!(text.contains(&"https://people.sc.fsu.edu/~jburkardt/c_src/linpack_bench/linpack_bench.html"));
    }

    #[test]
    fn failed_generation_never_announces_the_file() {
        let config = config(&["linpack"]);
        let dir = tempfile::tempdir().expect("tempdir");
        let mut announced = false;
        let result = ReportBuilder::new(&config, dir.path()).generate_with(
            dir.path().join("missing.csv"),
            dir.path().join("report.pdf"),
            |_| announced = true,
        );

        assert!(matches!(result, Err(ReportError::Dataset(_))));
        assert!(!announced);
        assert!(!dir.path().join("report.pdf").exists());
    }
}
