//! Run configuration.
//!
//! Everything the tools learn from their environment is read exactly once into a
//! [`Config`] value, which is then handed by reference to the chart generator, the
//! report builder and the price lookup. Tests build configurations from an
//! in-memory map through [`Config::from_lookup`].

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use log::warn;

use crate::color::Rgb;

/// Pricing endpoint used when `PRICE_API_URL` is not set.
pub const DEFAULT_PRICE_API_URL: &str =
    "https://portal.yellowdog.co/api/cloudInfo/instanceTypePrices";

/// Header band image used when `REPORT_HEADER_IMAGE` is not set.
pub const DEFAULT_HEADER_IMAGE: &str = "yellowdog_header.png";

/// Footer band image used when `REPORT_FOOTER_IMAGE` is not set.
pub const DEFAULT_FOOTER_IMAGE: &str = "yellowdog_footer.png";

/// Bar colour used when `CHART_COLOR` is not set or cannot be parsed.
pub const DEFAULT_CHART_COLOR: Rgb = Rgb::new(0, 0, 255);

/// A group of metrics that is enabled or disabled as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BenchmarkFamily {
    Sysbench,
    MysqlTpcc,
    CoremarkStandard,
    CoremarkPro,
    Linpack,
}

impl BenchmarkFamily {
    /// All families in report order.
    pub const ALL: [BenchmarkFamily; 5] = [
        BenchmarkFamily::Sysbench,
        BenchmarkFamily::MysqlTpcc,
        BenchmarkFamily::CoremarkStandard,
        BenchmarkFamily::CoremarkPro,
        BenchmarkFamily::Linpack,
    ];

    /// Environment variable that may override the family identifier.
    pub fn identifier_variable(self) -> &'static str {
        match self {
            Self::Sysbench => "N_SYSBENCH",
            Self::MysqlTpcc => "N_MYSQL_TPCC",
            Self::CoremarkStandard => "N_COREMARK_STD",
            Self::CoremarkPro => "N_COREMARK_PRO",
            Self::Linpack => "N_LINPACK",
        }
    }

    /// Identifier matched against the `BENCHMARKS` allow-list.
    pub fn default_identifier(self) -> &'static str {
        match self {
            Self::Sysbench => "sysbench",
            Self::MysqlTpcc => "mysql-tpcc",
            Self::CoremarkStandard => "coremark-standard",
            Self::CoremarkPro => "coremark-pro",
            Self::Linpack => "linpack",
        }
    }

    /// Names listed in the report's "benchmarks selected" sentence.
    pub fn display_names(self) -> &'static [&'static str] {
        match self {
            Self::Sysbench => &["Sysbench CPU", "Sysbench Memory", "Sysbench Storage"],
            Self::MysqlTpcc => &["MySQL TPC-C (Sysbench)"],
            Self::CoremarkStandard => &["CoreMark"],
            Self::CoremarkPro => &["CoreMark Pro"],
            Self::Linpack => &["LINPACK"],
        }
    }

    /// Metrics charted for this family, in chart order.
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            Self::Sysbench => &[
                Metric::SysbenchSingleCore,
                Metric::SysbenchMultiCore,
                Metric::SysbenchMemory,
                Metric::SysbenchStorageReads,
                Metric::SysbenchStorageWrites,
                Metric::SysbenchStorageFsyncs,
            ],
            Self::MysqlTpcc => &[Metric::MysqlTpcc],
            Self::CoremarkStandard => &[Metric::CoremarkSingleCore, Metric::CoremarkMultiCore],
            Self::CoremarkPro => &[
                Metric::CoremarkProSingleCore,
                Metric::CoremarkProMultiCore,
            ],
            Self::Linpack => &[Metric::Linpack],
        }
    }
}

/// A single charted benchmark score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    SysbenchSingleCore,
    SysbenchMultiCore,
    SysbenchMemory,
    SysbenchStorageReads,
    SysbenchStorageWrites,
    SysbenchStorageFsyncs,
    MysqlTpcc,
    CoremarkSingleCore,
    CoremarkMultiCore,
    CoremarkProSingleCore,
    CoremarkProMultiCore,
    Linpack,
}

/// Static presentation details for a [`Metric`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub family: BenchmarkFamily,
    pub column_variable: &'static str,
    pub chart_title: &'static str,
    pub y_axis_label: &'static str,
    pub output_file: &'static str,
}

impl Metric {
    pub fn descriptor(self) -> MetricDescriptor {
        use BenchmarkFamily::*;
        let (family, column_variable, chart_title, y_axis_label, output_file) = match self {
            Self::SysbenchSingleCore => (
                Sysbench,
                "H_SYSBENCH_SC",
                "sysbench Single-Core Benchmark",
                "Events per Second",
                "sysbench-single.png",
            ),
            Self::SysbenchMultiCore => (
                Sysbench,
                "H_SYSBENCH_MC",
                "sysbench Multicore Benchmark",
                "Events per Second",
                "sysbench-multi.png",
            ),
            Self::SysbenchMemory => (
                Sysbench,
                "H_SYSBENCH_MEM",
                "sysbench Memory Benchmark",
                "Operations per Second",
                "sysbench-memory.png",
            ),
            Self::SysbenchStorageReads => (
                Sysbench,
                "H_SYSBENCH_ST_R",
                "sysbench Storage Read Performance",
                "Read Ops per Second",
                "sysbench-storage-reads.png",
            ),
            Self::SysbenchStorageWrites => (
                Sysbench,
                "H_SYSBENCH_ST_W",
                "sysbench Storage Write Performance",
                "Write Ops per Second",
                "sysbench-storage-writes.png",
            ),
            Self::SysbenchStorageFsyncs => (
                Sysbench,
                "H_SYSBENCH_ST_F",
                "sysbench Storage Fsync Performance",
                "Fsync Ops per Second",
                "sysbench-storage-fsyncs.png",
            ),
            Self::MysqlTpcc => (
                MysqlTpcc,
                "H_MYSQL_TPCC",
                "sysbench MySQL TPC-C TPS",
                "Transactions per Second",
                "sysbench-mysql-tpcc.png",
            ),
            Self::CoremarkSingleCore => (
                CoremarkStandard,
                "H_COREMARK_STD_SC",
                "CoreMark Single-Core Benchmark",
                "Benchmark Score",
                "coremark-single.png",
            ),
            Self::CoremarkMultiCore => (
                CoremarkStandard,
                "H_COREMARK_STD_MC",
                "CoreMark Multicore Benchmark",
                "Benchmark Score",
                "coremark-multi.png",
            ),
            Self::CoremarkProSingleCore => (
                CoremarkPro,
                "H_COREMARK_PRO_SC",
                "CoreMark-Pro Single-Core Benchmark",
                "Benchmark Score",
                "coremark-pro-single.png",
            ),
            Self::CoremarkProMultiCore => (
                CoremarkPro,
                "H_COREMARK_PRO_MC",
                "CoreMark-Pro Multicore Benchmark",
                "Benchmark Score",
                "coremark-pro-multi.png",
            ),
            Self::Linpack => (
                Linpack,
                "H_LINPACK",
                "LINPACK MFLOPS",
                "MFLOPS",
                "linpack.png",
            ),
        };
        MetricDescriptor {
            family,
            column_variable,
            chart_title,
            y_axis_label,
            output_file,
        }
    }
}

/// Names of the descriptive CSV columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnNames {
    pub provider: String,
    pub region: String,
    pub instance_type: String,
    pub ram: String,
    pub vcpus: String,
    pub cpu_model: String,
    pub price: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            provider: "Provider".to_owned(),
            region: "Region".to_owned(),
            instance_type: "Instance Type".to_owned(),
            ram: "RAM (GB)".to_owned(),
            vcpus: "vCPUs".to_owned(),
            cpu_model: "CPU Model".to_owned(),
            price: "Price/Hr".to_owned(),
        }
    }
}

impl ColumnNames {
    /// Columns shown in the report's instance table, in display order.
    pub fn instance_table_columns(&self) -> [&str; 7] {
        [
            &self.provider,
            &self.region,
            &self.instance_type,
            &self.ram,
            &self.vcpus,
            &self.cpu_model,
            &self.price,
        ]
    }
}

/// Credentials and endpoint for the instance price API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingConfig {
    pub endpoint: String,
    pub key: Option<String>,
    pub secret: Option<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PRICE_API_URL.to_owned(),
            key: None,
            secret: None,
        }
    }
}

/// Files the document layer needs besides the charts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetConfig {
    pub header_image: Option<PathBuf>,
    pub footer_image: Option<PathBuf>,
    pub fonts_dir: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            header_image: Some(PathBuf::from(DEFAULT_HEADER_IMAGE)),
            footer_image: Some(PathBuf::from(DEFAULT_FOOTER_IMAGE)),
            fonts_dir: None,
        }
    }
}

/// Everything the tools read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub columns: ColumnNames,
    pub selection: Vec<String>,
    pub identifiers: BTreeMap<BenchmarkFamily, String>,
    pub metric_columns: BTreeMap<Metric, String>,
    pub chart_color: Rgb,
    pub pricing: PricingConfig,
    pub assets: AssetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            selection: Vec::new(),
            identifiers: BenchmarkFamily::ALL
                .iter()
                .map(|family| (*family, family.default_identifier().to_owned()))
                .collect(),
            metric_columns: BTreeMap::new(),
            chart_color: DEFAULT_CHART_COLOR,
            pricing: PricingConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        let columns = &mut config.columns;
        for (key, slot) in [
            ("H_PROVIDER", &mut columns.provider),
            ("H_REGION", &mut columns.region),
            ("H_INSTANCE_TYPE", &mut columns.instance_type),
            ("H_RAM", &mut columns.ram),
            ("H_VCPUS", &mut columns.vcpus),
            ("H_CPU_MODEL", &mut columns.cpu_model),
            ("H_INSTANCE_PRICE", &mut columns.price),
        ] {
            if let Some(name) = value(key) {
                *slot = name;
            }
        }

        config.selection = value("BENCHMARKS")
            .map(|list| parse_selection(&list))
            .unwrap_or_default();

        for family in BenchmarkFamily::ALL {
            if let Some(identifier) = value(family.identifier_variable()) {
                config.identifiers.insert(family, identifier);
            }
            for metric in family.metrics() {
                if let Some(column) = value(metric.descriptor().column_variable) {
                    config.metric_columns.insert(*metric, column);
                }
            }
        }

        if let Some(color) = value("CHART_COLOR") {
            match Rgb::parse(&color) {
                Some(rgb) => config.chart_color = rgb,
                None => warn!(
                    "Unrecognised CHART_COLOR '{}'; using {}",
                    color, DEFAULT_CHART_COLOR
                ),
            }
        }

        if let Some(endpoint) = value("PRICE_API_URL") {
            config.pricing.endpoint = endpoint;
        }
        config.pricing.key = value("KEY");
        config.pricing.secret = value("SECRET");

        // A variable that is present but empty switches the band off.
        for (key, slot) in [
            ("REPORT_HEADER_IMAGE", &mut config.assets.header_image),
            ("REPORT_FOOTER_IMAGE", &mut config.assets.footer_image),
        ] {
            if let Some(raw) = lookup(key) {
                let raw = raw.trim();
                *slot = (!raw.is_empty()).then(|| PathBuf::from(raw));
            }
        }
        config.assets.fonts_dir = value("BENCHMARK_REPORT_FONTS_DIR").map(PathBuf::from);

        config
    }

    /// Identifier used for `family` in the allow-list.
    pub fn identifier(&self, family: BenchmarkFamily) -> &str {
        self.identifiers
            .get(&family)
            .map(String::as_str)
            .unwrap_or_else(|| family.default_identifier())
    }

    /// Whether `family` appears in the `BENCHMARKS` allow-list.
    pub fn is_active(&self, family: BenchmarkFamily) -> bool {
        let identifier = self.identifier(family);
        self.selection.iter().any(|token| token == identifier)
    }

    /// Active families in report order.
    pub fn active_families(&self) -> Vec<BenchmarkFamily> {
        BenchmarkFamily::ALL
            .into_iter()
            .filter(|family| self.is_active(*family))
            .collect()
    }

    /// Metrics of all active families, in chart order.
    pub fn active_metrics(&self) -> Vec<Metric> {
        self.active_families()
            .into_iter()
            .flat_map(|family| family.metrics().iter().copied())
            .collect()
    }

    /// CSV column bound to `metric`, if any.
    pub fn metric_column(&self, metric: Metric) -> Option<&str> {
        self.metric_columns.get(&metric).map(String::as_str)
    }
}

fn parse_selection(list: &str) -> Vec<String> {
    list.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
