//! Core entry point for the benchmark_report crate.
//!
//! The crate turns a CSV of cloud instance benchmark results into bar charts
//! ([`charts`]) and a paginated PDF report ([`report`]), and looks up on-demand
//! instance prices ([`pricing`]). All tools read their settings once into a
//! [`config::Config`].

pub mod charts;
pub mod color;
pub mod config;
pub mod dataset;
pub mod fonts;
pub mod images;
pub mod labels;
pub mod layout;
pub mod links;
pub mod model;
pub mod outcome;
pub mod pricing;
pub mod report;
pub mod richtext;
pub mod table;
pub mod writer;
