//! NA Kasem CRM sales analytics.
//!
//! Folds the dashboard's sales notes (and optionally its client directory)
//! into summary KPIs, revenue breakdowns by region, product and client, and
//! a bucketed revenue timeline. The engine in [`analysis`] is pure and
//! synchronous; [`data`], [`report`] and [`insights`] cover loading exports,
//! rendering reports and preparing prompts for an external AI layer.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod insights;
pub mod models;
pub mod report;

pub use analysis::{
    filter_notes_by_range, parse_doc_date, sales_by_client, sales_by_product, sales_by_region,
    sales_summary, sales_timeline,
};
pub use models::{Client, DateRange, Granularity, LineItem, SalesNote};
