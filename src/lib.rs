//! Export a Cara food diary from the dashboard API.
//! Fetches one page of diary entries, keeps meal photos on disk and renders
//! the entries, grouped by day, into a static HTML report.

pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod images;
pub mod models;
pub mod report;

pub use client::{Client, DiaryApi, EntriesQuery, ImageResponse};
pub use config::Config;
pub use error::{ApiError, CaraError};
pub use extractor::{DataExtractor, RunReport, date_window};
pub use images::{ImageOutcome, ImageStore, ImageSummary};
pub use models::{DayGroup, DiaryEntry, EntriesPage, GroupedEntries, MealItem, group_by_date};
