pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod pages;
pub mod report;
pub mod session;
pub mod taxonomy;
pub mod views;

#[cfg(test)]
mod testing;

pub use cache::{AnalyticsCache, Slot};
pub use client::{AnalyticsSource, FileAnalyticsSource, HttpAnalyticsClient, QueryKey};
pub use config::Config;
pub use error::{DashboardError, FetchError};
pub use filters::FilterState;
pub use pages::{compose, Page, PageKind, RenderedPage, Viewer};
pub use session::DashboardSession;
