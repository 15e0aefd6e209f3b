//! Core library for TibiaWiki item and task data extraction.

pub mod attributes;
pub mod config;
pub mod error;
pub mod extract;
pub mod file_utils;
pub mod models;
pub mod pipeline;
pub mod tasks;
pub mod transform;

pub use error::{Result, WikiError};
pub use pipeline::{ItemPipeline, write_items};
pub use transform::transform_item;
