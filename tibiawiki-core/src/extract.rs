//! Item table extraction from saved TibiaWiki pages.
//!
//! Each saved page holds one item table (`<table id="tabelaDPL">`). Every body
//! row becomes a flat [`RawRow`] keyed by the column header, with the image
//! column resolved to an absolute URL. The rows are written as intermediate
//! JSON files that the item pipeline later consumes.

use crate::config::ExtractConfig;
use crate::error::{Result, WikiError};
use crate::file_utils::{find_files_with_extension, read_text_file, write_json_file};
use crate::models::RawRow;
use rayon::prelude::*;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Header given to the first column without a title (the item picture).
pub const IMAGE_COLUMN: &str = "Imagem_URL";

/// Indentation of the intermediate JSON files.
pub const ROWS_JSON_INDENT: usize = 4;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| WikiError::Config(format!("Invalid selector {:?}: {}", css, e)))
}

/// Turn a header cell into a column label: trimmed text, spaces as `_`.
fn header_label(th: ElementRef) -> String {
    th.text()
        .map(str::trim)
        .collect::<String>()
        .replace("\\n", " ")
        .replace(' ', "_")
}

/// Text of a cell with all runs of whitespace collapsed to one space.
fn cell_text(td: ElementRef) -> String {
    td.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn image_url(td: ElementRef, img: &Selector, base_url: &str) -> Value {
    td.select(img)
        .next()
        .and_then(|tag| tag.value().attr("src"))
        .map(|src| Value::String(format!("{}{}", base_url, src)))
        .unwrap_or(Value::Null)
}

/// Extract the rows of the configured item table from an HTML document.
pub fn extract_table_rows(html: &str, config: &ExtractConfig) -> Result<Vec<RawRow>> {
    let document = Html::parse_document(html);

    let table_sel = selector(&format!("table[id=\"{}\"]", config.table_id))?;
    let thead_sel = selector("thead")?;
    let th_sel = selector("th")?;
    let tbody_sel = selector("tbody")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;
    let img_sel = selector("img")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| WikiError::MissingTable(format!("no table with id '{}'", config.table_id)))?;

    let thead = table
        .select(&thead_sel)
        .next()
        .ok_or_else(|| WikiError::MissingTable("table has no header (thead)".to_string()))?;

    let mut headers: Vec<String> = thead.select(&th_sel).map(header_label).collect();
    let image_col = headers.iter().position(String::is_empty);
    if let Some(idx) = image_col {
        headers[idx] = IMAGE_COLUMN.to_string();
    }

    let tbody = table
        .select(&tbody_sel)
        .next()
        .ok_or_else(|| WikiError::MissingTable("table has no body (tbody)".to_string()))?;

    let mut rows = Vec::new();
    for tr in tbody.select(&tr_sel) {
        let mut row = RawRow::new();
        for (i, td) in tr.select(&td_sel).enumerate().take(headers.len()) {
            let value = if Some(i) == image_col {
                image_url(td, &img_sel, &config.base_url)
            } else {
                Value::String(cell_text(td))
            };
            row.insert(headers[i].clone(), value);
        }

        if !row.is_empty() {
            row.shift_remove("");
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Name of the intermediate JSON for a page found at `relative_dir/file_name`.
///
/// Directory components become an `_`-joined prefix, so
/// `weapons/swords.txt` maps to `weapons_swords.json`.
pub fn output_file_name(relative_dir: &Path, file_name: &str) -> String {
    let base = file_name.replace(".txt", "");
    let prefix = relative_dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("_");

    if prefix.is_empty() {
        format!("{}.json", base)
    } else {
        format!("{}_{}.json", prefix, base)
    }
}

/// What happened to one saved page.
#[derive(Debug)]
pub enum PageOutcome {
    Written { output: PathBuf, rows: usize },
    NoTable { reason: String },
    Failed { error: WikiError },
}

/// Summary of an [`extract_directory`] run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub written: usize,
    pub rows: usize,
    pub without_table: usize,
    pub failed: usize,
    /// Pages not extracted because a later page maps to the same output file.
    pub shadowed: usize,
}

impl ExtractReport {
    pub fn add_outcome(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Written { rows, .. } => {
                self.written += 1;
                self.rows += rows;
            }
            PageOutcome::NoTable { .. } => self.without_table += 1,
            PageOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Extract one saved page into `output`.
pub fn extract_page(page: &Path, output: &Path, config: &ExtractConfig) -> PageOutcome {
    let html = match read_text_file(page) {
        Ok(html) => html,
        Err(error) => return PageOutcome::Failed { error },
    };

    match extract_table_rows(&html, config) {
        Ok(rows) => match write_json_file(output, &rows, ROWS_JSON_INDENT) {
            Ok(()) => PageOutcome::Written {
                output: output.to_path_buf(),
                rows: rows.len(),
            },
            Err(error) => PageOutcome::Failed { error },
        },
        Err(WikiError::MissingTable(reason)) => PageOutcome::NoTable { reason },
        Err(error) => PageOutcome::Failed { error },
    }
}

/// Keep only the last page (in walk order) for every output file.
///
/// Different paths can share an output name (`a_b/c.txt` and `a/b_c.txt`
/// both give `a_b_c.json`). Returns the surviving pages in walk order and the
/// dropped ones paired with the page that replaced them.
fn resolve_output_clashes(
    pages: Vec<(PathBuf, PathBuf)>,
) -> (Vec<(PathBuf, PathBuf)>, Vec<(PathBuf, PathBuf)>) {
    let mut last: HashMap<PathBuf, usize> = HashMap::new();
    for (i, (_, output)) in pages.iter().enumerate() {
        last.insert(output.clone(), i);
    }

    let winners: Vec<PathBuf> = pages.iter().map(|(_, output)| pages[last[output]].0.clone()).collect();

    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for (i, (page, output)) in pages.into_iter().enumerate() {
        if last[&output] == i {
            kept.push((page, output));
        } else {
            dropped.push((page, winners[i].clone()));
        }
    }
    (kept, dropped)
}

/// Extract every `.txt` page below `root` into `output_dir`.
///
/// Pages inside a directory whose path mentions the output directory's name
/// are ignored so previous output is never re-read. A page that cannot be
/// extracted is reported and skipped. When two pages map to the same output
/// file, only the one found last is extracted.
pub fn extract_directory(
    root: &Path,
    output_dir: &Path,
    config: &ExtractConfig,
    quiet: u8,
) -> Result<ExtractReport> {
    std::fs::create_dir_all(output_dir)?;
    let output_name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let pages: Vec<(PathBuf, PathBuf)> = find_files_with_extension(root, "txt")?
        .into_iter()
        .filter_map(|page| {
            let relative_dir = page.parent()?.strip_prefix(root).ok()?.to_path_buf();
            if !output_name.is_empty() && relative_dir.to_string_lossy().contains(&output_name) {
                return None;
            }
            let file_name = page.file_name()?.to_string_lossy().to_string();
            let output = output_dir.join(output_file_name(&relative_dir, &file_name));
            Some((page, output))
        })
        .collect();

    if quiet == 0 {
        info!("Found {} saved pages under {:?}", pages.len(), root);
    }

    let (pages, dropped) = resolve_output_clashes(pages);
    if quiet < 2 {
        for (page, winner) in &dropped {
            warn!("Skipping {:?}: its output file is also produced by {:?}", page, winner);
        }
    }

    let outcomes: Vec<(PathBuf, PageOutcome)> = pages
        .par_iter()
        .map(|(page, output)| (page.clone(), extract_page(page, output, config)))
        .collect();

    let mut report = ExtractReport {
        shadowed: dropped.len(),
        ..Default::default()
    };
    for (page, outcome) in &outcomes {
        report.add_outcome(outcome);
        match outcome {
            PageOutcome::Written { output, rows } => {
                if quiet == 0 {
                    info!("{:?}: {} rows saved to {:?}", page, rows, output);
                }
            }
            PageOutcome::NoTable { reason } => {
                if quiet < 2 {
                    warn!("{:?}: {}", page, reason);
                }
            }
            PageOutcome::Failed { error } => {
                if quiet < 2 {
                    warn!("Failed to extract {:?}: {}", page, error);
                }
            }
        }
    }

    Ok(report)
}
