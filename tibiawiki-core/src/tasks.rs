//! Task list extraction from saved task room pages.

use crate::error::{Result, WikiError};
use crate::file_utils::read_text_file;
use crate::models::{Task, TaskRewards};
use scraper::{ElementRef, Html, Selector};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Room name used when a page has no title block.
pub const UNKNOWN_ROOM: &str = "Sala Desconhecida";

/// Font color marking a primary reward.
const PRIMARY_REWARD_COLOR: &str = "#27ae60";
/// Font color marking a secondary reward.
const SECONDARY_REWARD_COLOR: &str = "#e74c3c";

/// Indentation of `tasks.json`.
pub const TASKS_JSON_INDENT: usize = 2;

/// Task room pages processed when no files are given.
pub const DEFAULT_ROOM_FILES: [&str; 5] = [
    "lothloriens-room.txt",
    "executioneer-room.txt",
    "morguls-room.txt",
    "corrupteds-room.txt",
    "nzoths-room.txt",
];

struct Selectors {
    room: Selector,
    table: Selector,
    tr: Selector,
    td: Selector,
    bold: Selector,
    font: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| WikiError::Config(format!("Invalid selector {:?}: {}", css, e)))
        };
        Ok(Self {
            room: parse("div.Text")?,
            table: parse("table.TableContent")?,
            tr: parse("tr")?,
            td: parse("td")?,
            bold: parse("b")?,
            font: parse("font")?,
        })
    }
}

fn trimmed_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_int(text: &str, what: &str) -> Result<i64> {
    text.parse()
        .map_err(|e| WikiError::Parse(format!("invalid {} {:?}: {}", what, text, e)))
}

/// Reward text is the text node right after each colored `font` tag.
fn parse_rewards(cell: ElementRef, font: &Selector) -> TaskRewards {
    let mut rewards = TaskRewards::default();

    for tag in cell.select(font) {
        let target = match tag.value().attr("color") {
            Some(PRIMARY_REWARD_COLOR) => &mut rewards.primary,
            Some(SECONDARY_REWARD_COLOR) => &mut rewards.secondary,
            _ => continue,
        };

        let Some(cleaned) = tag
            .next_sibling()
            .and_then(|node| node.value().as_text().map(|t| t.trim().replace('•', "").trim().to_string()))
        else {
            continue;
        };

        if !cleaned.is_empty() {
            target.push(cleaned);
        }
    }

    rewards
}

fn parse_task_row(cells: &[ElementRef], room_name: &str, sel: &Selectors) -> Result<Task> {
    let task_number = parse_int(&trimmed_text(cells[0]), "task number")?;

    let task_name = cells[1]
        .select(&sel.bold)
        .next()
        .map(trimmed_text)
        .ok_or_else(|| WikiError::Parse("task name has no <b> tag".to_string()))?;

    let amount = parse_int(&trimmed_text(cells[2]).replace('.', ""), "amount")?;
    let creatures = trimmed_text(cells[3]);
    let rewards = parse_rewards(cells[4], &sel.font);

    Ok(Task {
        room_name: room_name.to_string(),
        task_number,
        task_name,
        amount,
        creatures,
        rewards,
    })
}

/// Parse every task of one task room page.
///
/// Rows that do not have the five expected cells are ignored; rows with
/// unreadable values are skipped with a warning. Warnings follow the usual
/// `quiet` levels and are silenced at 2.
pub fn parse_task_room(html: &str, source: &str, quiet: u8) -> Result<Vec<Task>> {
    let sel = Selectors::new()?;
    let document = Html::parse_document(html);

    let room_name = match document.select(&sel.room).next() {
        Some(div) => trimmed_text(div),
        None => {
            if quiet < 2 {
                warn!("Room name not found in {}", source);
            }
            UNKNOWN_ROOM.to_string()
        }
    };

    let Some(table) = document.select(&sel.table).nth(1) else {
        if quiet < 2 {
            warn!("No task table found in {}", source);
        }
        return Ok(Vec::new());
    };

    let mut tasks = Vec::new();
    for row in table.select(&sel.tr).skip(1) {
        let cells: Vec<ElementRef> = row.select(&sel.td).collect();
        if cells.len() != 5 {
            continue;
        }

        match parse_task_row(&cells, &room_name, &sel) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                if quiet < 2 {
                    warn!("Skipping malformed row in {}: {}", source, e);
                }
            }
        }
    }

    Ok(tasks)
}

/// Parse the given room pages in order. Missing pages are logged and skipped.
pub fn extract_tasks(files: &[PathBuf], quiet: u8) -> Result<Vec<Task>> {
    let mut all_tasks = Vec::new();

    for path in files {
        if !path.exists() {
            if quiet < 2 {
                error!("File {:?} not found, skipping", path);
            }
            continue;
        }

        if quiet == 0 {
            info!("Processing {:?}", path);
        }
        let html = read_text_file(path)?;
        all_tasks.extend(parse_task_room(&html, &path.display().to_string(), quiet)?);
    }

    Ok(all_tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = r##"
<html><body>
<div class="Text"> Lothlorien's Room </div>
<table class="TableContent"><tr><td>menu</td></tr></table>
<table class="TableContent">
  <tr><td>#</td><td>Task</td><td>Amount</td><td>Creatures</td><td>Rewards</td></tr>
  <tr>
    <td> 1 </td>
    <td><b> Rotworm Hunt </b><br/>easy</td>
    <td>1.500</td>
    <td> Rotworm, Carrion Worm </td>
    <td><font color="#27ae60">+</font> • 5000 gold <br/><font color="#e74c3c">-</font> 2 rotworm trophies<br/><font color="#000000">*</font> nothing</td>
  </tr>
  <tr>
    <td>two</td><td><b>Broken</b></td><td>10</td><td>Rats</td><td></td>
  </tr>
  <tr>
    <td>3</td><td>No bold</td><td>10</td><td>Rats</td><td></td>
  </tr>
  <tr><td colspan="5">footer</td></tr>
  <tr>
    <td>4</td><td><b>Dragon Slayer</b></td><td>200</td><td>Dragon</td><td><font color="#27ae60">+</font><i>styled</i></td>
  </tr>
</table>
</body></html>
"##;

    #[test]
    fn test_parse_task_room() {
        let tasks = parse_task_room(ROOM, "room.txt", 0).unwrap();
        assert_eq!(tasks.len(), 2);

        let first = &tasks[0];
        assert_eq!(first.room_name, "Lothlorien's Room");
        assert_eq!(first.task_number, 1);
        assert_eq!(first.task_name, "Rotworm Hunt");
        assert_eq!(first.amount, 1500);
        assert_eq!(first.creatures, "Rotworm, Carrion Worm");
        assert_eq!(first.rewards.primary, vec!["5000 gold"]);
        assert_eq!(first.rewards.secondary, vec!["2 rotworm trophies"]);

        let last = &tasks[1];
        assert_eq!(last.task_number, 4);
        assert_eq!(last.task_name, "Dragon Slayer");
        assert!(last.rewards.primary.is_empty());
    }

    #[test]
    fn test_unknown_room_and_missing_table() {
        let html = r#"<table class="TableContent"></table>"#;
        assert!(parse_task_room(html, "x", 0).unwrap().is_empty());

        let html = ROOM.replace("class=\"Text\"", "class=\"Title\"");
        let tasks = parse_task_room(&html, "x", 0).unwrap();
        assert_eq!(tasks[0].room_name, UNKNOWN_ROOM);
    }

    #[test]
    fn test_silenced_warnings_do_not_change_results() {
        let loud = parse_task_room(ROOM, "room.txt", 0).unwrap();
        let silent = parse_task_room(ROOM, "room.txt", 2).unwrap();
        assert_eq!(loud, silent);

        let html = ROOM.replace("class=\"Text\"", "class=\"Title\"");
        let silent = parse_task_room(&html, "x", 2).unwrap();
        assert_eq!(silent.len(), 2);
        assert_eq!(silent[0].room_name, UNKNOWN_ROOM);
        assert!(parse_task_room("<html></html>", "x", 2).unwrap().is_empty());
    }

    #[test]
    fn test_extract_tasks_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let room = dir.path().join("lothloriens-room.txt");
        std::fs::write(&room, ROOM).unwrap();

        let files = vec![dir.path().join("nzoths-room.txt"), room];
        let tasks = extract_tasks(&files, 2).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn test_task_json_layout() {
        let tasks = parse_task_room(ROOM, "room.txt", 0).unwrap();
        let json = crate::file_utils::to_json_string(&tasks[..1], TASKS_JSON_INDENT).unwrap();
        assert!(json.starts_with("[\n  {\n    \"room_name\": \"Lothlorien's Room\",\n    \"task_number\": 1,"));
        assert!(json.contains("\"rewards\": {\n      \"primary\": [\n        \"5000 gold\""));
    }
}
