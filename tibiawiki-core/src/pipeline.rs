//! Batch migration of intermediate item JSON files into one V2 item list.

use crate::config::{ItemsConfig, MalformedFilePolicy};
use crate::error::{Result, WikiError};
use crate::file_utils::{list_files_with_suffix, write_json_file};
use crate::models::{ItemV2, OldItemRecord};
use crate::transform::transform_item;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

const JSON_SUFFIX: &str = ".json";

/// Indentation of the consolidated item database.
pub const ITEMS_JSON_INDENT: usize = 4;

/// Default file name rule: drop `.json`, keep the last `_` segment.
///
/// `roomA_weapons.json` -> `weapons`, `shields.json` -> `shields`.
pub fn type_from_file_name(file_name: &str) -> String {
    let stem = file_name.replace(JSON_SUFFIX, "");
    stem.rsplit('_').next().unwrap_or_default().to_string()
}

/// Maps an intermediate file name to the item type it holds.
#[derive(Debug, Clone, Default)]
pub struct TypeLabeler {
    overrides: BTreeMap<String, String>,
}

impl TypeLabeler {
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn label(&self, file_name: &str) -> String {
        self.overrides
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| type_from_file_name(file_name))
    }
}

/// Hands out item ids 1, 2, 3, ... for a single batch.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-file result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub file_name: String,
    pub tipo: String,
    pub items: usize,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub items: Vec<ItemV2>,
    pub files: Vec<FileSummary>,
    /// Files dropped under [`MalformedFilePolicy::Skip`].
    pub skipped: Vec<String>,
}

/// Load the old-schema records of one intermediate file.
pub fn load_records(path: &Path) -> Result<Vec<OldItemRecord>> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| WikiError::MalformedJson {
        file: path.display().to_string(),
        source,
    })
}

/// Write the consolidated item list.
pub fn write_items(path: &Path, items: &[ItemV2]) -> Result<()> {
    write_json_file(path, items, ITEMS_JSON_INDENT)
}

pub struct ItemPipeline {
    labeler: TypeLabeler,
    policy: MalformedFilePolicy,
}

impl ItemPipeline {
    pub fn new(config: &ItemsConfig) -> Self {
        Self {
            labeler: TypeLabeler::new(config.type_overrides.clone()),
            policy: config.on_malformed,
        }
    }

    pub fn with_policy(mut self, policy: MalformedFilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Transform every `.json` file directly inside `input_dir`, in file name
    /// order, numbering items across the whole batch.
    pub fn run(&self, input_dir: &Path, quiet: u8) -> Result<BatchOutcome> {
        let files = list_files_with_suffix(input_dir, JSON_SUFFIX)?;
        if quiet == 0 {
            info!("Found {} item files in {:?}", files.len(), input_dir);
        }

        let mut ids = IdSequence::new();
        let mut outcome = BatchOutcome::default();

        for path in &files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let records = match load_records(path) {
                Ok(records) => records,
                Err(e @ WikiError::MalformedJson { .. }) if self.policy == MalformedFilePolicy::Skip => {
                    if quiet < 2 {
                        warn!("Skipping {}: {}", file_name, e);
                    }
                    outcome.skipped.push(file_name);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let tipo = self.labeler.label(&file_name);
            if quiet == 0 {
                info!("Processing {} items from '{}' as '{}'", records.len(), file_name, tipo);
            }

            for record in &records {
                let mut item = transform_item(record, &tipo, &file_name);
                item.id = Some(ids.next_id());
                outcome.items.push(item);
            }

            outcome.files.push(FileSummary {
                file_name,
                tipo,
                items: records.len(),
            });
        }

        tracing::debug!("Assigned {} item ids", ids.issued());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "roomB_shields.json",
            r#"[{"Nome": "Wooden Shield", "Def": "14"}]"#,
        );
        write(
            dir.path(),
            "roomA_weapons.json",
            r#"[
                {"Nome": "Sword", "Lvl": "20", "Atq": "10 physical, 5 fire"},
                {"Nome": "Machado Élfico", "Voc": "knight and paladin"}
            ]"#,
        );
        write(dir.path(), "readme.txt", "not json");
        dir
    }

    #[test]
    fn test_type_from_file_name() {
        assert_eq!(type_from_file_name("roomA_weapons.json"), "weapons");
        assert_eq!(type_from_file_name("shields.json"), "shields");
        assert_eq!(type_from_file_name("a_b_c_rings.json"), "rings");
        assert_eq!(type_from_file_name("trailing_.json"), "");
    }

    #[test]
    fn test_type_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("misc_rings.json".to_string(), "jewellery".to_string());
        let labeler = TypeLabeler::new(overrides);
        assert_eq!(labeler.label("misc_rings.json"), "jewellery");
        assert_eq!(labeler.label("misc_amulets.json"), "amulets");
    }

    #[test]
    fn test_id_sequence() {
        let mut ids = IdSequence::new();
        assert_eq!(ids.issued(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_run_assigns_ids_in_file_then_row_order() {
        let dir = fixture();
        let outcome = ItemPipeline::new(&ItemsConfig::default())
            .run(dir.path(), 2)
            .unwrap();

        let ids: Vec<_> = outcome.items.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let names: Vec<_> = outcome.items.iter().map(|i| i.nome.clone().unwrap()).collect();
        assert_eq!(names, vec!["Sword", "Machado Élfico", "Wooden Shield"]);

        assert_eq!(outcome.items[0].tipo.as_deref(), Some("weapons"));
        assert_eq!(outcome.items[0].level_minimo, 20);
        assert_eq!(outcome.items[0].atributos.dano.fogo, 5);
        assert_eq!(outcome.items[1].vocacoes, vec!["knight", "paladin"]);
        assert_eq!(outcome.items[2].tipo.as_deref(), Some("shields"));
        assert_eq!(outcome.items[2].nome_arquivo_origem.as_deref(), Some("roomB_shields.json"));
        assert_eq!(outcome.items[2].atributos.defesa, 14);

        assert_eq!(
            outcome.files,
            vec![
                FileSummary {
                    file_name: "roomA_weapons.json".to_string(),
                    tipo: "weapons".to_string(),
                    items: 2
                },
                FileSummary {
                    file_name: "roomB_shields.json".to_string(),
                    tipo: "shields".to_string(),
                    items: 1
                },
            ]
        );
    }

    #[test]
    fn test_missing_input_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = ItemPipeline::new(&ItemsConfig::default()).run(&dir.path().join("todos_os_jsons"), 2);
        assert!(matches!(result, Err(WikiError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file_aborts_by_default() {
        let dir = fixture();
        write(dir.path(), "roomC_legs.json", "[{\"Nome\": ");
        let result = ItemPipeline::new(&ItemsConfig::default()).run(dir.path(), 2);
        assert!(matches!(result, Err(WikiError::MalformedJson { .. })));
    }

    #[test]
    fn test_malformed_file_skipped_under_skip_policy() {
        let dir = fixture();
        write(dir.path(), "roomAA_legs.json", "{\"not\": \"an array\"}");
        let outcome = ItemPipeline::new(&ItemsConfig::default())
            .with_policy(MalformedFilePolicy::Skip)
            .run(dir.path(), 2)
            .unwrap();

        assert_eq!(outcome.skipped, vec!["roomAA_legs.json"]);
        let ids: Vec<_> = outcome.items.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ItemPipeline::new(&ItemsConfig::default()).run(dir.path(), 2).unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.files.is_empty());
    }

    #[test]
    fn test_output_is_idempotent() {
        let dir = fixture();
        let pipeline = ItemPipeline::new(&ItemsConfig::default());
        let first = dir.path().join("out").join("first.db");
        let second = dir.path().join("out").join("second.db");

        write_items(&first, &pipeline.run(dir.path(), 2).unwrap().items).unwrap();
        write_items(&second, &pipeline.run(dir.path(), 2).unwrap().items).unwrap();

        let first = fs::read(&first).unwrap();
        assert_eq!(first, fs::read(&second).unwrap());

        let text = String::from_utf8(first).unwrap();
        assert!(text.starts_with("[\n    {\n        \"id\": 1,\n        \"nome\": \"Sword\""));
        assert!(text.contains("Machado Élfico"));
    }
}
