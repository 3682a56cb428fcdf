//! Template catalog and loader.
//!
//! Templates are YAML files, one per template. A built-in catalog is
//! compiled into the binary; a configured directory adds or overrides
//! entries by name. Every entry is validated when the catalog is loaded, so
//! instantiating a loaded template cannot fail.
//!
//! Instantiation clones the template's blocks into fresh values with new
//! block ids and new question/card ids. Nothing in a new document aliases
//! the catalog or any other document made from the same template.

use std::collections::BTreeMap;
use std::path::Path;

use lectern_sdk::types::{
    Block, BlockData, BlockId, BlockKind, LeafData, generate_entry_id,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::block_types::BlockKindRegistry;
use super::document::Document;
use crate::error::{EditorError, EditorResult};

/// Template files larger than this are rejected.
const MAX_TEMPLATE_FILE_SIZE: u64 = 1024 * 1024;

/// Catalog compiled into the binary: `(file name, YAML source)`.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "intro-lesson.yml",
        include_str!("../../templates/intro-lesson.yml"),
    ),
    (
        "vocabulary-drill.yml",
        include_str!("../../templates/vocabulary-drill.yml"),
    ),
    (
        "lab-walkthrough.yml",
        include_str!("../../templates/lab-walkthrough.yml"),
    ),
    ("side-by-side.yml", include_str!("../../templates/side-by-side.yml")),
];

/// On-disk form of a template.
#[derive(Debug, Deserialize)]
struct TemplateFile {
    name: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    blocks: Vec<TemplateRecord>,
}

/// One block-like entry in a template file. No id: ids are assigned when
/// the template is instantiated.
#[derive(Debug, Deserialize)]
struct TemplateRecord {
    kind: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// A validated template entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBlock {
    pub content: Option<String>,
    pub data: BlockData,
}

impl TemplateBlock {
    pub fn kind(&self) -> BlockKind {
        self.data.kind()
    }
}

/// A named, read-only catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    blocks: Vec<TemplateBlock>,
}

/// Listing row for a template, for pickers and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub blocks: usize,
}

impl Template {
    pub fn blocks(&self) -> &[TemplateBlock] {
        &self.blocks
    }

    /// Fresh, independent blocks for a new document.
    pub fn instantiate(&self) -> Vec<Block> {
        instantiate(&self.blocks)
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            blocks: self.blocks.len(),
        }
    }
}

/// Clone template entries into new blocks with fresh ids.
pub fn instantiate(entries: &[TemplateBlock]) -> Vec<Block> {
    entries
        .iter()
        .map(|entry| {
            let mut data = entry.data.clone();
            refresh_entry_ids(&mut data);
            Block {
                id: BlockId::generate(),
                content: entry.content.clone(),
                data,
            }
        })
        .collect()
}

/// Give every question and card (including those in split slots) a new id.
fn refresh_entry_ids(data: &mut BlockData) {
    match data {
        BlockData::Leaf(leaf) => refresh_leaf_ids(leaf),
        BlockData::Split(split) => {
            for sub in [&mut split.left, &mut split.right].into_iter().flatten() {
                refresh_leaf_ids(&mut sub.data);
            }
        }
    }
}

fn refresh_leaf_ids(leaf: &mut LeafData) {
    match leaf {
        LeafData::Quiz(quiz) => {
            for q in &mut quiz.questions {
                q.id = generate_entry_id();
            }
        }
        LeafData::FlashcardDeck(deck) => {
            for card in &mut deck.cards {
                card.id = generate_entry_id();
            }
        }
        _ => {}
    }
}

/// All known templates, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> EditorResult<Self> {
        let mut catalog = Self::new();
        for (file_name, source) in BUILTIN_TEMPLATES {
            catalog.add_yaml(file_name, source)?;
        }
        debug!(templates = catalog.len(), "loaded built-in template catalog");
        Ok(catalog)
    }

    /// Built-in catalog plus an optional directory of overrides.
    pub async fn load(extra_dir: Option<&Path>) -> EditorResult<Self> {
        let mut catalog = Self::builtin()?;
        if let Some(dir) = extra_dir {
            catalog.load_dir(dir).await?;
        }
        Ok(catalog)
    }

    /// Parse one YAML template and add it, replacing any entry of the same name.
    pub fn add_yaml(&mut self, source_name: &str, yaml: &str) -> EditorResult<()> {
        let template = parse_template(source_name, yaml)?;
        if self.templates.contains_key(&template.name) {
            info!(template = %template.name, source = source_name, "template overridden");
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Load every `.yml`/`.yaml` file in `dir`. Returns the number loaded.
    ///
    /// Hidden files, symlinks and other extensions are skipped. Any file
    /// that fails to parse or validate fails the whole load.
    pub async fn load_dir(&mut self, dir: &Path) -> EditorResult<usize> {
        let dir_name = dir.display().to_string();
        let load_error = |details: String| EditorError::TemplateLoad {
            source_name: dir_name.clone(),
            details,
        };

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| load_error(format!("failed to read directory: {e}")))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| load_error(e.to_string()))?
        {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "skipping template file with non-UTF-8 name");
                continue;
            };
            if name.starts_with('.') || !(name.ends_with(".yml") || name.ends_with(".yaml")) {
                continue;
            }
            paths.push(path);
        }
        // read_dir order is platform-dependent.
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let source_name = path.display().to_string();
            let metadata = tokio::fs::symlink_metadata(&path)
                .await
                .map_err(|e| template_error(&source_name, e))?;
            if metadata.file_type().is_symlink() {
                warn!(file = %source_name, "skipping symlinked template");
                continue;
            }
            if metadata.len() > MAX_TEMPLATE_FILE_SIZE {
                return Err(template_error(
                    &source_name,
                    format!(
                        "file size {} bytes exceeds limit of {MAX_TEMPLATE_FILE_SIZE} bytes",
                        metadata.len()
                    ),
                ));
            }
            let yaml = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| template_error(&source_name, e))?;
            self.add_yaml(&source_name, &yaml)?;
            loaded += 1;
        }

        info!(dir = %dir.display(), loaded, "loaded template directory");
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> EditorResult<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| EditorError::UnknownTemplate(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn summaries(&self) -> Vec<TemplateSummary> {
        self.iter().map(Template::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Start a new document from the named template.
    pub fn new_document(&self, name: &str) -> EditorResult<Document> {
        let template = self.get(name)?;
        info!(template = name, blocks = template.blocks.len(), "instantiating template");
        Ok(Document::from_blocks(template.instantiate()))
    }

    /// Replace `doc` with a fresh instantiation of the named template.
    pub fn apply(&self, name: &str, doc: &mut Document) -> EditorResult<()> {
        let template = self.get(name)?;
        doc.replace_all(template.instantiate());
        Ok(())
    }
}

fn template_error(source_name: &str, details: impl ToString) -> EditorError {
    EditorError::TemplateLoad {
        source_name: source_name.to_string(),
        details: details.to_string(),
    }
}

fn parse_template(source_name: &str, yaml: &str) -> EditorResult<Template> {
    let file: TemplateFile = serde_yml::from_str(yaml)
        .map_err(|e| template_error(source_name, format!("invalid template YAML: {e}")))?;

    if file.name.trim().is_empty() {
        return Err(template_error(source_name, "template name is empty"));
    }

    let mut blocks = Vec::with_capacity(file.blocks.len());
    for (i, record) in file.blocks.into_iter().enumerate() {
        let kind: BlockKind = record.kind.parse().map_err(|_| {
            template_error(
                source_name,
                format!("{}: entry {i}: unknown block kind '{}'", file.name, record.kind),
            )
        })?;
        let data = BlockData::from_value(kind, record.data)
            .map_err(|e| template_error(source_name, format!("{}: entry {i}: {e}", file.name)))?;
        blocks.push(TemplateBlock {
            content: record.content,
            data,
        });
    }

    let template = Template {
        name: file.name,
        title: file.title,
        description: file.description,
        category: file.category,
        blocks,
    };

    // Validate the instantiated form, so shape problems surface at load time.
    let errors = BlockKindRegistry::with_standard_kinds().validate_document(&template.instantiate());
    if !errors.is_empty() {
        return Err(template_error(
            source_name,
            format!("{}: {}", template.name, errors.join("; ")),
        ));
    }

    debug!(template = %template.name, source = source_name, "parsed template");
    Ok(template)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: minimal
title: Minimal
blocks:
  - kind: text
    content: "<p>Hello</p>"
  - kind: divider
"#;

    #[test]
    fn builtin_catalog_loads_and_validates() {
        let catalog = TemplateCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), BUILTIN_TEMPLATES.len());
        for name in ["intro-lesson", "vocabulary-drill", "lab-walkthrough", "side-by-side"] {
            assert!(catalog.get(name).is_ok(), "missing built-in template {name}");
        }
    }

    #[test]
    fn unknown_template_is_an_error() {
        let catalog = TemplateCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.get("nope"),
            Err(EditorError::UnknownTemplate(name)) if name == "nope"
        ));
    }

    #[test]
    fn entries_keep_kind_and_content() {
        let mut catalog = TemplateCatalog::new();
        catalog.add_yaml("minimal.yml", MINIMAL).unwrap();
        let blocks = catalog.get("minimal").unwrap().instantiate();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind(), BlockKind::Text);
        assert_eq!(blocks[0].content.as_deref(), Some("<p>Hello</p>"));
        assert_eq!(blocks[1].kind(), BlockKind::Divider);
    }

    #[test]
    fn unknown_kind_fails_the_load() {
        let yaml = "name: bad\ntitle: Bad\nblocks:\n  - kind: carousel\n";
        let err = TemplateCatalog::new().add_yaml("bad.yml", yaml).unwrap_err();
        let EditorError::TemplateLoad { source_name, details } = err else {
            panic!("expected TemplateLoad");
        };
        assert_eq!(source_name, "bad.yml");
        assert!(details.contains("carousel"), "{details}");
    }

    #[test]
    fn malformed_payload_fails_the_load() {
        let yaml = r#"
name: ragged
title: Ragged
blocks:
  - kind: table
    data:
      headers: [A, B]
      rows:
        - [only one]
"#;
        let err = TemplateCatalog::new().add_yaml("ragged.yml", yaml).unwrap_err();
        assert!(err.to_string().contains("row 0 has 1 cells"), "{err}");
    }

    #[test]
    fn nested_split_fails_the_load() {
        let yaml = r#"
name: nested
title: Nested
blocks:
  - kind: split
    data:
      left:
        kind: split
"#;
        assert!(TemplateCatalog::new().add_yaml("nested.yml", yaml).is_err());
    }

    #[test]
    fn later_entries_override_by_name() {
        let mut catalog = TemplateCatalog::new();
        catalog.add_yaml("a.yml", MINIMAL).unwrap();
        catalog
            .add_yaml("b.yml", "name: minimal\ntitle: Replaced\nblocks: []\n")
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("minimal").unwrap().title, "Replaced");
    }

    #[test]
    fn instantiation_regenerates_quiz_and_card_ids() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let template = catalog.get("intro-lesson").unwrap();
        let first = template.instantiate();
        let second = template.instantiate();

        let question_ids = |blocks: &[Block]| -> Vec<String> {
            blocks
                .iter()
                .filter_map(|b| match b.as_leaf() {
                    Some(LeafData::Quiz(q)) => Some(q.questions.iter().map(|q| q.id.clone())),
                    _ => None,
                })
                .flatten()
                .collect()
        };
        let a = question_ids(&first);
        let b = question_ids(&second);
        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|id| !id.is_empty()));
        assert!(a.iter().all(|id| !b.contains(id)));
    }

    #[test]
    fn summaries_are_sorted_by_name() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let names: Vec<_> = catalog.summaries().into_iter().map(|s| s.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
