//! Local checkout structure analysis
//!
//! Walks a directory tree, classifies every file by name, and produces a
//! report with the nested tree, per-category counts, detected languages and
//! the documentation, test and config files found.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::Result;

/// File categories, most specific first; the first match wins
const CATEGORIES: &[(&str, Matcher)] = &[
    ("test_typescript", Matcher::Suffix(&[".test.ts", ".spec.ts"])),
    ("test_go", Matcher::Suffix(&["_test.go"])),
    (
        "config",
        Matcher::Name(&[
            "package.json",
            "go.mod",
            "go.sum",
            "tsconfig.json",
            ".env",
            ".env.example",
        ]),
    ),
    (
        "docker",
        Matcher::Name(&["Dockerfile", "docker-compose.yaml", "docker-compose.yml"]),
    ),
    ("github", Matcher::PathContains(".github/workflows/")),
    ("git", Matcher::Name(&[".gitignore", ".gitattributes", ".gitmodules"])),
    ("typescript", Matcher::Suffix(&[".ts", ".tsx"])),
    ("go", Matcher::Suffix(&[".go"])),
    ("markdown", Matcher::Suffix(&[".md"])),
    ("yaml", Matcher::Suffix(&[".yaml", ".yml"])),
    ("json", Matcher::Suffix(&[".json"])),
];

const OTHER: &str = "other";

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Suffix(&'static [&'static str]),
    Name(&'static [&'static str]),
    PathContains(&'static str),
}

impl Matcher {
    fn matches(&self, name: &str, relative: &str) -> bool {
        match self {
            Matcher::Suffix(suffixes) => suffixes.iter().any(|s| name.ends_with(s)),
            Matcher::Name(names) => names.contains(&name),
            Matcher::PathContains(fragment) => relative.contains(fragment),
        }
    }
}

/// Category for a file, given its name and `/`-separated path relative to the root
pub fn classify(name: &str, relative: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(_, matcher)| matcher.matches(name, relative))
        .map(|(category, _)| *category)
        .unwrap_or(OTHER)
}

/// A node in the analysed tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    File { file_type: String },
    Directory { contents: BTreeMap<String, Node> },
}

/// Result of analysing a checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
    pub directory_structure: BTreeMap<String, Node>,
    pub file_counts: BTreeMap<String, usize>,
    pub detected_languages: Vec<String>,
    pub documentation_files: Vec<String>,
    pub test_files: Vec<String>,
    pub config_files: Vec<String>,
}

/// Analyse the tree rooted at `root`
pub fn analyze(root: &Path) -> Result<StructureReport> {
    let mut report = StructureReport::default();
    for (category, _) in CATEGORIES {
        report.file_counts.insert((*category).to_string(), 0);
    }
    report.file_counts.insert(OTHER.to_string(), 0);

    let mut languages = BTreeSet::new();
    let mut tree = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some((name, parents)) = parts.split_last() else {
            continue;
        };

        let node = if entry.file_type().is_dir() {
            Node::Directory {
                contents: BTreeMap::new(),
            }
        } else if entry.file_type().is_file() {
            let relative = parts.join("/");
            let category = classify(name, &relative);
            debug!(path = %relative, category, "Classified file");
            record(&mut report, &mut languages, category, relative);
            Node::File {
                file_type: category.to_string(),
            }
        } else {
            continue;
        };

        insert_node(&mut tree, parents, name, node);
    }

    report.directory_structure = tree;
    report.detected_languages = languages.into_iter().collect();

    Ok(report)
}

/// Place `node` under the directory named by `parents`
///
/// Walk order visits a directory before its contents, so every parent exists.
fn insert_node(tree: &mut BTreeMap<String, Node>, parents: &[String], name: &str, node: Node) {
    let mut level = tree;
    for parent in parents {
        level = match level
            .entry(parent.clone())
            .or_insert_with(|| Node::Directory {
                contents: BTreeMap::new(),
            }) {
            Node::Directory { contents } => contents,
            Node::File { .. } => return,
        };
    }
    level.insert(name.to_string(), node);
}

fn record(
    report: &mut StructureReport,
    languages: &mut BTreeSet<String>,
    category: &str,
    relative: String,
) {
    *report.file_counts.entry(category.to_string()).or_default() += 1;

    match category {
        "typescript" | "test_typescript" => {
            languages.insert("typescript".to_string());
        }
        "go" | "test_go" => {
            languages.insert("go".to_string());
        }
        _ => {}
    }

    match category {
        "markdown" => report.documentation_files.push(relative),
        "test_typescript" | "test_go" => report.test_files.push(relative),
        "config" => report.config_files.push(relative),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_prefers_specific_categories() {
        assert_eq!(classify("api.test.ts", "src/api.test.ts"), "test_typescript");
        assert_eq!(classify("main_test.go", "main_test.go"), "test_go");
        assert_eq!(classify("package.json", "package.json"), "config");
        assert_eq!(classify("docker-compose.yml", "docker-compose.yml"), "docker");
        assert_eq!(classify("ci.yml", ".github/workflows/ci.yml"), "github");
        assert_eq!(classify("index.tsx", "web/index.tsx"), "typescript");
        assert_eq!(classify("values.yaml", "chart/values.yaml"), "yaml");
        assert_eq!(classify("LICENSE", "LICENSE"), "other");
    }

    #[test]
    fn test_analyze_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("apps/api/src")).unwrap();
        std::fs::create_dir_all(root.join(".github/workflows")).unwrap();
        std::fs::write(root.join("README.md"), "# hi").unwrap();
        std::fs::write(root.join("apps/api/package.json"), "{}").unwrap();
        std::fs::write(root.join("apps/api/src/index.ts"), "").unwrap();
        std::fs::write(root.join("apps/api/src/index.test.ts"), "").unwrap();
        std::fs::write(root.join(".github/workflows/ci.yml"), "").unwrap();

        let report = analyze(root).unwrap();

        assert_eq!(report.file_counts["markdown"], 1);
        assert_eq!(report.file_counts["typescript"], 1);
        assert_eq!(report.file_counts["test_typescript"], 1);
        assert_eq!(report.file_counts["github"], 1);
        assert_eq!(report.file_counts["go"], 0);
        assert_eq!(report.detected_languages, vec!["typescript"]);
        assert_eq!(report.documentation_files, vec!["README.md"]);
        assert_eq!(report.test_files, vec!["apps/api/src/index.test.ts"]);
        assert_eq!(report.config_files, vec!["apps/api/package.json"]);

        match &report.directory_structure["apps"] {
            Node::Directory { contents } => assert!(contents.contains_key("api")),
            other => panic!("expected directory, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_nests_deep_directories_in_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("services/worker/internal/queue")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("services/worker/internal/queue/queue.go"), "").unwrap();
        std::fs::write(root.join("services/worker/internal/queue/queue_test.go"), "").unwrap();
        std::fs::write(root.join("services/worker/go.mod"), "").unwrap();
        std::fs::write(root.join("LICENSE"), "").unwrap();

        let report = analyze(root).unwrap();

        assert_eq!(report.detected_languages, vec!["go"]);
        assert_eq!(
            report.test_files,
            vec!["services/worker/internal/queue/queue_test.go"]
        );
        assert_eq!(report.config_files, vec!["services/worker/go.mod"]);
        assert_eq!(report.file_counts["other"], 1);

        let top: Vec<&String> = report.directory_structure.keys().collect();
        assert_eq!(top, vec!["LICENSE", "empty", "services"]);
        assert_eq!(
            report.directory_structure["empty"],
            Node::Directory {
                contents: BTreeMap::new()
            }
        );

        let json = serde_json::to_value(&report.directory_structure).unwrap();
        assert_eq!(
            json["services"]["contents"]["worker"]["contents"]["internal"]["contents"]["queue"]
                ["contents"]["queue.go"],
            serde_json::json!({"type": "file", "file_type": "go"})
        );
    }

    #[test]
    fn test_analyze_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(analyze(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_node_serialization_shape() {
        let node = Node::File {
            file_type: "go".to_string(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({"type": "file", "file_type": "go"}));
    }
}
