//! Project manifest (`pyproject.toml`) loading and derived names.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Project manifest filename at the root of the working directory.
pub const PROJECT_MANIFEST: &str = "pyproject.toml";

/// The `[project]` table of `pyproject.toml`, reduced to the fields the
/// packaging pipeline consumes.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectManifest {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub license: Option<License>,
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
    pub requires_python: Option<String>,
    /// Console script bindings, `command -> "module.path:function"`.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// `project.license` appears in the wild both as an SPDX string and as
/// the older `{ text = ... }` / `{ file = ... }` table.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum License {
    Spdx(String),
    Table {
        text: Option<String>,
        file: Option<String>,
    },
}

#[derive(Deserialize, Debug)]
struct PyProject {
    project: ProjectManifest,
}

impl ProjectManifest {
    #[tracing::instrument]
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(PROJECT_MANIFEST);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let parsed: PyProject = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(parsed.project)
    }

    /// Distribution name as it appears in wheel filenames: runs of
    /// characters outside `[A-Za-z0-9.]` become a single underscore.
    pub fn dist_name(&self) -> String {
        escape_runs(&self.name, |c: char| c.is_ascii_alphanumeric() || c == '.')
    }

    /// Name of the importable package directory shipped with the
    /// project (`hulo-lang` -> `hulo_lang`).
    pub fn package_dir(&self) -> String {
        escape_runs(&self.name.to_lowercase(), |c: char| {
            c.is_ascii_alphanumeric()
        })
    }

    /// Console scripts to declare, falling back to the conventional
    /// `<name> = <package>.cli:main` binding when `[project.scripts]`
    /// is absent.
    pub fn entry_points(&self) -> Vec<(String, String)> {
        if self.scripts.is_empty() {
            vec![(
                self.name.clone(),
                format!("{}.cli:main", self.package_dir()),
            )]
        } else {
            self.scripts
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }
    }

    pub fn author(&self) -> Option<&str> {
        self.authors.first().and_then(|a| a.name.as_deref())
    }

    pub fn author_email(&self) -> Option<&str> {
        self.authors.first().and_then(|a| a.email.as_deref())
    }

    pub fn license_text(&self) -> Option<&str> {
        match &self.license {
            Some(License::Spdx(s)) => Some(s),
            Some(License::Table { text, file }) => text.as_deref().or(file.as_deref()),
            None => None,
        }
    }

    /// The `Homepage` entry of `[project.urls]`, by convention the one
    /// setuptools maps to the `url` field.
    pub fn homepage(&self) -> Option<&str> {
        self.urls
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("homepage"))
            .map(|(_, v)| v.as_str())
    }
}

fn escape_runs(name: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if keep(c) {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}
