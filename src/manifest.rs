//! Page manifests describe which rows and widgets an admin console
//! screen carries. The server serves the same YAML shape for a whole
//! page and for single-row refresh fragments.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::validate::FieldConstraints;
use crate::widget::traits::VariantKind;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("field `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageManifest {
    pub title: String,
    #[serde(default)]
    pub rows: Vec<RowManifest>,
}

impl PageManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// One table row. Row refresh endpoints return exactly this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RowManifest {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<FieldManifest>,
}

impl RowManifest {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldManifest {
    pub id: String,
    pub label: String,
    pub kind: VariantKind,
    /// Current display value. Defaults to what the editor derives from
    /// its own state when absent.
    #[serde(default)]
    pub value: Option<String>,
    /// Save endpoint. Unused by `roles` fields, which carry their own
    /// targets.
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub confirm: Option<String>,
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Row refresh endpoint, required by variants that re-fetch the row
    /// after saving.
    #[serde(default)]
    pub refresh: Option<String>,
    /// Opts a toggle into the row refresh it does not do by default.
    #[serde(default)]
    pub reload: bool,
    #[serde(default)]
    pub options: Vec<ChoiceManifest>,
    #[serde(default)]
    pub checks: Vec<CheckManifest>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub fields: Vec<SubFieldManifest>,
    #[serde(default)]
    pub constraints: FieldConstraints,
    #[serde(default)]
    pub roles: Option<RolesManifest>,
}

/// Options may be written as a bare string (value doubles as the shown
/// text) or as an explicit value/text pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChoiceManifest {
    Plain(String),
    Pair { value: String, text: String },
}

impl ChoiceManifest {
    pub fn value(&self) -> &str {
        match self {
            ChoiceManifest::Plain(value) => value,
            ChoiceManifest::Pair { value, .. } => value,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ChoiceManifest::Plain(value) => value,
            ChoiceManifest::Pair { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckManifest {
    pub name: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubInputKind {
    #[default]
    Text,
    Check,
    Select,
}

/// One named input of a `new-free-text-multi-value` form.
#[derive(Debug, Clone, Deserialize)]
pub struct SubFieldManifest {
    pub name: String,
    pub caption: String,
    #[serde(default)]
    pub input: SubInputKind,
    #[serde(default)]
    pub options: Vec<ChoiceManifest>,
    #[serde(default)]
    pub constraints: FieldConstraints,
}

/// Membership panel data for a `roles` field.
#[derive(Debug, Clone, Deserialize)]
pub struct RolesManifest {
    #[serde(default)]
    pub granted: Vec<RoleChipManifest>,
    #[serde(default)]
    pub available: Vec<ChoiceManifest>,
    pub add_target: String,
    pub remove_target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleChipManifest {
    pub role: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
title: Sequencing projects
rows:
  - id: project-17
    fields:
      - id: name
        label: Name
        kind: plain-text
        value: Exome batch 3
        target: /projects/17/name
        constraints:
          required: true
      - id: species
        label: Species
        kind: dropdown
        value: Homo sapiens
        target: /projects/17/species
        options:
          - value: "9606"
            text: Homo sapiens
          - value: "10090"
            text: Mus musculus
      - id: members
        label: Members
        kind: roles
        roles:
          granted:
            - role: "41"
              text: Reviewer
          available:
            - value: "42"
              text: Submitter
          add_target: /projects/17/roles/add
          remove_target: /projects/17/roles/remove
"#;

    #[test]
    fn parses_a_page_with_mixed_field_kinds() {
        let page = PageManifest::parse(PAGE).unwrap();
        assert_eq!(page.title, "Sequencing projects");
        assert_eq!(page.rows.len(), 1);
        let row = &page.rows[0];
        assert_eq!(row.id, "project-17");
        assert_eq!(row.fields[0].kind, VariantKind::PlainText);
        assert!(row.fields[0].constraints.required);
        assert_eq!(row.fields[1].options[1].value(), "10090");
        let roles = row.fields[2].roles.as_ref().unwrap();
        assert_eq!(roles.granted[0].text, "Reviewer");
        assert_eq!(roles.available[0].value(), "42");
    }

    #[test]
    fn plain_options_use_the_value_as_text() {
        let yaml = r#"
id: row-1
fields:
  - id: status
    label: Status
    kind: dropdown
    target: /status
    options: [open, closed]
"#;
        let row = RowManifest::parse(yaml).unwrap();
        let options = &row.fields[0].options;
        assert_eq!(options[0].value(), "open");
        assert_eq!(options[0].text(), "open");
    }

    #[test]
    fn unknown_kinds_are_rejected_at_parse_time() {
        let yaml = r#"
id: row-1
fields:
  - id: status
    label: Status
    kind: slider
    target: /status
"#;
        assert!(matches!(
            RowManifest::parse(yaml),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn loads_a_page_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin.yaml");
        std::fs::write(&path, PAGE).unwrap();
        let page = PageManifest::load(&path).unwrap();
        assert_eq!(page.title, "Sequencing projects");
        assert_eq!(page.rows[0].fields.len(), 3);
    }

    #[test]
    fn missing_files_report_the_path() {
        let err = PageManifest::load("/nonexistent/admin.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/admin.yaml"));
    }
}
