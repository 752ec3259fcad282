/*
[INPUT]:  Task type and user supplied field values
[OUTPUT]: Validated TaskPayload or per-field validation errors
[POS]:    Form layer - enumerated fields per task type
[UPDATE]: When the server adds task types or changes form fields
*/

use megaweb_adapter::{TaskPayload, TaskType};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Field values keyed by field name, as entered by the user
pub type FieldValues = BTreeMap<String, String>;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_MESSAGE: &str = "Invalid input.";
pub const UNKNOWN_MESSAGE: &str = "Unknown field.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Multi-line input
    TextArea,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Non-empty values must end with this suffix
    pub suffix: Option<&'static str>,
    /// Value sent when the field is not supplied
    pub default: Option<String>,
}

impl FieldSpec {
    fn required(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: true,
            suffix: None,
            default: None,
        }
    }

    fn optional(name: &'static str, label: &'static str, default: impl Into<String>) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            suffix: None,
            default: Some(default.into()),
        }
    }

    fn folder(default_folder: &Path) -> Self {
        Self::optional(
            "folder",
            "Folder to save the file",
            default_folder.to_string_lossy(),
        )
    }

    fn text_area(mut self) -> Self {
        self.kind = FieldKind::TextArea;
        self
    }

    fn ends_with(mut self, suffix: &'static str) -> Self {
        self.suffix = Some(suffix);
        self
    }

    fn check(&self, value: Option<&str>) -> Vec<&'static str> {
        let mut errors = Vec::new();
        let value = value.unwrap_or_default();
        if self.required && value.trim().is_empty() {
            errors.push(REQUIRED_MESSAGE);
        }
        if let Some(suffix) = self.suffix {
            if !value.is_empty() && !value.ends_with(suffix) {
                errors.push(INVALID_MESSAGE);
            }
        }
        errors
    }
}

/// Expected fields of one task type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub task_type: TaskType,
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn for_task(task_type: TaskType, default_folder: &Path) -> Self {
        let fields = match task_type {
            TaskType::SaveFile => vec![
                FieldSpec::required("url", "URL of the file to download"),
                FieldSpec::folder(default_folder),
            ],
            TaskType::DebridAndSaveFile => vec![
                FieldSpec::required("link", "Link to unrestrict"),
                FieldSpec::folder(default_folder),
                FieldSpec::optional("password", "Link password (optional)", ""),
            ],
            TaskType::DownloadMagnet => vec![
                FieldSpec::required("magnet", "Magnet Link").text_area(),
                FieldSpec::folder(default_folder),
            ],
            TaskType::DownloadTorrent => vec![
                FieldSpec::required("torrent_path", "Torrent File Path").ends_with(".torrent"),
                FieldSpec::folder(default_folder),
            ],
        };
        Self { task_type, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validate `values` and build the submission payload.
    ///
    /// The payload holds exactly the form's fields: supplied values verbatim,
    /// defaults for the ones left out. Unknown names are rejected.
    pub fn validate(&self, values: &FieldValues) -> Result<TaskPayload, FormError> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for name in values.keys() {
            if self.field(name).is_none() {
                errors
                    .entry(name.clone())
                    .or_default()
                    .push(UNKNOWN_MESSAGE.to_string());
            }
        }

        let mut payload = TaskPayload::new();
        for field in &self.fields {
            let value = values
                .get(field.name)
                .map(String::as_str)
                .or(field.default.as_deref());

            let field_errors = field.check(value);
            if !field_errors.is_empty() {
                errors
                    .entry(field.name.to_string())
                    .or_default()
                    .extend(field_errors.into_iter().map(str::to_string));
                continue;
            }

            if let Some(value) = value {
                payload.insert(field.name, value);
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(FormError::Invalid {
                task_type: self.task_type,
                errors: FieldErrors(errors),
            })
        }
    }
}

/// The forms of every known task type
#[derive(Debug, Clone)]
pub struct FormCatalog {
    forms: BTreeMap<TaskType, FormSpec>,
}

impl FormCatalog {
    pub fn new(default_folder: impl Into<PathBuf>) -> Self {
        let default_folder = default_folder.into();
        let forms = TaskType::ALL
            .into_iter()
            .map(|task_type| (task_type, FormSpec::for_task(task_type, &default_folder)))
            .collect();
        Self { forms }
    }

    pub fn get(&self, task_type: TaskType) -> &FormSpec {
        // every TaskType is inserted in new()
        &self.forms[&task_type]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormSpec> {
        self.forms.values()
    }
}

/// Messages per field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid {task_type} form: {errors}")]
    Invalid {
        task_type: TaskType,
        errors: FieldErrors,
    },

    #[error("expected FIELD=VALUE, got '{0}'")]
    MalformedAssignment(String),
}

/// Parse a `name=value` command line assignment
pub fn parse_field_assignment(raw: &str) -> Result<(String, String), FormError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| FormError::MalformedAssignment(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(FormError::MalformedAssignment(raw.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}
