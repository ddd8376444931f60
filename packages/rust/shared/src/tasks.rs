//! Task file loading: the ordered list of seed URLs to crawl.
//!
//! The task file is a JSON array of descriptors:
//!
//! ```json
//! [{ "url": "https://example.com", "depth": 2 }]
//! ```
//!
//! `depth` defaults to 1. The older `profundidad` key is accepted as an alias,
//! and a file holding a single descriptor object is read as a one-item list.
//! Entries are decoded one by one, so a badly typed entry only costs itself.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, SiteDocError};
use crate::types::CrawlTask;

/// Default task file name, looked up in the working directory.
pub const DEFAULT_TASKS_FILE: &str = "urls.json";

/// One entry of the task file, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(
        default,
        alias = "profundidad",
        deserialize_with = "deserialize_depth",
        skip_serializing_if = "Option::is_none"
    )]
    pub depth: Option<i64>,
}

/// Accept integer depths and whole-number floats such as `2.0`.
fn deserialize_depth<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Depth {
        Int(i64),
        Float(f64),
    }

    match Option::<Depth>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Depth::Int(depth)) => Ok(Some(depth)),
        // Saturates outside the i64 range; `to_task` rejects it as too large.
        Some(Depth::Float(depth)) if depth.is_finite() && depth.fract() == 0.0 => {
            Ok(Some(depth as i64))
        }
        Some(Depth::Float(depth)) => Err(D::Error::custom(format!(
            "depth must be a whole number, got {depth}"
        ))),
    }
}

/// One decoded entry of the task file; `Err` holds why the entry was unusable.
pub type TaskEntry = Result<TaskDescriptor>;

impl TaskDescriptor {
    /// Validate this descriptor into a task at 1-based position `index`.
    pub fn to_task(&self, index: usize) -> Result<CrawlTask> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SiteDocError::validation(format!("task {index}: no URL specified")))?;

        let depth = self.depth.unwrap_or(1);
        if depth < 1 {
            return Err(SiteDocError::validation(format!(
                "task {index}: depth must be at least 1, got {depth}"
            )));
        }
        let max_depth = u32::try_from(depth).map_err(|_| {
            SiteDocError::validation(format!(
                "task {index}: depth {depth} is too large (maximum {})",
                u32::MAX
            ))
        })?;

        Ok(CrawlTask {
            index,
            seed_url: url.to_string(),
            max_depth,
        })
    }
}

/// Parse task entries from JSON text.
///
/// Only unreadable JSON or a top level that is neither an array nor an object
/// fails the whole file. Each entry is decoded on its own and keeps its
/// position in the returned list.
pub fn parse_tasks(json: &str) -> Result<Vec<TaskEntry>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SiteDocError::config(format!("malformed task file: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(SiteDocError::config(format!(
                "malformed task file: expected an array of tasks or a single task object, found {}",
                json_kind(&other)
            )));
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<TaskDescriptor>(item)
                .map_err(|e| SiteDocError::validation(format!("task {}: {e}", i + 1)))
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load task entries from `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_tasks(path: &Path) -> Result<Option<Vec<TaskEntry>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "task file not found");
            return Ok(None);
        }
        Err(e) => return Err(SiteDocError::io(path, e)),
    };

    let entries = parse_tasks(&content).map_err(|e| {
        SiteDocError::config(format!("{}: {e}", path.display()))
    })?;
    info!(?path, count = entries.len(), "loaded task descriptors");

    Ok(Some(entries))
}

/// Turn entries into runnable tasks, skipping invalid ones with a diagnostic.
///
/// Each task keeps the 1-based position of its entry, so skipped entries
/// leave a gap in the numbering rather than shifting later tasks.
pub fn resolve_tasks(entries: &[TaskEntry]) -> Vec<CrawlTask> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let task = match entry {
                Ok(descriptor) => descriptor.to_task(i + 1),
                Err(e) => {
                    warn!(error = %e, "skipping task descriptor");
                    return None;
                }
            };
            match task {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(error = %e, "skipping task descriptor");
                    None
                }
            }
        })
        .collect()
}

/// Descriptors written by `sitedoc init`.
pub fn example_tasks() -> Vec<TaskDescriptor> {
    vec![
        TaskDescriptor {
            url: Some("https://example.com".into()),
            depth: Some(2),
        },
        TaskDescriptor {
            url: Some("https://example.org".into()),
            depth: Some(1),
        },
    ]
}

/// Write the example task file to `path`, refusing to replace an existing file.
pub fn write_example_tasks(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(SiteDocError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let json = serde_json::to_string_pretty(&example_tasks())
        .map_err(|e| SiteDocError::config(e.to_string()))?;
    std::fs::write(path, json + "\n").map_err(|e| SiteDocError::io(path, e))?;
    info!(?path, "created example task file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("sitedoc-{tag}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_array_with_defaults() {
        let json = r#"[
            {"url": "https://example.com", "depth": 3},
            {"url": "https://example.org"}
        ]"#;
        let tasks = resolve_tasks(&parse_tasks(json).unwrap());

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].max_depth, 3);
        assert_eq!(tasks[1].max_depth, 1);
        assert_eq!(tasks[1].index, 2);
    }

    #[test]
    fn accepts_legacy_depth_key() {
        let json = r#"[{"url": "https://example.com", "profundidad": 2}]"#;
        let entries = parse_tasks(json).unwrap();
        assert_eq!(entries[0].as_ref().unwrap().depth, Some(2));
    }

    #[test]
    fn single_object_is_one_task() {
        let json = r#"{"url": "https://example.com", "depth": 2}"#;
        let entries = parse_tasks(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_ok());
    }

    #[test]
    fn ill_typed_entry_is_skipped_without_losing_the_others() {
        let json = r#"[
            {"url": "https://example.com", "depth": 2},
            {"url": 42},
            {"url": "https://example.net", "depth": 1}
        ]"#;
        let entries = parse_tasks(json).unwrap();
        assert_eq!(entries.len(), 3);
        let err = entries[1].as_ref().unwrap_err();
        assert!(matches!(err, SiteDocError::Validation { .. }));
        assert!(err.to_string().contains("task 2"));

        let tasks = resolve_tasks(&entries);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].seed_url, "https://example.com");
        assert_eq!(tasks[1].index, 3);
        assert_eq!(tasks[1].seed_url, "https://example.net");
    }

    #[test]
    fn whole_number_float_depth_is_accepted() {
        let json = r#"[
            {"url": "https://example.com", "depth": 2},
            {"url": "https://example.org", "depth": 2.0},
            {"url": "https://example.io", "depth": 1.5},
            {"url": "https://example.net", "depth": 1}
        ]"#;
        let entries = parse_tasks(json).unwrap();
        assert!(entries[2].is_err());

        let tasks = resolve_tasks(&entries);
        let indices: Vec<_> = tasks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert_eq!(tasks[1].max_depth, 2);
    }

    #[test]
    fn entries_without_url_are_skipped_keeping_positions() {
        let json = r#"[
            {"depth": 2},
            {"url": "   "},
            {"url": "https://example.org", "depth": 1}
        ]"#;
        let tasks = resolve_tasks(&parse_tasks(json).unwrap());

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].index, 3);
        assert_eq!(tasks[0].root_index().as_str(), "3");
    }

    #[test]
    fn non_positive_depth_is_rejected() {
        let descriptor = TaskDescriptor {
            url: Some("https://example.com".into()),
            depth: Some(0),
        };
        let err = descriptor.to_task(1).unwrap_err();
        assert!(err.to_string().contains("depth must be at least 1"));

        let negative = TaskDescriptor {
            depth: Some(-2),
            ..descriptor
        };
        assert!(negative.to_task(1).is_err());
    }

    #[test]
    fn oversized_depth_is_reported_as_too_large() {
        let descriptor = TaskDescriptor {
            url: Some("https://example.com".into()),
            depth: Some(i64::from(u32::MAX) + 1),
        };
        let err = descriptor.to_task(4).unwrap_err().to_string();
        assert!(err.contains("task 4"));
        assert!(err.contains("too large"));
        assert!(!err.contains("at least 1"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = parse_tasks("[{\"url\": ").unwrap_err();
        assert!(matches!(err, SiteDocError::Config { .. }));

        let err = parse_tasks("42").unwrap_err();
        assert!(matches!(err, SiteDocError::Config { .. }));
        assert!(err.to_string().contains("found a number"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = temp_dir("tasks-missing");
        let loaded = load_tasks(&dir.join("urls.json")).unwrap();
        assert!(loaded.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn example_file_roundtrips_and_is_not_overwritten() {
        let dir = temp_dir("tasks-example");
        let path = dir.join("urls.json");

        write_example_tasks(&path).unwrap();
        let loaded: Vec<TaskDescriptor> = load_tasks(&path)
            .unwrap()
            .expect("file exists")
            .into_iter()
            .map(|entry| entry.unwrap())
            .collect();
        assert_eq!(loaded, example_tasks());

        assert!(write_example_tasks(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
