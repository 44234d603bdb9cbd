use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TfvcLabelsError};

/// An identity attached to a label (the label's owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRef {
    pub id: String,
    pub display_name: String,
    pub unique_name: String,
}

impl IdentityRef {
    pub fn new(id: &str, display_name: &str, unique_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            unique_name: unique_name.to_string(),
        }
    }

    /// Preferred human-readable name for list rows and filter options.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.unique_name
        } else {
            &self.display_name
        }
    }
}

/// A named, owned, timestamped pointer to a snapshot of repository items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub owner: IdentityRef,
    pub modified_date: DateTime<Utc>,
}

/// A single file or folder path captured by a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub path: String,
    pub is_folder: bool,
}

impl ItemRef {
    pub fn folder(path: &str) -> Self {
        Self {
            path: path.to_string(),
            is_folder: true,
        }
    }

    pub fn file(path: &str) -> Self {
        Self {
            path: path.to_string(),
            is_folder: false,
        }
    }
}

/// A source of label and label-item data.
///
/// LabelSource abstracts the version-control backend behind the two
/// paginated listing operations the browser needs. Returning fewer than
/// `take` entries (including zero) signals that the listing is
/// exhausted; offsets are plain ordinals, there are no continuation
/// tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// List labels in the project, `take` at a time starting at `skip`.
    async fn list_labels(&self, skip: usize, take: usize) -> Result<Vec<LabelRef>>;

    /// List the items captured by one label, `take` at a time starting at `skip`.
    async fn list_label_items(&self, label_id: u64, skip: usize, take: usize)
        -> Result<Vec<ItemRef>>;
}

/// One label together with the items it captured, as stored in a
/// project data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelData {
    pub label: LabelRef,
    #[serde(default)]
    pub items: Vec<ItemRef>,
}

/// An in-memory label source.
///
/// Backs the demo mode, the headless tooling and the test suite.
/// Optional per-call latency makes the two-phase loading visible in the
/// UI; optional failure injection exercises the error paths.
pub struct InMemoryLabelSource {
    labels: Vec<LabelRef>,
    items: HashMap<u64, Vec<ItemRef>>,
    latency: Option<Duration>,
    fail_labels_after: Option<usize>,
    fail_items: bool,
    label_calls: AtomicUsize,
}

impl InMemoryLabelSource {
    pub fn new(data: Vec<LabelData>) -> Self {
        let mut labels = Vec::with_capacity(data.len());
        let mut items = HashMap::new();
        for entry in data {
            items.insert(entry.label.id, entry.items);
            labels.push(entry.label);
        }
        Self {
            labels,
            items,
            latency: None,
            fail_labels_after: None,
            fail_items: false,
            label_calls: AtomicUsize::new(0),
        }
    }

    /// Load a source from a JSON project-data file (an array of
    /// `LabelData` entries).
    pub fn from_json_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data: Vec<LabelData> = serde_json::from_str(&content)?;
        Ok(Self::new(data))
    }

    /// Simulate network latency on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every `list_labels` call after the first `calls` calls.
    pub fn fail_labels_after(mut self, calls: usize) -> Self {
        self.fail_labels_after = Some(calls);
        self
    }

    /// Fail every `list_label_items` call.
    pub fn fail_items(mut self) -> Self {
        self.fail_items = true;
        self
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl LabelSource for InMemoryLabelSource {
    async fn list_labels(&self, skip: usize, take: usize) -> Result<Vec<LabelRef>> {
        self.simulate_latency().await;

        let calls = self.label_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_labels_after {
            if calls >= limit {
                return Err(TfvcLabelsError::Source(
                    "label listing unavailable".to_string(),
                ));
            }
        }

        Ok(self.labels.iter().skip(skip).take(take).cloned().collect())
    }

    async fn list_label_items(
        &self,
        label_id: u64,
        skip: usize,
        take: usize,
    ) -> Result<Vec<ItemRef>> {
        self.simulate_latency().await;

        if self.fail_items {
            return Err(TfvcLabelsError::Source(format!(
                "item listing unavailable for label {}",
                label_id
            )));
        }

        let items = self.items.get(&label_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(items.iter().skip(skip).take(take).cloned().collect())
    }
}

fn demo_date(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn demo_label(id: u64, name: &str, description: &str, owner: &IdentityRef, secs: i64) -> LabelRef {
    LabelRef {
        id,
        name: name.to_string(),
        description: if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        },
        owner: owner.clone(),
        modified_date: demo_date(secs),
    }
}

/// Built-in dataset used when no project data file is supplied, so the
/// binary runs out of the box.
pub fn demo_source() -> InMemoryLabelSource {
    let amara = IdentityRef::new("7f3c", "Amara Diop", "amara@fabrikam.example");
    let jonas = IdentityRef::new("91e0", "Jonas Weber", "jonas@fabrikam.example");
    let priya = IdentityRef::new("c5a2", "Priya Nair", "priya@fabrikam.example");

    let web_items = vec![
        ItemRef::folder("$/Fabrikam/Web"),
        ItemRef::folder("$/Fabrikam/Web/Client"),
        ItemRef::file("$/Fabrikam/Web/Client/app.ts"),
        ItemRef::file("$/Fabrikam/Web/Client/router.ts"),
        ItemRef::folder("$/Fabrikam/Web/Server"),
        ItemRef::file("$/Fabrikam/Web/Server/host.cs"),
        ItemRef::file("$/Fabrikam/Web/web.config"),
    ];
    let core_items = vec![
        ItemRef::folder("$/Fabrikam/Core"),
        ItemRef::file("$/Fabrikam/Core/Engine.cs"),
        ItemRef::file("$/Fabrikam/Core/Model.cs"),
        ItemRef::file("$/Fabrikam/Core/Scheduler.cs"),
    ];
    let release_items = vec![
        ItemRef::folder("$/Fabrikam"),
        ItemRef::folder("$/Fabrikam/Core"),
        ItemRef::file("$/Fabrikam/Core/Engine.cs"),
        ItemRef::folder("$/Fabrikam/Web"),
        ItemRef::file("$/Fabrikam/Web/web.config"),
        ItemRef::file("$/Fabrikam/BuildNotes.md"),
    ];

    let data = vec![
        LabelData {
            label: demo_label(41, "Sprint-18-Web", "Web tier at sprint 18 close", &amara, 1_717_200_000),
            items: web_items,
        },
        LabelData {
            label: demo_label(42, "Sprint-18-Core", "", &jonas, 1_717_286_400),
            items: core_items,
        },
        LabelData {
            label: demo_label(43, "Release-7.2", "Snapshot promoted to release 7.2", &priya, 1_717_372_800),
            items: release_items,
        },
        LabelData {
            label: demo_label(44, "Release-7.2-Hotfix", "Post-release hotfix baseline", &priya, 1_717_549_200),
            items: vec![
                ItemRef::folder("$/Fabrikam/Core"),
                ItemRef::file("$/Fabrikam/Core/Engine.cs"),
            ],
        },
        LabelData {
            label: demo_label(45, "Nightly-0601", "", &jonas, 1_717_225_200),
            items: vec![ItemRef::folder("$/Fabrikam")],
        },
        LabelData {
            label: demo_label(46, "QA-Signoff-7.2", "Build approved by QA", &amara, 1_717_441_200),
            items: vec![
                ItemRef::folder("$/Fabrikam/Web"),
                ItemRef::file("$/Fabrikam/Web/web.config"),
            ],
        },
    ];

    InMemoryLabelSource::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pagination() {
        let source = demo_source();
        let total = source.label_count();

        let first = source.list_labels(0, 4).await.unwrap();
        assert_eq!(first.len(), 4);

        let rest = source.list_labels(4, 4).await.unwrap();
        assert_eq!(rest.len(), total - 4);

        let past_end = source.list_labels(total, 4).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_items_scoped_to_label() {
        let source = demo_source();

        let items = source.list_label_items(42, 0, 100).await.unwrap();
        assert!(items.iter().all(|i| i.path.starts_with("$/Fabrikam/Core")));

        let unknown = source.list_label_items(9999, 0, 100).await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let source = demo_source().fail_labels_after(1);
        assert!(source.list_labels(0, 2).await.is_ok());
        assert!(source.list_labels(2, 2).await.is_err());

        let source = demo_source().fail_items();
        assert!(source.list_label_items(41, 0, 10).await.is_err());
    }
}
