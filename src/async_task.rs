use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::PagingConfig;
use crate::error::Result;
use crate::source::{ItemRef, LabelRef, LabelSource};

/// Work items for the background fetch worker. One fetch of each kind
/// is in flight at a time; the label fetches are stamped with the fetch
/// session so results from a superseded session can be discarded, and
/// the item fetch carries a cancellation token so re-selecting a label
/// stops the stale request between batches.
#[derive(Debug, Clone)]
pub enum Task {
    LoadFirstPage {
        session: u64,
    },
    LoadAllLabels {
        session: u64,
    },
    LoadLabelItems {
        label_id: u64,
        cancellation_token: CancellationToken,
    },
}

#[derive(Debug, Clone)]
pub enum TaskResult {
    FirstPageLoaded { session: u64, labels: Vec<LabelRef> },
    FirstPageFailed { session: u64, message: String },
    LabelsProgress { session: u64, loaded: usize },
    AllLabelsLoaded { session: u64, labels: Vec<LabelRef> },
    AllLabelsFailed { session: u64, message: String },
    ItemsLoaded { label_id: u64, items: Vec<ItemRef> },
    ItemsFailed { label_id: u64, message: String },
}

pub async fn run_worker(
    mut task_receiver: mpsc::Receiver<Task>,
    result_sender: mpsc::Sender<TaskResult>,
    source: Arc<dyn LabelSource>,
    paging: PagingConfig,
) {
    while let Some(task) = task_receiver.recv().await {
        let result = match task {
            Task::LoadFirstPage { session } => {
                match fetch_first_page(source.as_ref(), paging.first_page).await {
                    Ok(labels) => Some(TaskResult::FirstPageLoaded { session, labels }),
                    Err(e) => Some(TaskResult::FirstPageFailed {
                        session,
                        message: e.to_string(),
                    }),
                }
            }
            Task::LoadAllLabels { session } => {
                let progress = result_sender.clone();
                let outcome = fetch_all_labels(source.as_ref(), paging.labels_batch, |loaded| {
                    // Progress is advisory; drop it if the channel is full.
                    let _ = progress.try_send(TaskResult::LabelsProgress { session, loaded });
                })
                .await;
                match outcome {
                    Ok(labels) => Some(TaskResult::AllLabelsLoaded { session, labels }),
                    Err(e) => Some(TaskResult::AllLabelsFailed {
                        session,
                        message: e.to_string(),
                    }),
                }
            }
            Task::LoadLabelItems {
                label_id,
                cancellation_token,
            } => {
                match fetch_label_items(
                    source.as_ref(),
                    label_id,
                    paging.items_batch,
                    &cancellation_token,
                )
                .await
                {
                    Ok(Some(items)) => Some(TaskResult::ItemsLoaded { label_id, items }),
                    // Cancelled mid-fetch: the selection moved on, there
                    // is nobody left to tell.
                    Ok(None) => None,
                    Err(e) => Some(TaskResult::ItemsFailed {
                        label_id,
                        message: e.to_string(),
                    }),
                }
            }
        };

        if let Some(result) = result {
            if result_sender.send(result).await.is_err() {
                // Main thread has dropped the receiver, exit worker
                break;
            }
        }
    }
}

/// Fetch the first page of labels, fast, to unblock the initial render.
/// Errors propagate: a failure here is fatal to the first render.
pub async fn fetch_first_page(source: &dyn LabelSource, take: usize) -> Result<Vec<LabelRef>> {
    source.list_labels(0, take).await
}

/// Fetch the complete label collection, one batch at a time, strictly
/// sequentially, concatenating in request order. Terminates on the
/// first batch that comes back short or empty. `on_progress` observes
/// the running count after every batch.
pub async fn fetch_all_labels(
    source: &dyn LabelSource,
    batch: usize,
    mut on_progress: impl FnMut(usize),
) -> Result<Vec<LabelRef>> {
    let mut all = Vec::new();
    loop {
        let page = source.list_labels(all.len(), batch).await?;
        let exhausted = page.len() < batch;
        all.extend(page);
        on_progress(all.len());
        if exhausted || batch == 0 {
            break;
        }
    }
    Ok(all)
}

/// Fetch every item captured by one label, same pagination pattern as
/// `fetch_all_labels`. Returns `Ok(None)` when cancelled between
/// batches; cancellation is not an error.
pub async fn fetch_label_items(
    source: &dyn LabelSource,
    label_id: u64,
    batch: usize,
    cancellation_token: &CancellationToken,
) -> Result<Option<Vec<ItemRef>>> {
    let mut all = Vec::new();
    loop {
        if cancellation_token.is_cancelled() {
            return Ok(None);
        }
        let page = source.list_label_items(label_id, all.len(), batch).await?;
        let exhausted = page.len() < batch;
        all.extend(page);
        if exhausted || batch == 0 {
            break;
        }
    }
    Ok(Some(all))
}
