use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use crate::client::FamilySearchClient;
use crate::enrich::enrich_person;
use crate::models::TabularRecord;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::settings::Settings;
use crate::transport::{HttpTransport, Transport};

/// Aggregated rows for a whole tree, in ancestor order.
pub struct TreeData {
    pub records: Vec<TabularRecord>,
    pub total_people: usize,
}

/// Build an authenticated client from an access token and fetch the tree.
pub async fn fetch_tree_data_with_token(
    settings: &Settings,
    access_token: &str,
    sink: Option<Arc<dyn ProgressSink>>,
) -> Result<TreeData> {
    let transport = HttpTransport::new(
        &settings.api_base,
        access_token,
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("Failed to create FamilySearch transport")?;
    let client = Arc::new(FamilySearchClient::new(transport));
    let progress = Arc::new(ProgressTracker::new(sink));

    fetch_tree_data(client, settings.max_generations, settings.concurrency, progress).await
}

/// Resolve the root person, fetch the ancestry tree and enrich every person.
///
/// Root and tree lookups are fatal. Per-person failures only drop that
/// person's rows. `concurrency == 0` enriches every person at once.
pub async fn fetch_tree_data<T: Transport + 'static>(
    client: Arc<FamilySearchClient<T>>,
    generations: u32,
    concurrency: usize,
    progress: Arc<ProgressTracker>,
) -> Result<TreeData> {
    let root_id = client
        .resolve_current_person_id()
        .await
        .context("Failed to resolve current person")?;

    let tree = client
        .fetch_ancestry_tree(&root_id, generations)
        .await
        .context("Failed to fetch ancestry tree")?;

    let total_people = tree.persons.len();
    info!("Total people in ancestry tree: {}", total_people);
    progress.set_total(total_people);

    let permits = permit_count(concurrency, total_people);
    let semaphore = Arc::new(Semaphore::new(permits));

    // Workers send (index, rows); slots are filled by index so output order
    // follows the tree, not completion order.
    let (tx, mut rx) = mpsc::channel::<(usize, Vec<TabularRecord>)>(permits.saturating_mul(2));
    let mut handles = Vec::with_capacity(total_people);

    for (index, person) in tree.persons.into_iter().enumerate() {
        let client = Arc::clone(&client);
        let progress = Arc::clone(&progress);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return;
            };
            let rows = enrich_person(&*client, &person, &progress).await;
            let _ = tx.send((index, rows)).await;
        }));
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut slots: Vec<Vec<TabularRecord>> = vec![Vec::new(); total_people];
    while let Some((index, rows)) = rx.recv().await {
        slots[index] = rows;
    }

    for handle in handles {
        if let Err(e) = handle.await {
            // the enricher never reached its own count
            error!("Enrichment task aborted: {}", e);
            progress.record_processed();
        }
    }

    let records: Vec<TabularRecord> = slots.into_iter().flatten().collect();
    info!(
        "Collected {} rows for {} people ({}/{} processed)",
        records.len(),
        total_people,
        progress.processed(),
        progress.total()
    );

    Ok(TreeData {
        records,
        total_people,
    })
}

/// Semaphore size: `0` or anything above the tree size means one permit per person.
fn permit_count(concurrency: usize, total_people: usize) -> usize {
    let all = total_people.max(1);
    if concurrency == 0 {
        all
    } else {
        concurrency.min(all)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{Cell, COL_ID, COL_LOCATION};
    use crate::testing::{FakeTransport, RecordingSink};

    const ROOT: &str = "/platform/tree/current-person";

    fn tree_transport(ids: &[&str]) -> FakeTransport {
        let persons: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                json!({"id": id, "display": {
                    "name": format!("Name {}", id),
                    "ascendancyNumber": (i + 1).to_string()
                }})
            })
            .collect();
        let mut t = FakeTransport::new()
            .redirect(ROOT, "https://apibeta.familysearch.org/platform/tree/persons/A")
            .json(
                "/platform/tree/ancestry?person=A&generations=8",
                json!({ "persons": persons }),
            );
        for id in ids {
            t = t
                .json(
                    &format!("/platform/tree/persons/{}", id),
                    json!({"persons": [{"facts": [
                        {"type": "http://gedcomx.org/Birth", "place": {"original": format!("{}-town, England", id)}},
                        {"type": "http://gedcomx.org/Death", "place": {"original": format!("{}-city, England", id)}}
                    ]}]}),
                )
                .json(&format!("/platform/tree/persons/{}/memories", id), json!({}));
        }
        t
    }

    fn ids_of(records: &[TabularRecord]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.get(COL_ID).map(|c| c.to_string()))
            .collect()
    }

    async fn run(t: FakeTransport, concurrency: usize) -> (Result<TreeData>, Arc<RecordingSink>) {
        let sink = RecordingSink::new();
        let progress = Arc::new(ProgressTracker::new(Some(sink.clone())));
        let result = fetch_tree_data(Arc::new(FamilySearchClient::new(t)), 8, concurrency, progress).await;
        (result, sink)
    }

    #[tokio::test]
    async fn output_follows_input_order() {
        // A and C are slow, so B finishes first.
        let t = tree_transport(&["A", "B", "C"])
            .delay("/platform/tree/persons/A", Duration::from_millis(60))
            .delay("/platform/tree/persons/C", Duration::from_millis(30));
        let (result, sink) = run(t, 0).await;
        let data = result.unwrap();

        assert_eq!(data.total_people, 3);
        assert_eq!(data.records.len(), 6);
        assert_eq!(ids_of(&data.records), vec!["A", "B", "C"]);
        // each person's continuation row directly follows its primary row
        assert_eq!(
            data.records[1].get(COL_LOCATION),
            Some(&Cell::text("A-city, England"))
        );
        assert_eq!(sink.totals(), vec![3]);
        assert_eq!(sink.ticks(), 3);
    }

    #[tokio::test]
    async fn bounded_concurrency_keeps_order() {
        let t = tree_transport(&["A", "B", "C", "D", "E"])
            .delay("/platform/tree/persons/A", Duration::from_millis(40));
        let (result, sink) = run(t, 2).await;
        assert_eq!(ids_of(&result.unwrap().records), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(sink.ticks(), 5);
    }

    #[tokio::test]
    async fn failed_person_is_skipped() {
        let t = tree_transport(&["A", "B", "C"]).fail("/platform/tree/persons/B", 500);
        let (result, sink) = run(t, 4).await;
        let data = result.unwrap();
        assert_eq!(ids_of(&data.records), vec!["A", "C"]);
        assert_eq!(data.total_people, 3);
        assert_eq!(sink.ticks(), 3);
    }

    #[tokio::test]
    async fn root_failure_is_fatal() {
        let t = FakeTransport::new().fail(ROOT, 401);
        let (result, sink) = run(t, 4).await;
        let err = result.err().unwrap();
        assert!(format!("{:#}", err).contains("current person"));
        assert!(sink.totals().is_empty());
    }

    #[tokio::test]
    async fn tree_failure_is_fatal() {
        let t = FakeTransport::new()
            .redirect(ROOT, "https://apibeta.familysearch.org/platform/tree/persons/A")
            .fail("/platform/tree/ancestry?person=A&generations=8", 500);
        let (result, _) = run(t, 4).await;
        assert!(format!("{:#}", result.err().unwrap()).contains("ancestry tree"));
    }

    #[tokio::test]
    async fn empty_tree() {
        let t = FakeTransport::new()
            .redirect(ROOT, "https://apibeta.familysearch.org/platform/tree/persons/A")
            .json("/platform/tree/ancestry?person=A&generations=8", json!({"persons": []}));
        let (result, sink) = run(t, 0).await;
        let data = result.unwrap();
        assert!(data.records.is_empty());
        assert_eq!(data.total_people, 0);
        assert_eq!(sink.totals(), vec![0]);
    }

    #[test]
    fn permits_clamped_to_tree_size() {
        assert_eq!(permit_count(0, 5), 5);
        assert_eq!(permit_count(2, 5), 2);
        assert_eq!(permit_count(usize::MAX, 5), 5);
        assert_eq!(permit_count(0, 0), 1);
        assert_eq!(permit_count(usize::MAX / 4, 0), 1);
    }

    #[tokio::test]
    async fn huge_concurrency_runs() {
        let t = tree_transport(&["A", "B"]);
        let (result, sink) = run(t, usize::MAX / 4).await;
        assert_eq!(ids_of(&result.unwrap().records), vec!["A", "B"]);
        assert_eq!(sink.ticks(), 2);
    }

    #[tokio::test]
    async fn panicked_person_still_counted() {
        let t = tree_transport(&["A", "B", "C"]).panic("/platform/tree/persons/B");
        let (result, sink) = run(t, 0).await;
        let data = result.unwrap();
        assert_eq!(ids_of(&data.records), vec!["A", "C"]);
        assert_eq!(sink.ticks(), 3);
    }

    #[tokio::test]
    async fn issues_two_lookups_per_person() {
        let t = Arc::new(FamilySearchClient::new(tree_transport(&["A", "B"])));
        let progress = Arc::new(ProgressTracker::new(None));
        fetch_tree_data(Arc::clone(&t), 8, 0, progress).await.unwrap();
        // root + tree + 2 per person
        assert_eq!(t.transport().calls(), 6);
    }
}
