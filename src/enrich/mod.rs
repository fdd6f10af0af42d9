pub mod locations;
pub mod relationship;

use tracing::{debug, warn};

use crate::client::FamilySearchClient;
use crate::error::EnrichError;
use crate::models::*;
use crate::progress::ProgressTracker;
use crate::transport::Transport;

use locations::classify_locations;
use relationship::label_relationship;

const NO_LOCATIONS: &str = "No locations found";

/// Rows for one ancestor. Failures are logged and yield no rows; the
/// processed count is bumped exactly once either way.
pub async fn enrich_person<T: Transport>(
    client: &FamilySearchClient<T>,
    person: &Person,
    progress: &ProgressTracker,
) -> Vec<TabularRecord> {
    let result = try_enrich(client, person).await;
    progress.record_processed();

    match result {
        Ok(records) => {
            debug!(person_id = %person.id, rows = records.len(), "Enriched person");
            records
        }
        Err(e) => {
            warn!(person_id = %person.id, "Error processing person: {}", e);
            Vec::new()
        }
    }
}

async fn try_enrich<T: Transport>(
    client: &FamilySearchClient<T>,
    person: &Person,
) -> Result<Vec<TabularRecord>, EnrichError> {
    let (details, memories) = tokio::join!(
        client.fetch_person_details(&person.id),
        client.fetch_memory_count(&person.id),
    );
    let details = details?;
    let record = details
        .persons
        .first()
        .ok_or_else(|| EnrichError::NoPersonRecord(person.id.clone()))?;

    let locations = classify_locations(record);
    Ok(flatten(person, &memories, &locations))
}

/// Identity row merged with the first location, then one continuation row per
/// remaining location.
pub fn flatten(
    person: &Person,
    memories: &MemoryCount,
    locations: &[Location],
) -> Vec<TabularRecord> {
    let base = TabularRecord::new()
        .with(COL_NAME, Cell::text(&person.display.name))
        .with(
            COL_RELATIONSHIP,
            Cell::text(label_relationship(&person.display.ascendancy_number)),
        )
        .with(COL_GENDER, Cell::text(&person.display.gender))
        .with(COL_LIFESPAN, Cell::text(&person.display.lifespan))
        .with(COL_ID, Cell::text(&person.id))
        .with(COL_MEMORY_COUNT, Cell::from(memories.count))
        .with(COL_MEMORY_LINKS, Cell::text(memories.links.join(", ")))
        .with(COL_URL, Cell::text(person_url(&person.id)));

    let Some((first, rest)) = locations.split_first() else {
        return vec![base
            .with(COL_LOCATION_TYPE, Cell::text(NO_LOCATIONS))
            .with(COL_LOCATION, Cell::text(""))
            .with(COL_COUNTRY, Cell::text(""))
            .with(COL_DATE, Cell::text(""))];
    };

    let mut rows = Vec::with_capacity(locations.len());
    rows.push(with_location(base, first));
    rows.extend(rest.iter().map(|loc| with_location(TabularRecord::new(), loc)));
    rows
}

fn with_location(record: TabularRecord, loc: &Location) -> TabularRecord {
    record
        .with(COL_LOCATION_TYPE, Cell::text(&loc.location_type))
        .with(COL_LOCATION, Cell::text(&loc.place))
        .with(COL_COUNTRY, Cell::text(&loc.country))
        .with(COL_DATE, Cell::text(&loc.date))
}

// ── Tests ──
