use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::models::{
    AncestryTree, MemoryCount, MemoryTally, PersonDetail, ARTIFACT_URL_BASE,
};
use crate::transport::Transport;

const CURRENT_PERSON: &str = "current person lookup";
const ANCESTRY: &str = "ancestry tree fetch";
const DETAILS: &str = "person details fetch";

/// The four FamilySearch tree operations used by the exporter.
pub struct FamilySearchClient<T> {
    transport: T,
}

impl<T: Transport> FamilySearchClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Id of the signed-in user's tree person, taken from the redirect target.
    pub async fn resolve_current_person_id(&self) -> Result<String, LookupError> {
        let response = self
            .transport
            .get("/platform/tree/current-person")
            .await
            .map_err(|e| LookupError::transport(CURRENT_PERSON, e))?;
        debug!(status = response.status, "Current person response");

        let location = response
            .location
            .ok_or_else(|| LookupError::malformed(CURRENT_PERSON, "no Location header"))?;
        let id = location
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                LookupError::malformed(CURRENT_PERSON, format!("bad Location {}", location))
            })?;

        info!(person_id = %id, "Resolved current person");
        Ok(id.to_string())
    }

    pub async fn fetch_ancestry_tree(
        &self,
        person_id: &str,
        generations: u32,
    ) -> Result<AncestryTree, LookupError> {
        let path = format!(
            "/platform/tree/ancestry?person={}&generations={}",
            person_id, generations
        );
        let response = self
            .transport
            .get(&path)
            .await
            .map_err(|e| LookupError::transport(ANCESTRY, e))?;
        let tree: AncestryTree = decode(ANCESTRY, response.body)?;
        debug!(persons = tree.persons.len(), "Ancestry tree received");
        Ok(tree)
    }

    pub async fn fetch_person_details(&self, person_id: &str) -> Result<PersonDetail, LookupError> {
        let response = self
            .transport
            .get(&format!("/platform/tree/persons/{}", person_id))
            .await
            .map_err(|e| LookupError::transport(DETAILS, e))?;
        decode(DETAILS, response.body)
    }

    /// Memory count and artifact links. Never fails: a lookup error yields `N/A`.
    pub async fn fetch_memory_count(&self, person_id: &str) -> MemoryCount {
        let response = match self
            .transport
            .get(&format!("/platform/tree/persons/{}/memories", person_id))
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(person_id = %person_id, "Memory lookup failed: {}", e);
                return MemoryCount::unavailable();
            }
        };

        // Every description counts; only those with an id get a link.
        let descriptions = response
            .body
            .get("sourceDescriptions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        MemoryCount {
            count: MemoryTally::Known(descriptions.len()),
            links: descriptions
                .iter()
                .filter_map(|d| d.get("id").and_then(Value::as_str))
                .map(|id| format!("{}{}", ARTIFACT_URL_BASE, id))
                .collect(),
        }
    }
}

fn decode<D: DeserializeOwned>(operation: &'static str, body: Value) -> Result<D, LookupError> {
    serde_json::from_value(body).map_err(|e| LookupError::malformed(operation, e.to_string()))
}

// ── Tests ──
