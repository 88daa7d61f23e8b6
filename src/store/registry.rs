use super::{load_yaml, save_yaml, ProjectStore};
use crate::error::Result;
use crate::models::*;

impl ProjectStore {
    // ============================================================
    // Artifact stores
    // ============================================================

    /// The store for `category`; empty when missing or malformed.
    pub fn load_artifacts(&self, category: ArtifactCategory) -> ArtifactStore {
        load_yaml(&self.store_path(category)).unwrap_or_default()
    }

    pub fn save_artifacts(&self, category: ArtifactCategory, store: &ArtifactStore) -> Result<()> {
        save_yaml(&self.store_path(category), store)
    }

    /// Insert `record` under `id`, or merge it into the existing record.
    ///
    /// On merge, scalars are replaced only by non-empty values and each list
    /// named in `mergeable` is unioned. The whole store is rewritten on every
    /// call, so repeating identical input leaves the content unchanged.
    pub fn upsert_artifact(
        &self,
        category: ArtifactCategory,
        id: &str,
        record: ArtifactRecord,
        mergeable: &[ListField],
    ) -> Result<UpsertOutcome> {
        let mut store = self.load_artifacts(category);

        let outcome = match store.get_mut(id) {
            Some(existing) => {
                existing.merge_from(record, mergeable);
                UpsertOutcome::Updated
            }
            None => {
                store.insert(id.to_string(), record);
                UpsertOutcome::Created
            }
        };

        self.save_artifacts(category, &store)?;
        tracing::debug!("{:?} {} artifact {}", outcome, category.as_str(), id);
        Ok(outcome)
    }

    /// Resolve linked ids to `{id, path}` pairs; unknown ids get a `None` path.
    pub fn collect_by_ids(&self, links: &LinkedArtifacts) -> InterfaceRefs {
        let resolve = |category: ArtifactCategory| -> Vec<InterfaceRef> {
            let ids = links.ids(category);
            if ids.is_empty() {
                return Vec::new();
            }
            let store = self.load_artifacts(category);
            ids.iter()
                .map(|id| InterfaceRef {
                    id: id.clone(),
                    path: store.get(id).and_then(|record| record.path.clone()),
                })
                .collect()
        };

        InterfaceRefs {
            ui: resolve(ArtifactCategory::Ui),
            api: resolve(ArtifactCategory::Api),
            func: resolve(ArtifactCategory::Function),
        }
    }

    /// Every artifact whose `related_req_id` is or contains `req_id`, found by
    /// scanning each store in full.
    pub fn collect_by_requirement(&self, req_id: &str) -> RequirementInterfaces {
        let scan = |category: ArtifactCategory| -> Vec<ArtifactEntry> {
            self.load_artifacts(category)
                .into_iter()
                .filter(|(_, record)| record.is_related_to(req_id))
                .map(|(id, record)| ArtifactEntry { id, record })
                .collect()
        };

        RequirementInterfaces {
            ui: scan(ArtifactCategory::Ui),
            api: scan(ArtifactCategory::Api),
            func: scan(ArtifactCategory::Function),
        }
    }
}
