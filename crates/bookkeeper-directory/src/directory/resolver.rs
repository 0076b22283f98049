use std::collections::BTreeSet;

use tracing::warn;

use super::categories::CategoryTree;
use super::domain::{CategoryId, ProfileId};
use super::repository::{DirectoryStore, StoreError};

/// Profiles offering at least one of the selected categories.
///
/// Matching is by exact id: a main category does not pull in its subcategories. Returns
/// `None` when the selection imposes no constraint, which includes a selection made only of
/// ids missing from the taxonomy.
pub fn resolve_by_categories<S>(
    store: &S,
    taxonomy: &CategoryTree,
    selected: &BTreeSet<CategoryId>,
) -> Result<Option<BTreeSet<ProfileId>>, StoreError>
where
    S: DirectoryStore + ?Sized,
{
    if selected.is_empty() {
        return Ok(None);
    }

    let (known, unknown) = taxonomy.partition_known(selected);
    if !unknown.is_empty() {
        warn!(?unknown, "ignoring unknown service categories");
    }
    if known.is_empty() {
        return Ok(None);
    }

    store.profile_ids_offering_any_of(&known).map(Some)
}
