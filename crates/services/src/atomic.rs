//! Read-modify-write against the item store with optimistic retries.

use domains::{AppError, Item, ItemId, ItemRepository, Result, StoreError};
use tracing::debug;

/// How many times a mutation is re-applied after losing a version race.
pub const MAX_ATTEMPTS: usize = 5;

/// Loads the item, applies `apply` to it and saves it with a version check.
///
/// Errors from `apply` abort immediately with nothing written. A lost race
/// reloads the fresh copy and re-applies, so two simultaneous claims both
/// end up stored.
pub async fn update_item<T, F>(repo: &dyn ItemRepository, id: ItemId, mut apply: F) -> Result<(Item, T)>
where
    F: FnMut(&mut Item) -> Result<T> + Send,
    T: Send,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let mut item = repo.get(id).await?.ok_or_else(|| AppError::item_not_found(id))?;
        let out = apply(&mut item)?;

        match repo.save(&item).await {
            Ok(saved) => return Ok((saved, out)),
            Err(StoreError::VersionConflict { expected, .. }) => {
                debug!(item_id = %id, attempt, expected, "version conflict, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(AppError::Conflict(format!(
        "item {id} kept changing, gave up after {MAX_ATTEMPTS} attempts"
    )))
}
