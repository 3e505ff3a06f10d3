//! Per-user favorite cafes with an explicit load/save lifecycle.
//!
//! `FavoriteSet` is plain data; persistence goes through whichever
//! `FavoriteStore` the caller injects. A set remembers the adds and removes
//! made since loading and `save` replays only those, so concurrent sets for
//! the same owner never erase each other's writes.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    entity::favorites::{self, Entity as Favorites},
    error::{AppError, AppResult},
};

pub trait FavoriteStore: Send + Sync {
    /// Cafe ids in the order they were favorited.
    fn load(&self, owner: Uuid) -> impl Future<Output = AppResult<Vec<Uuid>>> + Send;

    /// Adding an existing favorite is a no-op.
    fn add(&self, owner: Uuid, cafe_id: Uuid) -> impl Future<Output = AppResult<()>> + Send;

    /// Removing a missing favorite is a no-op.
    fn remove(&self, owner: Uuid, cafe_id: Uuid) -> impl Future<Output = AppResult<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added(Uuid),
    Removed(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteSet {
    owner: Uuid,
    cafe_ids: Vec<Uuid>,
    pending: Vec<Change>,
}

impl FavoriteSet {
    pub fn empty(owner: Uuid) -> Self {
        Self {
            owner,
            cafe_ids: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub async fn load<S: FavoriteStore>(store: &S, owner: Uuid) -> AppResult<Self> {
        let mut cafe_ids = store.load(owner).await?;
        let mut seen = std::collections::HashSet::new();
        cafe_ids.retain(|id| seen.insert(*id));
        Ok(Self {
            owner,
            cafe_ids,
            pending: Vec::new(),
        })
    }

    /// Applies the changes made since loading, in order.
    pub async fn save<S: FavoriteStore>(&mut self, store: &S) -> AppResult<()> {
        for change in &self.pending {
            match *change {
                Change::Added(id) => store.add(self.owner, id).await?,
                Change::Removed(id) => store.remove(self.owner, id).await?,
            }
        }
        self.pending.clear();
        Ok(())
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.cafe_ids
    }

    pub fn contains(&self, cafe_id: Uuid) -> bool {
        self.cafe_ids.contains(&cafe_id)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns false when the cafe was already a favorite.
    pub fn add(&mut self, cafe_id: Uuid) -> bool {
        if self.contains(cafe_id) {
            return false;
        }
        self.cafe_ids.push(cafe_id);
        self.pending.push(Change::Added(cafe_id));
        true
    }

    /// Returns false when the cafe was not a favorite.
    pub fn remove(&mut self, cafe_id: Uuid) -> bool {
        let before = self.cafe_ids.len();
        self.cafe_ids.retain(|id| *id != cafe_id);
        if self.cafe_ids.len() == before {
            return false;
        }
        self.pending.push(Change::Removed(cafe_id));
        true
    }

    /// Returns whether the cafe is a favorite afterwards.
    pub fn toggle(&mut self, cafe_id: Uuid) -> bool {
        if self.remove(cafe_id) {
            false
        } else {
            self.add(cafe_id)
        }
    }
}

/// Favorites kept in the `favorites` table.
#[derive(Clone)]
pub struct SeaOrmFavoriteStore {
    orm: DatabaseConnection,
}

impl SeaOrmFavoriteStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

impl FavoriteStore for SeaOrmFavoriteStore {
    async fn load(&self, owner: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = Favorites::find()
            .filter(favorites::Column::UserId.eq(owner))
            .order_by_asc(favorites::Column::CreatedAt)
            .order_by_asc(favorites::Column::Position)
            .all(&self.orm)
            .await?;
        Ok(rows.into_iter().map(|row| row.cafe_id).collect())
    }

    async fn add(&self, owner: Uuid, cafe_id: Uuid) -> AppResult<()> {
        // Tie-breaker for rows sharing a timestamp.
        let position = Favorites::find()
            .filter(favorites::Column::UserId.eq(owner))
            .count(&self.orm)
            .await?;
        let row = favorites::ActiveModel {
            user_id: Set(owner),
            cafe_id: Set(cafe_id),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            created_at: Set(Utc::now().fixed_offset()),
        };
        Favorites::insert(row)
            .on_conflict(
                OnConflict::columns([favorites::Column::UserId, favorites::Column::CafeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.orm)
            .await?;
        Ok(())
    }

    async fn remove(&self, owner: Uuid, cafe_id: Uuid) -> AppResult<()> {
        Favorites::delete_many()
            .filter(favorites::Column::UserId.eq(owner))
            .filter(favorites::Column::CafeId.eq(cafe_id))
            .exec(&self.orm)
            .await?;
        Ok(())
    }
}

/// In-process store used by tests and tooling.
#[derive(Clone, Default)]
pub struct MemoryFavoriteStore {
    inner: Arc<Mutex<HashMap<Uuid, Vec<Uuid>>>>,
}

impl MemoryFavoriteStore {
    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<Uuid, Vec<Uuid>>>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("favorite store poisoned")))
    }
}

impl FavoriteStore for MemoryFavoriteStore {
    async fn load(&self, owner: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self.lock()?.get(&owner).cloned().unwrap_or_default())
    }

    async fn add(&self, owner: Uuid, cafe_id: Uuid) -> AppResult<()> {
        let mut guard = self.lock()?;
        let ids = guard.entry(owner).or_default();
        if !ids.contains(&cafe_id) {
            ids.push(cafe_id);
        }
        Ok(())
    }

    async fn remove(&self, owner: Uuid, cafe_id: Uuid) -> AppResult<()> {
        if let Some(ids) = self.lock()?.get_mut(&owner) {
            ids.retain(|id| *id != cafe_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_keeps_order() {
        let mut set = FavoriteSet::empty(Uuid::new_v4());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(set.add(a));
        assert!(set.add(b));
        assert!(!set.add(a));
        assert_eq!(set.ids(), &[a, b]);
    }

    #[test]
    fn toggle_twice_restores() {
        let mut set = FavoriteSet::empty(Uuid::new_v4());
        let a = Uuid::new_v4();
        let before = set.ids().to_vec();
        assert!(set.toggle(a));
        assert!(set.contains(a));
        assert!(!set.toggle(a));
        assert_eq!(set.ids(), before.as_slice());
    }

    #[test]
    fn remove_missing_is_a_no_op() {
        let mut set = FavoriteSet::empty(Uuid::new_v4());
        assert!(!set.remove(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn load_and_save_round_trip_through_the_store() -> anyhow::Result<()> {
        let store = MemoryFavoriteStore::default();
        let owner = Uuid::new_v4();
        let cafe = Uuid::new_v4();

        let mut set = FavoriteSet::load(&store, owner).await?;
        assert!(set.ids().is_empty());
        set.add(cafe);
        set.save(&store).await?;

        let reloaded = FavoriteSet::load(&store, owner).await?;
        assert_eq!(reloaded.ids(), &[cafe]);

        let other = FavoriteSet::load(&store, Uuid::new_v4()).await?;
        assert!(other.ids().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn interleaved_sets_keep_each_others_writes() -> anyhow::Result<()> {
        let store = MemoryFavoriteStore::default();
        let owner = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        store.add(owner, c).await?;

        let mut first = FavoriteSet::load(&store, owner).await?;
        let mut second = FavoriteSet::load(&store, owner).await?;
        first.add(a);
        second.add(b);
        second.remove(c);
        first.save(&store).await?;
        second.save(&store).await?;

        let reloaded = FavoriteSet::load(&store, owner).await?;
        assert_eq!(reloaded.ids(), &[a, b]);
        Ok(())
    }

    #[tokio::test]
    async fn same_cafe_added_twice_concurrently_is_stored_once() -> anyhow::Result<()> {
        let store = MemoryFavoriteStore::default();
        let owner = Uuid::new_v4();
        let cafe = Uuid::new_v4();

        let mut first = FavoriteSet::load(&store, owner).await?;
        let mut second = FavoriteSet::load(&store, owner).await?;
        assert!(first.add(cafe));
        assert!(second.add(cafe));
        first.save(&store).await?;
        second.save(&store).await?;

        assert_eq!(store.load(owner).await?, vec![cafe]);
        Ok(())
    }

    #[tokio::test]
    async fn save_clears_pending_changes() -> anyhow::Result<()> {
        let store = MemoryFavoriteStore::default();
        let mut set = FavoriteSet::load(&store, Uuid::new_v4()).await?;
        set.toggle(Uuid::new_v4());
        assert!(set.has_unsaved_changes());
        set.save(&store).await?;
        assert!(!set.has_unsaved_changes());
        Ok(())
    }
}
