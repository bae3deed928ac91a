//! Saved conversions.

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use fx_types::{
    Clock, Conversion, FavoriteConversion, FavoriteId, FavoriteStore, NewFavorite, RepoError,
};

/// Wraps a favorites store and republishes the newest-first list after every
/// mutation.
pub struct FavoritesService<F: FavoriteStore, C: Clock> {
    store: F,
    clock: C,
    list: watch::Sender<Vec<FavoriteConversion>>,
}

impl<F: FavoriteStore, C: Clock> FavoritesService<F, C> {
    pub fn new(store: F, clock: C) -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self { store, clock, list }
    }

    /// Observes the list. Call `reload` once to populate it from the store.
    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoriteConversion>> {
        self.list.subscribe()
    }

    pub async fn reload(&self) -> Result<Vec<FavoriteConversion>, RepoError> {
        let favorites = self.store.list_recent().await?;
        self.list.send_replace(favorites.clone());
        Ok(favorites)
    }

    /// Saves a completed conversion, stamped with the current time.
    #[instrument(skip(self), fields(from = %conversion.from, to = %conversion.to))]
    pub async fn save(&self, conversion: &Conversion) -> Result<FavoriteConversion, RepoError> {
        let favorite = NewFavorite::from_conversion(conversion, self.clock.now_millis());
        self.insert(favorite).await
    }

    pub async fn insert(&self, favorite: NewFavorite) -> Result<FavoriteConversion, RepoError> {
        let saved = self.store.insert(favorite).await?;
        debug!("Saved favorite {}", saved.id);
        self.republish().await;
        Ok(saved)
    }

    pub async fn delete(&self, favorite: &FavoriteConversion) -> Result<bool, RepoError> {
        let removed = self.store.delete(favorite).await?;
        self.republish().await;
        Ok(removed)
    }

    pub async fn delete_by_id(&self, id: FavoriteId) -> Result<bool, RepoError> {
        let removed = self.store.delete_by_id(id).await?;
        self.republish().await;
        Ok(removed)
    }

    /// Refreshes the published list after a mutation that already committed.
    /// A failure leaves the previous list in place.
    async fn republish(&self) {
        if let Err(e) = self.reload().await {
            warn!("Failed to reload favorites after update: {}", e);
        }
    }

    pub async fn list(&self) -> Result<Vec<FavoriteConversion>, RepoError> {
        self.store.list_recent().await
    }
}
