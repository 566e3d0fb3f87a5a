use std::future::Future;
use std::pin::Pin;

use foundation::PlaceId;
use parking_lot::RwLock;
use tracing::warn;

use crate::{CatalogError, ListedPlace, sample_places};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read/write access to the place collection.
///
/// Methods return boxed futures for dyn-compatibility; remote stores talk to
/// the backend over HTTP while the in-memory store resolves immediately.
pub trait PlaceStore: Send + Sync {
    /// Approved places, newest first.
    fn list_approved(&self) -> BoxFuture<'_, Result<Vec<ListedPlace>, CatalogError>>;

    fn get(&self, id: &PlaceId) -> BoxFuture<'_, Result<Option<ListedPlace>, CatalogError>>;

    /// Stores a new record and returns it as persisted.
    fn insert(&self, place: ListedPlace) -> BoxFuture<'_, Result<ListedPlace, CatalogError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryPlaceStore {
    places: RwLock<Vec<ListedPlace>>,
}

impl InMemoryPlaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_places(places: Vec<ListedPlace>) -> Self {
        Self {
            places: RwLock::new(places),
        }
    }

    pub fn len(&self) -> usize {
        self.places.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.read().is_empty()
    }
}

impl PlaceStore for InMemoryPlaceStore {
    fn list_approved(&self) -> BoxFuture<'_, Result<Vec<ListedPlace>, CatalogError>> {
        let mut approved: Vec<ListedPlace> = self
            .places
            .read()
            .iter()
            .filter(|p| p.is_approved)
            .cloned()
            .collect();
        approved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Box::pin(async move { Ok(approved) })
    }

    fn get(&self, id: &PlaceId) -> BoxFuture<'_, Result<Option<ListedPlace>, CatalogError>> {
        let found = self.places.read().iter().find(|p| &p.id == id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn insert(&self, place: ListedPlace) -> BoxFuture<'_, Result<ListedPlace, CatalogError>> {
        let result = {
            let mut places = self.places.write();
            if places.iter().any(|p| p.id == place.id) {
                Err(CatalogError::Invalid(format!("duplicate place id {}", place.id)))
            } else {
                places.push(place.clone());
                Ok(place)
            }
        };
        Box::pin(async move { result })
    }
}

/// Approved places from `store`, or the built-in sample listing when the
/// store fails or has nothing to show yet.
pub async fn load_places(store: &dyn PlaceStore) -> Vec<ListedPlace> {
    match store.list_approved().await {
        Ok(places) if !places.is_empty() => places,
        Ok(_) => sample_places(),
        Err(err) => {
            warn!("place store unavailable, using sample listing: {err}");
            sample_places()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct BrokenStore;

    impl PlaceStore for BrokenStore {
        fn list_approved(&self) -> BoxFuture<'_, Result<Vec<ListedPlace>, CatalogError>> {
            Box::pin(async { Err(CatalogError::Backend("connection refused".to_string())) })
        }

        fn get(&self, _id: &PlaceId) -> BoxFuture<'_, Result<Option<ListedPlace>, CatalogError>> {
            Box::pin(async { Err(CatalogError::Backend("connection refused".to_string())) })
        }

        fn insert(&self, _place: ListedPlace) -> BoxFuture<'_, Result<ListedPlace, CatalogError>> {
            Box::pin(async { Err(CatalogError::Backend("connection refused".to_string())) })
        }
    }

    #[tokio::test]
    async fn lists_only_approved_newest_first() {
        let mut places = sample_places();
        places.reverse();
        places[0].is_approved = false;
        let hidden = places[0].id.clone();
        let store = InMemoryPlaceStore::with_places(places);

        let listed = store.list_approved().await.unwrap();
        assert_eq!(listed.len(), store.len() - 1);
        assert!(listed.iter().all(|p| p.id != hidden));
        for pair in listed.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = InMemoryPlaceStore::new();
        let place = sample_places().remove(0);
        store.insert(place.clone()).await.unwrap();
        assert_eq!(store.get(&place.id).await.unwrap(), Some(place.clone()));
        assert!(matches!(
            store.insert(place).await,
            Err(CatalogError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn falls_back_to_samples() {
        assert_eq!(load_places(&InMemoryPlaceStore::new()).await, sample_places());
        assert_eq!(load_places(&BrokenStore).await, sample_places());

        let mine = vec![sample_places().remove(2)];
        let store = InMemoryPlaceStore::with_places(mine.clone());
        assert_eq!(load_places(&store).await, mine);
    }
}
