// SPDX-License-Identifier: MIT
//! In-memory mapping from Identifier to Identifiable
//!
//! At most one Identifiable per Identifier at any time. The store has no
//! internal locking; share it across threads behind the caller's own lock.
//! Iteration follows Identifier order, which callers must not treat as a
//! document order.

use std::collections::btree_map::{self, BTreeMap};

use crate::model::base::Identifier;
use crate::model::identifiable::{AssetAdministrationShell, Identifiable, Submodel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Identifiable with identifier {0} already exists in the store")]
    DuplicateIdentifier(Identifier),

    #[error("No Identifiable with identifier {0} in the store")]
    NotFound(Identifier),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStore {
    objects: BTreeMap<Identifier, Identifiable>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, failing if its Identifier is already taken
    pub fn add(&mut self, object: impl Into<Identifiable>) -> Result<(), StoreError> {
        let object = object.into();
        match self.objects.entry(object.identification().clone()) {
            btree_map::Entry::Occupied(entry) => {
                Err(StoreError::DuplicateIdentifier(entry.key().clone()))
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(object);
                Ok(())
            }
        }
    }

    /// Insert an object, returning the one it replaced
    pub fn insert_or_replace(&mut self, object: impl Into<Identifiable>) -> Option<Identifiable> {
        let object = object.into();
        self.objects.insert(object.identification().clone(), object)
    }

    /// Remove and return the object with this Identifier, if present
    pub fn discard(&mut self, identifier: &Identifier) -> Option<Identifiable> {
        self.objects.remove(identifier)
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&Identifiable> {
        self.objects.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &Identifier) -> Option<&mut Identifiable> {
        self.objects.get_mut(identifier)
    }

    pub fn get_identifiable(&self, identifier: &Identifier) -> Result<&Identifiable, StoreError> {
        self.get(identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.clone()))
    }

    pub fn get_shell(&self, identifier: &Identifier) -> Option<&AssetAdministrationShell> {
        self.get(identifier).and_then(Identifiable::as_shell)
    }

    pub fn get_submodel(&self, identifier: &Identifier) -> Option<&Submodel> {
        self.get(identifier).and_then(Identifiable::as_submodel)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.objects.contains_key(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifiable> {
        self.objects.values()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.objects.keys()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObjectStore {
    type Item = &'a Identifiable;
    type IntoIter = btree_map::Values<'a, Identifier, Identifiable>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.values()
    }
}

impl FromIterator<Identifiable> for ObjectStore {
    /// Later objects replace earlier ones with the same Identifier
    fn from_iter<T: IntoIterator<Item = Identifiable>>(iter: T) -> Self {
        let mut store = ObjectStore::new();
        for object in iter {
            store.insert_or_replace(object);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::identifiable::{Asset, ConceptDescription};
    use crate::registry::AssetKind;

    fn submodel(id: &str) -> Submodel {
        Submodel::new(Identifier::iri(id))
    }

    #[test]
    fn test_add_and_get() {
        let mut store = ObjectStore::new();
        store.add(submodel("http://example.com/sm")).unwrap();
        let id = Identifier::iri("http://example.com/sm");
        assert!(store.contains(&id));
        assert!(store.get_submodel(&id).is_some());
        assert!(store.get_shell(&id).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut store = ObjectStore::new();
        store.add(submodel("http://example.com/sm")).unwrap();
        let result = store.add(ConceptDescription::new(Identifier::iri("http://example.com/sm")));
        assert!(matches!(result, Err(StoreError::DuplicateIdentifier(_))));
        assert!(store.get_submodel(&Identifier::iri("http://example.com/sm")).is_some());
    }

    #[test]
    fn test_discard() {
        let mut store = ObjectStore::new();
        let id = Identifier::iri("http://example.com/asset");
        store.add(Asset::new(id.clone(), AssetKind::Type)).unwrap();
        assert!(store.discard(&id).is_some());
        assert!(store.discard(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_identifiable_not_found() {
        let store = ObjectStore::new();
        let err = store
            .get_identifiable(&Identifier::iri("http://example.com/missing"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_insert_or_replace() {
        let mut store = ObjectStore::new();
        let mut sm = submodel("http://example.com/sm");
        assert!(store.insert_or_replace(sm.clone()).is_none());
        sm.referable.id_short = "renamed".into();
        let previous = store.insert_or_replace(sm).unwrap();
        assert_eq!(previous.referable().id_short, "");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iteration() {
        let store: ObjectStore = vec![
            Identifiable::from(submodel("http://example.com/b")),
            Identifiable::from(submodel("http://example.com/a")),
        ]
        .into_iter()
        .collect();
        let ids: Vec<&str> = store.iter().map(|o| o.identification().id.as_str()).collect();
        assert_eq!(ids, vec!["http://example.com/a", "http://example.com/b"]);
        assert_eq!((&store).into_iter().count(), 2);
    }
}
