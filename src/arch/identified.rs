//! Ordered collection of elements with unique identities.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

/// An element with a stable identity.
pub trait Identifiable {
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// A `Vec` whose elements have unique ids, addressable by position or id.
///
/// Elements must not change their id while stored; mutate through
/// [`get_mut`](Self::get_mut) or [`iter_mut`](Self::iter_mut) only for
/// fields that do not participate in the identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IdentifiedVec<T> {
    elements: Vec<T>,
}

impl<T> Default for IdentifiedVec<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<T: Identifiable> IdentifiedVec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element`. If its id is already present the collection is left
    /// unchanged and the element is handed back.
    pub fn push(&mut self, element: T) -> Option<T> {
        if self.contains(&element.id()) {
            return Some(element);
        }
        self.elements.push(element);
        None
    }

    /// Insert `element` at `index` (clamped to the length). Duplicate ids are
    /// rejected the same way as in [`push`](Self::push).
    pub fn insert(&mut self, index: usize, element: T) -> Option<T> {
        if self.contains(&element.id()) {
            return Some(element);
        }
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        None
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let index = self.index_of(id)?;
        Some(self.elements.remove(index))
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.elements.iter().find(|element| &element.id() == id)
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.elements.iter_mut().find(|element| &element.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &T::Id) -> Option<usize> {
        self.elements.iter().position(|element| &element.id() == id)
    }

    pub fn ids(&self) -> Vec<T::Id> {
        self.elements.iter().map(Identifiable::id).collect()
    }
}

impl<T> IdentifiedVec<T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.elements.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }
}

impl<T: Identifiable> FromIterator<T> for IdentifiedVec<T> {
    /// Later duplicates of an id are dropped.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for element in iter {
            let _ = collection.push(element);
        }
        collection
    }
}

impl<'a, T> IntoIterator for &'a IdentifiedVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
