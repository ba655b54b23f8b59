//! Forward iterators over records and composite entities.
//!
//! Both iterators borrow their source, so the source cannot be mutated
//! while one is alive. They are single pass; call the constructor again to
//! start over.

use std::iter::FusedIterator;
use std::slice;

use crate::entity::{Entity, Payload};
use crate::record::Record;

/// Iterator over the `(key, value)` pairs of a [`Record`] in storage order.
#[derive(Debug, Clone)]
pub struct Pairs<'a> {
    keys: slice::Iter<'a, Entity>,
    values: slice::Iter<'a, Entity>,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a Entity, &'a Entity);

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.keys.next()?, self.values.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for Pairs<'_> {}

impl FusedIterator for Pairs<'_> {}

impl Record {
    /// Iterates over pairs in storage order.
    ///
    /// Storage order is insertion order until the first
    /// [`Record::delete`], which moves the last pair into the gap.
    pub fn iter(&self) -> Pairs<'_> {
        Pairs {
            keys: self.keys().iter(),
            values: self.values().iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a Entity, &'a Entity);
    type IntoIter = Pairs<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Restricts [`Elements`] to one kind of child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFilter {
    /// Only records: elements of record arrays, and struct-valued
    /// entities inside entity arrays.
    Records,
    /// Only entities: elements of entity arrays.
    Entities,
}

/// A borrowed child of a composite entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef<'a> {
    /// A record child.
    Record(&'a Record),
    /// An entity child.
    Entity(&'a Entity),
}

impl<'a> ElementRef<'a> {
    /// The child as a record, if it is one.
    pub fn as_record(&self) -> Option<&'a Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Entity(_) => None,
        }
    }

    /// The child as an entity, if it is one.
    pub fn as_entity(&self) -> Option<&'a Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Record(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Children<'a> {
    Records(slice::Iter<'a, Record>),
    Entities(slice::Iter<'a, Entity>),
    None,
}

/// Iterator over the children of a composite [`Entity`].
#[derive(Debug, Clone)]
pub struct Elements<'a> {
    children: Children<'a>,
    filter: Option<ElementFilter>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.children {
            Children::Records(records) => match self.filter {
                Some(ElementFilter::Entities) => None,
                _ => records.next().map(ElementRef::Record),
            },
            Children::Entities(entities) => match self.filter {
                None | Some(ElementFilter::Entities) => entities.next().map(ElementRef::Entity),
                Some(ElementFilter::Records) => entities
                    .find_map(Entity::as_record)
                    .map(ElementRef::Record),
            },
            Children::None => None,
        }
    }
}

impl FusedIterator for Elements<'_> {}

impl Entity {
    /// Iterates over the children of a composite entity.
    ///
    /// Item composites yield their single child; primitives yield nothing.
    pub fn elements(&self, filter: Option<ElementFilter>) -> Elements<'_> {
        let children = match self.payload() {
            Payload::Raw(_) => Children::None,
            Payload::Record(record) => Children::Records(slice::from_ref(&**record).iter()),
            Payload::Records(records) => Children::Records(records.iter()),
            Payload::Entity(entity) => Children::Entities(slice::from_ref(&**entity).iter()),
            Payload::Entities(entities) => Children::Entities(entities.iter()),
        };
        Elements { children, filter }
    }
}
