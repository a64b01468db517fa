//! Document sink for finished parts

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dwh_kernel::Shape;

use crate::part::Color;
use crate::placement::Placement;

/// Handle of an object registered in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(Uuid);

impl ObjectHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiver of realized parts
///
/// An object's placement may be set exactly once.
pub trait Document {
    /// Register a finished shape under `name`
    fn add_object(
        &mut self,
        name: &str,
        shape: &Shape,
        color: Color,
    ) -> Result<ObjectHandle, DocumentError>;

    fn set_placement(
        &mut self,
        handle: ObjectHandle,
        placement: Placement,
    ) -> Result<(), DocumentError>;

    /// Register a named group of existing objects
    fn add_group(
        &mut self,
        name: &str,
        members: &[ObjectHandle],
    ) -> Result<ObjectHandle, DocumentError>;
}

/// One entry of a [`MemoryDocument`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentObject {
    pub handle: ObjectHandle,
    /// Unique name within the document
    pub name: String,
    /// Name requested by the caller
    pub label: String,
    /// None for groups
    pub shape: Option<Shape>,
    pub color: Color,
    pub placement: Option<Placement>,
    /// Group members in order
    pub members: Vec<ObjectHandle>,
}

impl DocumentObject {
    pub fn is_group(&self) -> bool {
        self.shape.is_none()
    }
}

/// In-memory document keeping objects in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    objects: Vec<DocumentObject>,
    index: HashMap<ObjectHandle, usize>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[DocumentObject] {
        &self.objects
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&DocumentObject> {
        self.index.get(&handle).map(|i| &self.objects[*i])
    }

    /// Find an object by its unique name
    pub fn find(&self, name: &str) -> Option<&DocumentObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// `label`, or `label001`, `label002`, ... when taken
    fn unique_name(&self, label: &str) -> String {
        if self.find(label).is_none() {
            return label.to_string();
        }
        (1..)
            .map(|n| format!("{}{:03}", label, n))
            .find(|candidate| self.find(candidate).is_none())
            .unwrap_or_else(|| format!("{}_{}", label, self.objects.len()))
    }

    fn insert(
        &mut self,
        label: &str,
        shape: Option<Shape>,
        color: Color,
        members: Vec<ObjectHandle>,
    ) -> ObjectHandle {
        let handle = ObjectHandle::new();
        let name = self.unique_name(label);
        tracing::debug!("document: added '{}'", name);
        self.index.insert(handle, self.objects.len());
        self.objects.push(DocumentObject {
            handle,
            name,
            label: label.to_string(),
            shape,
            color,
            placement: None,
            members,
        });
        handle
    }
}

impl Document for MemoryDocument {
    fn add_object(
        &mut self,
        name: &str,
        shape: &Shape,
        color: Color,
    ) -> Result<ObjectHandle, DocumentError> {
        Ok(self.insert(name, Some(shape.clone()), color, Vec::new()))
    }

    fn set_placement(
        &mut self,
        handle: ObjectHandle,
        placement: Placement,
    ) -> Result<(), DocumentError> {
        let i = *self
            .index
            .get(&handle)
            .ok_or(DocumentError::UnknownObject(handle))?;
        let object = &mut self.objects[i];
        if object.placement.is_some() {
            tracing::warn!("placement of '{}' is already set", object.name);
            return Err(DocumentError::PlacementAlreadySet(object.name.clone()));
        }
        object.placement = Some(placement);
        Ok(())
    }

    fn add_group(
        &mut self,
        name: &str,
        members: &[ObjectHandle],
    ) -> Result<ObjectHandle, DocumentError> {
        if let Some(missing) = members.iter().find(|m| !self.index.contains_key(*m)) {
            return Err(DocumentError::UnknownObject(*missing));
        }
        Ok(self.insert(name, None, Color::default(), members.to_vec()))
    }
}

/// Document-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("Unknown document object: {0}")]
    UnknownObject(ObjectHandle),
    #[error("Placement of '{0}' can only be set once")]
    PlacementAlreadySet(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_names_are_unique() {
        let mut doc = MemoryDocument::new();
        let shape = Shape::new(Uuid::new_v4());
        let a = doc.add_object("bolt", &shape, Color::default()).unwrap();
        let b = doc.add_object("bolt", &shape, Color::default()).unwrap();
        let c = doc.add_object("bolt", &shape, Color::default()).unwrap();
        assert_eq!(doc.get(a).unwrap().name, "bolt");
        assert_eq!(doc.get(b).unwrap().name, "bolt001");
        assert_eq!(doc.get(c).unwrap().name, "bolt002");
        assert_eq!(doc.get(c).unwrap().label, "bolt");
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_placement_set_once() {
        let mut doc = MemoryDocument::new();
        let handle = doc
            .add_object("plate", &Shape::new(Uuid::new_v4()), Color::default())
            .unwrap();
        let placement = Placement::IDENTITY.translated(Vec3::Z);
        doc.set_placement(handle, placement).unwrap();
        assert_eq!(
            doc.set_placement(handle, Placement::IDENTITY),
            Err(DocumentError::PlacementAlreadySet("plate".into()))
        );
        assert_eq!(doc.get(handle).unwrap().placement, Some(placement));
    }

    #[test]
    fn test_group_members_must_exist() {
        let mut doc = MemoryDocument::new();
        let handle = doc
            .add_object("rod", &Shape::new(Uuid::new_v4()), Color::default())
            .unwrap();
        let group = doc.add_group("support", &[handle]).unwrap();
        let object = doc.find("support").unwrap();
        assert!(object.is_group());
        assert_eq!(object.members, vec![handle]);
        assert_eq!(object.handle, group);

        let stray = ObjectHandle::new();
        assert_eq!(
            doc.add_group("broken", &[stray]),
            Err(DocumentError::UnknownObject(stray))
        );
    }
}
