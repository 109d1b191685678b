use std::collections::HashMap;

use tracing::debug;

use super::SyncObject;
use crate::ObjectError;
use crate::Result;
use crate::types::Handle;
use crate::types::ObjectId;
use crate::types::ProcessId;
use crate::Waitable;

/// Minimal generic object base: named create-or-open, per-process handle
/// tables with granted-access masks, reference counting, and removal on
/// last close.
///
/// Security descriptors and the directory namespace belong to the full
/// object manager and are not modeled here; names live in one flat map.
pub(crate) struct ObjectRegistry {
    objects: HashMap<ObjectId, Registered>,
    names: HashMap<String, ObjectId>,
    handles: HashMap<ProcessId, HashMap<Handle, HandleEntry>>,
    next_object: u64,
    next_handle: u32,
}

struct Registered {
    object: SyncObject,
    name: Option<String>,
    refs: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct HandleEntry {
    pub object: ObjectId,
    /// Granted access mask, generic bits already expanded
    pub access: u32,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            names: HashMap::new(),
            handles: HashMap::new(),
            next_object: 1,
            next_handle: 1,
        }
    }

    /// Reserve an identity for an object about to be constructed. The
    /// payload is built first so that a failed backend allocation leaves no
    /// partially constructed object behind.
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        id
    }

    /// Look up a name, enforcing kind agreement with what the caller is
    /// about to create or open.
    pub fn find_named(
        &self,
        name: &str,
        expected: &'static str,
    ) -> Result<Option<ObjectId>> {
        match self.names.get(name) {
            None => Ok(None),
            Some(&id) => {
                let found = self.objects[&id].object.type_name();
                if found != expected {
                    return Err(ObjectError::TypeMismatch { expected, found }.into());
                }
                Ok(Some(id))
            }
        }
    }

    /// Register a freshly constructed object under an optional name.
    pub fn insert(
        &mut self,
        object: SyncObject,
        name: Option<String>,
    ) -> ObjectId {
        let id = object.id();
        if let Some(name) = &name {
            self.names.insert(name.clone(), id);
        }
        self.objects.insert(
            id,
            Registered {
                object,
                name,
                refs: 0,
            },
        );
        id
    }

    /// Allocate a handle in `process`, expanding generic access bits through
    /// the object's access mapping.
    pub fn alloc_handle(
        &mut self,
        process: ProcessId,
        object: ObjectId,
        access: u32,
    ) -> Result<Handle> {
        let registered = self
            .objects
            .get_mut(&object)
            .ok_or_else(|| stale_object(object))?;
        let granted = registered.object.map_access(access);
        registered.refs += 1;

        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        self.handles.entry(process).or_default().insert(
            handle,
            HandleEntry {
                object,
                access: granted,
            },
        );
        Ok(handle)
    }

    /// Resolve a handle, checking that every bit of `required_access` was
    /// granted. The access check runs before any state is touched.
    pub fn get_handle_obj(
        &self,
        process: ProcessId,
        handle: Handle,
        required_access: u32,
    ) -> Result<ObjectId> {
        let entry = self.handle_entry(process, handle)?;
        if entry.access & required_access != required_access {
            return Err(ObjectError::AccessDenied {
                required: required_access,
                granted: entry.access,
            }
            .into());
        }
        Ok(entry.object)
    }

    pub fn handle_entry(
        &self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<HandleEntry> {
        self.handles
            .get(&process)
            .and_then(|table| table.get(&handle))
            .copied()
            .ok_or_else(|| ObjectError::InvalidHandle(handle).into())
    }

    pub fn object_mut(
        &mut self,
        object: ObjectId,
    ) -> Result<&mut SyncObject> {
        self.objects
            .get_mut(&object)
            .map(|registered| &mut registered.object)
            .ok_or_else(|| stale_object(object))
    }

    pub fn object(
        &self,
        object: ObjectId,
    ) -> Result<&SyncObject> {
        self.objects
            .get(&object)
            .map(|registered| &registered.object)
            .ok_or_else(|| stale_object(object))
    }

    /// Close a handle. When the last reference drops, the object is removed
    /// from the registry and returned so the caller can finalize it.
    pub fn close_handle(
        &mut self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<Option<SyncObject>> {
        let entry = self
            .handles
            .get_mut(&process)
            .and_then(|table| table.remove(&handle))
            .ok_or(ObjectError::InvalidHandle(handle))?;

        let mut registered = self
            .objects
            .remove(&entry.object)
            .ok_or_else(|| stale_object(entry.object))?;
        registered.refs -= 1;
        if registered.refs > 0 {
            self.objects.insert(entry.object, registered);
            return Ok(None);
        }

        if let Some(name) = &registered.name {
            self.names.remove(name);
            debug!(object = entry.object.0, name, "named object destroyed");
        }
        Ok(Some(registered.object))
    }
}

fn stale_object(object: ObjectId) -> crate::Error {
    ObjectError::InvalidParameter(format!("no such object {}", object.0)).into()
}
