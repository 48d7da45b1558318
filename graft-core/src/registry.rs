//! The process-wide descriptor cache.
//!
//! Descriptors are built once per type (inside the generated `descriptor()`
//! body) and indexed here by `TypeId` so that erased nodes can be resolved
//! back to their tables. Entries are immutable after insertion.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use crate::descriptor::{Graft, TypeDescriptor};

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, &'static TypeDescriptor>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Resolve (and cache) the descriptor of `T`.
///
/// Concurrent first calls for the same type are safe; the descriptor itself
/// is constructed exactly once regardless of how the index race resolves.
pub fn describe<T: Graft>() -> &'static TypeDescriptor {
    let descriptor = T::descriptor();
    let type_id = descriptor.type_id();
    let known = {
        let index = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
        index.contains_key(&type_id)
    };
    if !known {
        let mut index = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
        if index.insert(type_id, descriptor).is_none() {
            log::trace!("registered descriptor for {}", descriptor.type_name());
        }
    }
    descriptor
}

/// Look up a previously described type by `TypeId`.
pub fn lookup(type_id: TypeId) -> Option<&'static TypeDescriptor> {
    let index = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    index.get(&type_id).copied()
}

/// Drop the index. Test support; re-describing a type afterwards is
/// observably indistinguishable from the first call.
pub fn clear() {
    let mut index = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    index.clear();
}
