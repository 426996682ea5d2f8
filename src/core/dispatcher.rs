//! Keyed, type-partitioned event dispatcher.
//!
//! Callbacks are stored per event type under keys drawn from one global
//! allocator, so a key identifies a callback regardless of its event type.
//! Callbacks registered on behalf of an owner can be removed together.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use bevy::prelude::*;

use super::event::{AnyCallback, Callback, ConEvent, EventKind, IntoCallbackFn};
use super::ids::SequentialIdAllocator;
use super::{ConsoleError, Result};

/// Handle identifying one registered callback.
pub type CallbackKey = u32;

/// Id of an entity that registered callbacks on its own behalf.
pub type OwnerId = u32;

/// Delivers events to the callbacks registered for their type.
///
/// Delivery is synchronous and follows key order, which is registration order
/// until keys start being reused.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// use bevy_cvar_console::core::{ConEvent, Dispatcher};
///
/// struct Damage(u32);
/// impl ConEvent for Damage {
///     const NAME: &'static str = "damage";
/// }
///
/// let total = Arc::new(AtomicU32::new(0));
/// let mut dispatcher = Dispatcher::default();
///
/// let sum = total.clone();
/// let key = dispatcher
///     .add_callback::<Damage, _>(move |damage: &Damage| {
///         sum.fetch_add(damage.0, Ordering::SeqCst);
///     })
///     .unwrap();
///
/// dispatcher.dispatch(&Damage(5));
/// dispatcher.remove_callback(key);
/// dispatcher.dispatch(&Damage(5));
/// assert_eq!(total.load(Ordering::SeqCst), 5);
/// ```
#[derive(Resource, Default)]
pub struct Dispatcher {
    callbacks: HashMap<EventKind, BTreeMap<CallbackKey, AnyCallback>>,
    owners: HashMap<OwnerId, BTreeSet<CallbackKey>>,
    keys: SequentialIdAllocator<CallbackKey>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dispatcher drawing its keys from `keys`.
    #[cfg(test)]
    pub(crate) fn with_keys(keys: SequentialIdAllocator<CallbackKey>) -> Self {
        Self {
            keys,
            ..Self::default()
        }
    }

    /// Register a callback for events of type `E`.
    ///
    /// The callback may take no arguments or `&E`.
    pub fn add_callback<E: ConEvent, M>(
        &mut self,
        func: impl IntoCallbackFn<E, M>,
    ) -> Result<CallbackKey> {
        self.insert(Callback::new(func))
    }

    /// Register a callback that only fires for events matching `predicate`.
    pub fn add_callback_if<E: ConEvent, M>(
        &mut self,
        func: impl IntoCallbackFn<E, M>,
        predicate: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Result<CallbackKey> {
        self.insert(Callback::new(func).with_predicate(predicate))
    }

    /// Register a callback on behalf of `owner`.
    pub fn add_owned_callback<E: ConEvent, M>(
        &mut self,
        owner: OwnerId,
        func: impl IntoCallbackFn<E, M>,
    ) -> Result<CallbackKey> {
        self.insert_owned(owner, Callback::new(func))
    }

    /// Register a predicate-gated callback on behalf of `owner`.
    pub fn add_owned_callback_if<E: ConEvent, M>(
        &mut self,
        owner: OwnerId,
        func: impl IntoCallbackFn<E, M>,
        predicate: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Result<CallbackKey> {
        self.insert_owned(owner, Callback::new(func).with_predicate(predicate))
    }

    /// Register a prepared [`Callback`].
    ///
    /// Fails with [`ConsoleError::Overflow`] when no key is left.
    pub fn insert<E: ConEvent>(&mut self, callback: Callback<E>) -> Result<CallbackKey> {
        let key = self.keys.get()?;
        let kind = EventKind::of::<E>();

        match self.callbacks.entry(kind).or_default().entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(AnyCallback::new(callback));
            }
            Entry::Occupied(_) => {
                warn!("Callback key {} already registered for {}", key, kind.name());
                return Err(ConsoleError::Creation(format!(
                    "callback key {key} is already registered for {}",
                    kind.name()
                )));
            }
        }

        debug!("Registered callback {} for {}", key, kind.name());
        Ok(key)
    }

    /// Register a prepared [`Callback`] on behalf of `owner`.
    pub fn insert_owned<E: ConEvent>(
        &mut self,
        owner: OwnerId,
        callback: Callback<E>,
    ) -> Result<CallbackKey> {
        let key = self.insert(callback)?;
        self.owners.entry(owner).or_default().insert(key);
        Ok(key)
    }

    /// Remove the callback registered under `key`.
    ///
    /// Returns `false` if no such callback exists. The key is also dropped
    /// from whichever owner recorded it.
    pub fn remove_callback(&mut self, key: CallbackKey) -> bool {
        let mut removed = false;
        self.callbacks.retain(|_, table| {
            removed |= table.remove(&key).is_some();
            !table.is_empty()
        });

        if !removed {
            return false;
        }

        self.keys.free(key);
        self.owners.retain(|_, keys| {
            keys.remove(&key);
            !keys.is_empty()
        });
        debug!("Removed callback {}", key);
        true
    }

    /// Remove `key` if it was registered by `owner`.
    pub fn remove_owned_callback(&mut self, owner: OwnerId, key: CallbackKey) -> bool {
        let owned = self
            .owners
            .get(&owner)
            .is_some_and(|keys| keys.contains(&key));
        owned && self.remove_callback(key)
    }

    /// Remove every callback registered by `owner`. Returns how many were removed.
    pub fn remove_callbacks(&mut self, owner: OwnerId) -> usize {
        let Some(keys) = self.owners.remove(&owner) else {
            return 0;
        };

        let removed = keys
            .into_iter()
            .filter(|key| self.remove_callback(*key))
            .count();
        debug!("Removed {} callbacks owned by {}", removed, owner);
        removed
    }

    /// Deliver `event` to every callback registered for `E`.
    ///
    /// Returns how many callbacks ran; predicate-declined callbacks do not
    /// count.
    pub fn dispatch<E: ConEvent>(&mut self, event: &E) -> usize {
        let Some(table) = self.callbacks.get_mut(&EventKind::of::<E>()) else {
            return 0;
        };

        let mut delivered = 0;
        for (key, callback) in table.iter_mut() {
            match callback.invoke(event) {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(err) => error!("Callback {} rejected event: {}", key, err),
            }
        }
        delivered
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.values().map(BTreeMap::len).sum()
    }

    /// Check if no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Number of callbacks registered for `E`.
    pub fn len_for<E: ConEvent>(&self) -> usize {
        self.callbacks
            .get(&EventKind::of::<E>())
            .map_or(0, BTreeMap::len)
    }

    /// Check if `key` is registered.
    pub fn contains(&self, key: CallbackKey) -> bool {
        self.callbacks.values().any(|table| table.contains_key(&key))
    }

    /// Keys registered by `owner`, in ascending order.
    pub fn owned_keys(&self, owner: OwnerId) -> impl Iterator<Item = CallbackKey> + '_ {
        self.owners.get(&owner).into_iter().flatten().copied()
    }
}
