//! Sequential identifier allocation with reuse of freed ids.

use std::collections::BTreeSet;
use std::fmt;

use super::{ConsoleError, Result};

/// An integer type usable as an identifier.
pub trait IdType: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Type name used in diagnostics.
    const NAME: &'static str;
    /// The default first id.
    const ZERO: Self;

    /// Add a signed step, or `None` on overflow.
    fn checked_offset(self, step: i64) -> Option<Self>;
}

macro_rules! impl_id_type {
    ($($t:ty),* $(,)?) => {$(
        impl IdType for $t {
            const NAME: &'static str = stringify!($t);
            const ZERO: Self = 0;

            #[inline]
            fn checked_offset(self, step: i64) -> Option<Self> {
                <$t>::try_from(self as i128 + i128::from(step)).ok()
            }
        }
    )*};
}

impl_id_type!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Hands out unique ids, reusing released ones before minting new ones.
///
/// Fresh ids start at `start` and advance by `step`. An id is only minted if
/// the id after it is still representable, so the allocator stops one step
/// short of the end of the range instead of wrapping around.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::SequentialIdAllocator;
///
/// let mut ids = SequentialIdAllocator::<u32>::default();
/// let a = ids.get().unwrap();
/// let b = ids.get().unwrap();
/// assert_eq!((a, b), (0, 1));
///
/// ids.free(a);
/// assert_eq!(ids.get().unwrap(), a);
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIdAllocator<Id: IdType> {
    next: Id,
    step: i64,
    freed: BTreeSet<Id>,
    in_use: BTreeSet<Id>,
}

impl<Id: IdType> Default for SequentialIdAllocator<Id> {
    fn default() -> Self {
        Self {
            next: Id::ZERO,
            step: 1,
            freed: BTreeSet::new(),
            in_use: BTreeSet::new(),
        }
    }
}

impl<Id: IdType> SequentialIdAllocator<Id> {
    /// Create an allocator counting from `start` by `step`.
    ///
    /// A zero step is rejected since it could never produce a second id.
    pub fn new(start: Id, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(ConsoleError::InvalidArgument(
                "id allocator step must be non-zero".to_owned(),
            ));
        }
        Ok(Self {
            next: start,
            step,
            ..Default::default()
        })
    }

    /// Allocate an id.
    ///
    /// The smallest freed id is preferred. Fails with
    /// [`ConsoleError::Overflow`] when no freed id is available and advancing
    /// the counter would leave the range of `Id`.
    pub fn get(&mut self) -> Result<Id> {
        if let Some(id) = self.freed.pop_first() {
            self.in_use.insert(id);
            return Ok(id);
        }

        let id = self.next;
        self.next = id.checked_offset(self.step).ok_or_else(|| {
            ConsoleError::Overflow(format!(
                "no {} id left after {:?} with step {}",
                Id::NAME,
                id,
                self.step
            ))
        })?;
        self.in_use.insert(id);
        Ok(id)
    }

    /// Release an id for reuse. Freeing an id that is not in use does nothing.
    pub fn free(&mut self, id: Id) {
        if self.in_use.remove(&id) {
            self.freed.insert(id);
        }
    }

    /// Check if `id` is currently handed out.
    #[inline]
    pub fn is_in_use(&self, id: Id) -> bool {
        self.in_use.contains(&id)
    }

    /// Number of ids currently handed out.
    #[inline]
    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }
}
