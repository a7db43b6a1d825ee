use bytes::Bytes;

use crate::Staging;

/// A staged allocation whose contents keep their address when the slot itself is moved.
///
/// # Safety
/// Implementors must guarantee that the pointer returned by [`StableSlot::as_ptr`] stays valid
/// for reads of [`StableSlot::len`] elements for as long as the slot is alive and unmodified,
/// no matter how often the slot value is moved.
pub unsafe trait StableSlot: Send + 'static {
    /// The element type the slot exposes
    type Elem;

    /// A pointer to the first element
    fn as_ptr(&self) -> *const Self::Elem;

    /// The number of elements behind [`StableSlot::as_ptr`]
    fn len(&self) -> usize;

    /// Returns true if the slot holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// SAFETY: `Bytes` is a handle to a separately allocated (or static) region, moving the handle
// does not move the region.
unsafe impl StableSlot for Bytes {
    type Elem = u8;

    fn as_ptr(&self) -> *const u8 {
        self.as_ref().as_ptr()
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

// SAFETY: a boxed slice owns a heap allocation that does not move with the box.
unsafe impl<T: Send + 'static> StableSlot for Box<[T]> {
    type Elem = T;

    fn as_ptr(&self) -> *const T {
        self.as_ref().as_ptr()
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

/// The staged form of one variable-length sequence: the converted elements, plus the staging
/// those elements reference in turn.
#[derive(Debug)]
pub struct VarLenSlot<W, B> {
    elements: Box<[W]>,
    nested: B,
}

impl<W, B> VarLenSlot<W, B> {
    /// Create a slot from converted elements and the staging they were converted into.
    pub fn new(elements: impl Into<Box<[W]>>, nested: B) -> Self {
        Self {
            elements: elements.into(),
            nested,
        }
    }

    /// The converted elements
    pub fn elements(&self) -> &[W] {
        &self.elements
    }

    /// The staging of the elements
    pub fn nested(&self) -> &B {
        &self.nested
    }
}

impl<W, B: Default> Default for VarLenSlot<W, B> {
    fn default() -> Self {
        Self {
            elements: Box::default(),
            nested: B::default(),
        }
    }
}

// SAFETY: the elements live in a boxed slice whose heap allocation does not move with the slot.
// The nested staging is itself made of stable slots.
unsafe impl<W: Send + 'static, B: Staging> StableSlot for VarLenSlot<W, B> {
    type Elem = W;

    fn as_ptr(&self) -> *const W {
        self.elements.as_ptr()
    }

    fn len(&self) -> usize {
        self.elements.len()
    }
}

impl<W: Send + 'static, B: Staging> Staging for VarLenSlot<W, B> {
    fn reserve(&mut self, additional: usize) {
        self.nested.reserve(additional);
    }

    fn clear(&mut self) {
        self.elements = Box::default();
        self.nested.clear();
    }

    fn staged(&self) -> usize {
        self.elements.len()
    }
}

/// The address and length of a staged slot, as returned by [`Arena::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef<T> {
    ptr: *const T,
    len: usize,
}

impl<T> SlotRef<T> {
    /// A pointer to the first element of the slot
    pub fn ptr(&self) -> *const T {
        self.ptr
    }

    /// The number of elements in the slot
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the slot holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// An append-only collection of stable slots.
///
/// Addresses handed out by [`Arena::push`] remain valid until the arena is cleared or dropped.
#[derive(Debug)]
pub struct Arena<E> {
    slots: Vec<E>,
}

impl<E> Default for Arena<E> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<E: StableSlot> Arena<E> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty arena with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Stage a slot, returning the address of its contents.
    pub fn push(&mut self, slot: E) -> SlotRef<E::Elem> {
        let slot_ref = SlotRef {
            ptr: slot.as_ptr(),
            len: slot.len(),
        };
        if self.slots.len() == self.slots.capacity() {
            log::trace!("growing arena beyond {} slots", self.slots.capacity());
        }
        self.slots.push(slot);
        slot_ref
    }

    /// The number of staged slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The number of slots the arena can hold without growing
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Get a staged slot
    pub fn get(&self, index: usize) -> Option<&E> {
        self.slots.get(index)
    }

    /// Iterate the staged slots in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &E> + '_ {
        self.slots.iter()
    }
}

impl<E: StableSlot> Staging for Arena<E> {
    fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn staged(&self) -> usize {
        self.slots.len()
    }
}
