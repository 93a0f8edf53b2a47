//! Opaque GPU object handles.
//!
//! Every handle is a small integer owned by the backend that issued it. `0` is
//! reserved as "invalid / unbound"; uniform locations use `-1` instead, matching
//! what GL returns for an inactive uniform.

use std::cell::RefCell;
use std::collections::HashMap;

macro_rules! object_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub const INVALID: $name = $name(0);

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

object_handle!(
    /// Vertex or index buffer.
    Buffer
);
object_handle!(
    /// 2D texture.
    Texture
);
object_handle!(
    /// Linked shader program.
    Program
);
object_handle!(
    /// Single shader stage object.
    Shader
);
object_handle!(
    /// Vertex array object (attribute bindings).
    VertexArray
);

/// Location of a uniform inside a linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    pub const INVALID: UniformLocation = UniformLocation(-1);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Hands out non-zero handle ids.
#[derive(Debug)]
pub(crate) struct HandleCounter {
    next: std::cell::Cell<u32>,
}

impl HandleCounter {
    pub(crate) fn new() -> Self {
        Self { next: std::cell::Cell::new(1) }
    }

    pub(crate) fn next(&self) -> u32 {
        let id = self.next.get();
        // Wrapping past u32::MAX would hand out the sentinel.
        self.next.set(id.checked_add(1).unwrap_or(1));
        id
    }
}

/// Uniform locations keyed by `(program, name)`.
///
/// A repeated lookup returns the id issued the first time. Deleting a program
/// hands back every id issued for it so the backend can drop its objects.
#[derive(Debug, Default)]
pub(crate) struct UniformCache {
    entries: RefCell<HashMap<(u32, String), i32>>,
}

impl UniformCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cached location for `name`, or the one `resolve` yields. A `None`
    /// from `resolve` is not cached, since the program may be relinked.
    pub(crate) fn get_or_resolve(
        &self,
        program: Program,
        name: &str,
        resolve: impl FnOnce() -> Option<i32>,
    ) -> UniformLocation {
        let key = (program.0, name.to_owned());
        if let Some(&id) = self.entries.borrow().get(&key) {
            return UniformLocation(id);
        }
        match resolve() {
            Some(id) => {
                self.entries.borrow_mut().insert(key, id);
                UniformLocation(id)
            }
            None => UniformLocation::INVALID,
        }
    }

    /// Drops every entry of `program` and returns the released ids.
    pub(crate) fn forget_program(&self, program: Program) -> Vec<i32> {
        let mut released = Vec::new();
        self.entries.borrow_mut().retain(|(owner, _), id| {
            let keep = *owner != program.0;
            if !keep {
                released.push(*id);
            }
            keep
        });
        released.sort_unstable();
        released
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
