//! Koopa IR base types (`spec.md` §3: "Base types").

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Unit,
    Int32,
    Pointer(Box<Type>),
    Array(Box<Type>, usize),
}

impl Type {
    /// Build the nested array type for a fixed shape, e.g. `[2, 3]` ->
    /// `[[i32, 3], 2]` (`spec.md` §4.2, "Array semantics").
    pub fn array_of(shape: &[usize]) -> Type {
        shape
            .iter()
            .rev()
            .fold(Type::Int32, |inner, &dim| Type::Array(Box::new(inner), dim))
    }

    /// A leading-decayed shape `[0, d2, ..., dn]` lowers to a pointer to the
    /// fixed-shape array of the remaining dimensions.
    pub fn decayed_ptr(trailing_shape: &[usize]) -> Type {
        Type::Pointer(Box::new(Type::array_of(trailing_shape)))
    }

    /// Total element count for an array type (1 for non-arrays), used to size
    /// `alloc`s and `.zero` directives.
    pub fn element_count(&self) -> usize {
        match self {
            Type::Array(inner, n) => n * inner.element_count(),
            _ => 1,
        }
    }

    /// Size in bytes this type occupies when held directly in a slot
    /// (`spec.md` §4.4: 4 bytes per scalar, `4 * Π(dims)` per array).
    pub fn size_bytes(&self) -> usize {
        match self {
            Type::Unit => 0,
            Type::Int32 | Type::Pointer(_) => 4,
            Type::Array(_, _) => 4 * self.element_count(),
        }
    }

    /// The type pointed to, if this is a pointer.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Peel one array dimension off (`[i32, 3]` -> `i32`, `[[i32,3],2]` ->
    /// `[i32,3]`), used when indexing one level deeper via `getelemptr`.
    pub fn array_elem(&self) -> Option<&Type> {
        match self {
            Type::Array(inner, _) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => write!(f, "unit"),
            Type::Int32 => write!(f, "i32"),
            Type::Pointer(inner) => write!(f, "*{inner}"),
            Type::Array(inner, n) => write!(f, "[{inner}, {n}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_nests_innermost_first() {
        let ty = Type::array_of(&[2, 3]);
        assert_eq!(ty.to_string(), "[[i32, 3], 2]");
    }

    #[test]
    fn decayed_ptr_wraps_remaining_dims() {
        let ty = Type::decayed_ptr(&[3]);
        assert_eq!(ty.to_string(), "*[i32, 3]");
    }

    #[test]
    fn element_count_multiplies_all_dims() {
        let ty = Type::array_of(&[2, 3, 4]);
        assert_eq!(ty.element_count(), 24);
        assert_eq!(ty.size_bytes(), 96);
    }
}
