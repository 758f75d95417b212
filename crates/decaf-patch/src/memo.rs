// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Computed-once cache slots for derived patcher state.

use crate::error::{PatchError, PatchResult};

/// A value derived lazily during patching and never recomputed.
///
/// Filling a slot twice is a bug in the owning patcher, reported as
/// `PatchError::AlreadyComputed` rather than silently overwriting.
#[derive(Debug, Clone)]
pub struct Memo<T> {
    name: &'static str,
    slot: Option<T>,
}

impl<T> Memo<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, slot: None }
    }

    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.slot.is_some()
    }

    pub fn fill(&mut self, value: T) -> PatchResult<&T> {
        if self.slot.is_some() {
            return Err(PatchError::AlreadyComputed { name: self.name });
        }
        Ok(self.slot.insert(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_once() {
        let mut memo = Memo::new("value binding");
        assert!(memo.get().is_none());
        assert_eq!(memo.fill("x".to_string()).unwrap(), "x");
        assert_eq!(memo.get().map(String::as_str), Some("x"));
        assert_eq!(
            memo.fill("y".to_string()),
            Err(PatchError::AlreadyComputed { name: "value binding" })
        );
        assert!(memo.is_filled());
    }
}
