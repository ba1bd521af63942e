//! Core, non-public bookkeeping for graph resolution.

use crate::error::{Error, Result};
use std::cell::RefCell;

thread_local! {
  // The definitions currently being resolved on this thread, outermost first.
  // Each entry is keyed by factory so independent factories never collide.
  static RESOLVING_STACK: RefCell<Vec<ResolutionKey>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, PartialEq, Eq)]
struct ResolutionKey {
  factory: usize,
  name: String,
}

/// An RAII guard that detects circular references.
///
/// Entering pushes the definition onto the thread-local resolution stack; if
/// it is already there the reference graph loops back on itself and entering
/// fails. Dropping the guard pops the entry.
pub(crate) struct ResolutionGuard {
  key: ResolutionKey,
}

impl ResolutionGuard {
  pub(crate) fn enter(factory: usize, name: &str) -> Result<Self> {
    let key = ResolutionKey {
      factory,
      name: name.to_owned(),
    };
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|entry| *entry == key) {
        let chain = stack[start..]
          .iter()
          .map(|entry| entry.name.as_str())
          .chain(std::iter::once(name))
          .collect::<Vec<_>>()
          .join(" -> ");
        return Err(Error::CircularReference { chain });
      }
      stack.push(key.clone());
      Ok(())
    })?;
    Ok(Self { key })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(index) = stack.iter().rposition(|entry| *entry == self.key) {
        stack.remove(index);
      }
    });
  }
}
