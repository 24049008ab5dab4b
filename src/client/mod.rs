//! Page-side half of the push flow.
//!
//! ```text
//! page load -> register worker -> query subscription -> render status
//! enable    -> permission -> VAPID key -> subscribe -> POST /push/subscribe -> render
//! disable   -> unsubscribe -> POST /push/unsubscribe -> render
//! ```

pub mod controller;
pub mod manager;
pub mod platform;
pub mod sync;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
