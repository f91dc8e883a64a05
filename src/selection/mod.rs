//! Cascading selection core: path state, display ordering, and notifications.

pub mod controller;
pub mod events;
pub mod path;
pub mod reorder;
