//! Client-side core for a "find a coach" application: session lifecycle
//! against a remote identity provider, coach/request synchronization with a
//! keyed JSON store, local cart state, and the route table with its
//! authorization policy. Rendering belongs to the UI shell consuming this
//! crate.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
