//! Listing model, search filtering and the pinned-project focus list.

pub mod filter;
pub mod focus;
pub mod view;
