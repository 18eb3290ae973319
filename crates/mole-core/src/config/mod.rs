//! Configuration management for Mole.
//!
//! [`runtime::RuntimeConfig`] carries the resolved file locations and the
//! projects-mode flag. User preferences ([`settings::Config`]) and key
//! bindings ([`keymap::Keymap`]) are TOML files loaded at startup.

pub mod keymap;
pub mod runtime;
pub mod settings;
