//! Reusable graphics utilities for emulator systems

pub mod color;

pub use color::ColorOps;
