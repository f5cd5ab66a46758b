//! Fixed-point arithmetic kernel

pub mod basic_ops;
pub mod inv_sqrt;

pub use basic_ops::*;
pub use inv_sqrt::inv_sqrt;
