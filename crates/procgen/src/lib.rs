//! Procedural scenery: the wrap-around starfield and the battle station.

pub mod death_star;
pub mod starfield;

pub use death_star::*;
pub use starfield::*;
