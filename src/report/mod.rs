//! Chart report: the figure model plus its PNG and interactive HTML renderings.

pub mod figure;
pub mod html;
pub mod plot;

pub use figure::{Figure, Panel, Series};
