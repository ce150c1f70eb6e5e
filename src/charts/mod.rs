//! Charts module - Chart specifications and static rendering

mod plotter;
mod renderer;

pub use plotter::{Bar, BubbleSeries, ChartKind, ChartPlotter, ChartSpec, TimeSeries};
pub use renderer::{RenderError, StaticChartRenderer};
