// Layout: font measurement, style primitives and the flow/pagination engine.
// Shared by the screen preview and the structured PDF backend so both place
// text the same way.

pub mod flow;
pub mod font_metrics;
pub mod style;

pub use flow::{layout, FlowItem, Fragment, LaidOutPage, Placed, PlacedRule, PlacedText};
pub use font_metrics::{FontFace, FontMetricTable};
pub use style::{Align, Color, PageGeometry, TextStyle};
