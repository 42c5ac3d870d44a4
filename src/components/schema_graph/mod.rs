mod component;
mod render;
mod state;

pub use component::SchemaGraphView;
pub use state::{GraphCommand, MatchStatus};
