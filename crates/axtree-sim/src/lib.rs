pub mod fixture;
pub mod tree;

pub use fixture::{FixtureError, TreeFixture};
pub use tree::{NodeSpec, RangeSpec, Rect, SimTree};
