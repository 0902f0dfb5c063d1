pub mod coord;
pub mod direction;
pub mod probe;
pub mod errors;

pub use coord::*;
pub use direction::*;
pub use probe::*;
pub use errors::*;
