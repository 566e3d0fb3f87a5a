pub mod controller;
pub mod gesture;
pub mod static_map;
pub mod state;

pub use controller::*;
pub use gesture::*;
pub use static_map::*;
pub use state::*;
