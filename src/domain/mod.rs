pub mod branch;
pub mod hub;
pub mod reference;
pub mod vertex;

pub use branch::*;
pub use hub::*;
pub use reference::*;
pub use vertex::*;
