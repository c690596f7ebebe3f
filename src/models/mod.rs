mod element;
mod point;
mod rectangle;
mod force_object;

pub use element::*;
pub use point::*;
pub use rectangle::*;
pub use force_object::*;
