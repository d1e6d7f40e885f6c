pub mod arc;
pub mod rect;
pub mod transform;
