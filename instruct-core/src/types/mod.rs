mod const_typeid;
pub use const_typeid::*;

mod def;
pub use def::*;

mod field;
pub use field::*;

mod shape;
pub use shape::*;
