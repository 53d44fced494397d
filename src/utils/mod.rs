pub mod bits;
pub mod io;
pub mod limits;
