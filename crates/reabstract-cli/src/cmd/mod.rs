pub mod batch;
pub mod invert;
