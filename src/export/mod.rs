//! Export of models to formats read by other solvers.

pub mod pomdp;

pub use pomdp::PomdpExporter;
