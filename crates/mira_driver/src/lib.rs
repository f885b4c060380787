//! Mirana compiler driver.
//!
//! A compile unit is one `.mira` file. Each unit is preprocessed, parsed and
//! translated on its own; the Lua output is written next to the input only
//! when the unit has no diagnostics. Units share nothing and are compiled in
//! parallel.

pub mod batch;
pub mod error;
pub mod options;
pub mod unit;

pub use batch::{compile_all, compile_file, discover, UnitReport, UnitStatus};
pub use error::DriverError;
pub use options::CompileOptions;
pub use unit::{banner, compile_source, output_path, CompileUnit};
