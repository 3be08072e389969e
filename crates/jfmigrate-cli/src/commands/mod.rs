//! CLI subcommands

pub mod convert;
pub mod scan;

pub use convert::ConvertArgs;
pub use scan::ScanArgs;
