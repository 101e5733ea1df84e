pub mod analyze;
pub mod scan;
