pub mod analyze;
pub mod meta;
