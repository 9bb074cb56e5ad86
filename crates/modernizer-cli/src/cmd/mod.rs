pub mod mcp;
pub mod serve;
