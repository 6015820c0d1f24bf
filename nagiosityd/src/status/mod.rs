pub mod assemble;
pub mod parser;
pub mod source;
