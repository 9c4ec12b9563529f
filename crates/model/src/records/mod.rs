pub mod kv;
pub mod object;
