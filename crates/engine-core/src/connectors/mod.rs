pub mod backend;
pub mod directory;
pub mod local;
