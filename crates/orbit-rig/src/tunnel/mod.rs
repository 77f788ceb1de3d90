pub mod path;
pub mod traversal;
