// Core modules: descriptor tables, matching, hierarchy walk, parsing, and errors.
pub mod dynamic;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod reflect;
