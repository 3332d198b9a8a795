pub mod input;
pub mod knowledge;
pub mod names;
pub mod output;
pub mod patterns;
