pub mod grid;
pub mod header;
pub mod identity;
pub mod normalize;
pub mod source;

#[cfg(test)]
mod sheet_tests;
