pub mod change;
pub mod document;
