//! Structural diff of nested CV documents.
//!
//! Leaf-first: path access, flat-collection diff, bullet-list diff, then the
//! whole-document walk and the classifier that makes raw diffs reviewable.

pub mod arrays;
pub mod bullets;
pub mod classify;
pub mod document;
pub mod path;
