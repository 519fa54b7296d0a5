//! Markdown body transforms: image link rewriting and code-block labeling.

pub mod images;
pub mod syntax;
pub mod tree;

pub use images::{rewrite_images, ImageReference};
pub use syntax::{classify, is_js, visit_mut, DocumentNode};
pub use tree::{fix_code_fences, parse_tree};
