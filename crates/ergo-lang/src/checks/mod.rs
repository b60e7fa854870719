//! Diagnostic producers. Each check reads an [`EasyConfigDocument`] and
//! appends to a shared diagnostic list; none of them fail.
//!
//! [`EasyConfigDocument`]: crate::extract::EasyConfigDocument

mod dependencies;
mod filename;
mod keywords;

pub use dependencies::{check_dependencies, file_has_version};
pub use filename::check_filename;
pub use keywords::check_keywords;
