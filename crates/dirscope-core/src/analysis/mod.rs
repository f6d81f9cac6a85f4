/// Analysis modules: classification and post-scan breakdowns.
pub mod file_types;

pub use file_types::{
    analyse_file_types, categorise_extension, category_of, classify, extension_of,
    CategoryStats, FileCategory,
};
