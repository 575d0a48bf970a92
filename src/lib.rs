pub mod error;
pub mod logging;
pub mod policy;
pub mod settings;
pub mod utils;

pub use error::{Error, Result};
pub use policy::cleaner::{clean_policy_text, CleanerConfig, PolicyCleaner};
pub use policy::pdf_extractor::extract_text_from_pdf;
pub use policy::report::{generate_html, generate_html_with, RenderOptions};
pub use policy::{PolicyData, Rule};
