pub mod prompt;
pub mod response;

pub use prompt::build_classification_prompt;
pub use response::parse_classification;
