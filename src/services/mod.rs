pub mod catalog_filter;
pub mod chef_chat;
pub mod completion;
pub mod normalizer;
pub mod prompt;
pub mod recommendations;
pub mod time_parser;

pub use completion::{CompletionClient, CompletionService};
pub use recommendations::RecommendationEngine;
