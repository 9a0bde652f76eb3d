mod core;
pub mod models;
mod normalize;

pub use self::core::{generate_content, list_models};
pub use models::{Content, ContentRole, GenerateContentRequest, ModelInfo, Part};
pub use normalize::{NormalizedTurns, normalize_turns};
