pub mod sampling;
pub mod suggestions;
