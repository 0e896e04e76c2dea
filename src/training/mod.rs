/// Training infrastructure for the classifier
pub mod checkpoint;
pub mod trainer;

pub use checkpoint::{load_weights, save_weights};
pub use trainer::Trainer;
