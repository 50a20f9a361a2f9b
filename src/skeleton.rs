pub mod evaluator;
pub mod interpolate;
mod registry;

// Re-exports
pub use {
    evaluator::{animation_time, evaluate},
    registry::BoneRegistry,
};
