pub mod analyzer;
pub mod normalize;
pub mod sport_selector;
