pub mod random;
pub mod same_language;
