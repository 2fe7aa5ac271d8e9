pub mod algebra;
pub mod automaton;
pub mod budget;
pub mod config;
pub mod error;
pub mod logger;
pub mod validation;
