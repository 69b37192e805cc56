//! Business logic for each bot. Handlers stay thin and call into these.

pub mod assistant;
pub mod email;
pub mod voice;
