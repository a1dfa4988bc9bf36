mod choice;
mod estimator_choice;

pub use choice::Choice;
pub use estimator_choice::*;
