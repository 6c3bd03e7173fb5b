mod edit;
mod launch;

pub use edit::EditScreen;
pub use launch::LaunchScreen;
