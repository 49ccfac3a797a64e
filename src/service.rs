pub mod submission;
pub mod ui;

pub use self::{submission::*, ui::*};
