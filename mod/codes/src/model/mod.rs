mod alert;
mod batch;
mod code;
mod history;
mod stats;
mod tier;

pub use alert::*;
pub use batch::*;
pub use code::*;
pub use history::*;
pub use stats::*;
pub use tier::*;
