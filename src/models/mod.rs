pub mod chart;
pub mod query_history;
pub mod query_result;
pub mod settings;

pub use chart::*;
pub use query_history::*;
pub use query_result::*;
pub use settings::*;
