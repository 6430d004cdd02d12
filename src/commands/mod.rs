pub mod chart;
pub mod export;
pub mod query;
pub mod query_history;
pub mod settings;

pub use chart::*;
pub use export::*;
pub use query::*;
pub use query_history::*;
pub use settings::*;
