pub mod dispatcher;
pub mod transport;

pub use dispatcher::QueryDispatcher;
pub use transport::{HttpResponse, HttpTransport, Transport, UnavailableTransport};
