pub mod payload;
pub mod submit;
pub mod transport;

pub use payload::Payload;
pub use submit::{GatewayRequest, Settled, Settlement, SubmitAction, Submission, SubmitQueue};
pub use transport::{HttpTransport, Reply, Transport, TransportError};
