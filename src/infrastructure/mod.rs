pub mod http_transport;

pub use http_transport::{CarrierExchange, CarrierTransport, ReqwestTransport};
