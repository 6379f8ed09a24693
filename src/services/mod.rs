pub mod captcha_gate;
pub mod carrier_session;
pub mod form_tokens;
pub mod reconcile_writer;
pub mod status_classifier;

pub use captcha_gate::{CaptchaChallenge, CaptchaGate, CaptchaProbe};
pub use carrier_session::{CarrierSession, RawResponse};
pub use form_tokens::FormTokens;
pub use reconcile_writer::{ApplyResult, ReconcileWriter};
pub use status_classifier::{classify, classify_result};
