//! GitHub webhook authentication and routing.
//!
//! ## Processing Flow
//!
//! ```text
//! headers → normalize_headers() → verify() → route() → dispatch() → build_response()
//! ```
//!
//! Every stage takes its inputs as arguments; the per-request
//! [`LogFields`] value is the only observability state and is never shared
//! between requests.

pub mod dispatch;
pub mod event;
pub mod handler;
pub mod headers;
pub mod response;
pub mod router;
pub mod signature;

pub use dispatch::{action_request, dispatch};
pub use event::{LogFields, WorkflowJobAction, WorkflowJobEvent, WORKFLOW_JOB_EVENT};
pub use handler::{handle, handle_normalized, process};
pub use headers::{normalize_headers, NormalizedHeaders};
pub use response::{build_response, Outcome, Response};
pub use router::{route, RouteDecision, RoutedEvent};
pub use signature::{
    sign_payload, verify, verify_signature, SignatureAlgorithm, SignatureHeader,
    SignatureVerification,
};
