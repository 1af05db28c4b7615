//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (HttpTransport, FileSystem)
//! but are themselves concrete structs, not traits.

mod config_resolver;
mod prober;
mod report;
mod session;
mod submission;

pub use config_resolver::ConfigResolver;
pub use prober::{ConnectivityProber, DirectProbeOutcome, ProbeOutcome};
pub use report::ReportWriter;
pub use session::{PingOutcome, Session, SessionOutcome};
pub use submission::{ParseResponse, Submission, SubmissionClient};
