//! Domain model (snapshot, target id, outcomes, errors).

pub mod errors;
pub mod outcome;
pub mod snapshot;
pub mod target;

pub use self::errors::{ErrorKind, NetworkErrorKind, SyncError};
pub use self::outcome::{CycleReport, CycleResult, SkipReason, SubmitOutcome, UploadResult};
pub use self::snapshot::{PNG_ENVELOPE, Snapshot, strip_envelope};
pub use self::target::{TargetId, extract_identifier};
