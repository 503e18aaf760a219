mod cell;
mod outcome;
mod record;
mod report;

pub use cell::{A1ParseError, CellRef, WriteTarget, column_index, column_name};
pub use outcome::{OutcomeKind, SyncOutcome};
pub use record::{FileSignature, PersonalBestEntry, ResultRecord, SourceFileId};
pub use report::{FileReport, SyncReport, SyncSummary};
