//! CSV and PNG export of the card, and the menu that sequences them.

pub mod coordinator;
pub mod download;
pub mod error;
pub mod scheduler;
pub mod snapshot;
pub mod table;
pub mod view;

pub use coordinator::{
    Capabilities, CaptureTicket, ExportCoordinator, ExportHost, ExportState, MenuItem, MenuLayout,
    Phase, Scheduler, Timer, TimerKind, CAPTURE_DELAY, FOCUS_GRACE,
};
pub use download::{export_file_name, sanitize_name, Delivery};
pub use error::ExportError;
pub use scheduler::ManualScheduler;
pub use snapshot::{export_snapshot, SnapshotRegion, SnapshotScene};
pub use table::{encode_csv, export_table, TableSource};
pub use view::{DownloadMenu, ExportInputs};
