pub mod config;
pub mod destination;
pub mod filter;
pub mod ledger;
pub mod lock;
pub mod manifest;
pub mod pipeline;
pub mod testing;
pub mod transfer;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, KeyValue,
};
pub use destination::{resolve, resolve_destination};
pub use filter::{is_control_file, ControlFilter};
pub use ledger::{AcquisitionStatus, Ledger, LedgerError};
pub use lock::{DirectoryLock, LockError};
pub use manifest::{
    DescriptorManifest, Manifest, ManifestError, ManifestProvider, StaticManifest,
};
pub use pipeline::{AcquisitionPipeline, Outcome, PipelineError};
pub use transfer::{
    CompletionMarker, FsTransferer, RemovalPolicy, TransferError, TransferJob, TransferReport,
    Transferer,
};
