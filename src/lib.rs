pub mod batch;
pub mod config;
pub mod errors;
pub mod imageops_ai;
pub mod member;
pub mod mocks;
pub mod model;
pub mod silhouette;
pub mod traits;

pub use batch::{
    ensure_root, BatchSummary, FailedMember, MemberOutcome, SilhouetteBatchProcessor,
};
pub use config::Config;
pub use errors::{Result, SilhouetteError};
pub use member::{MemberDirectory, SILHOUETTE_FILE_NAME};
pub use model::U2NetRemover;
pub use silhouette::{render_silhouette, write_silhouette};
pub use traits::BackgroundRemover;
