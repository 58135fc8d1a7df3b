//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod api_key_repo;
pub mod booth_job_repo;
pub mod category_repo;
pub mod event_repo;
pub mod feature_flag_repo;
pub mod invoice_repo;
pub mod mosaic_repo;
pub mod package_repo;
pub mod photo_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod workflow_repo;

pub use api_key_repo::ApiKeyRepo;
pub use booth_job_repo::BoothJobRepo;
pub use category_repo::CategoryRepo;
pub use event_repo::EventRepo;
pub use feature_flag_repo::FeatureFlagRepo;
pub use invoice_repo::InvoiceRepo;
pub use mosaic_repo::MosaicRepo;
pub use package_repo::PackageRepo;
pub use photo_repo::PhotoRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use workflow_repo::WorkflowRepo;
