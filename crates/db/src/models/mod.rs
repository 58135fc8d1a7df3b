pub mod api_key;
pub mod booth_job;
pub mod category;
pub mod event;
pub mod feature_flag;
pub mod invoice;
pub mod mosaic;
pub mod package;
pub mod photo;
pub mod session;
pub mod user;
pub mod workflow;
