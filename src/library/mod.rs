pub mod import_export;
pub mod matcher;
pub mod model;
pub mod seed;
pub mod store;
