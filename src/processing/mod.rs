pub mod diagnostics;
pub mod router;
