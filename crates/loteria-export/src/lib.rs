//! Export layer: encodes an [`loteria_core::ExportTable`] as xlsx and saves it.

mod error;
pub use error::ExportError;

pub mod save;
pub mod xlsx;

pub use save::{DEFAULT_FILE_NAME, save};
pub use xlsx::encode;
