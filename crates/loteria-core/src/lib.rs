//! Core types for Loteria: game profiles, model reply normalisation, export tables.

pub mod profile;
pub mod result;
pub mod table;

pub use profile::GameProfile;
pub use result::{GameEntry, GameResult, NormalizeError, normalize, strip_code_fences};
pub use table::{ColumnSpec, ExportRow, ExportTable};
