//! SQLite storage implementation for the installed-app mirror.

mod model;
mod repository;

pub use model::{InstalledAppChangesetDB, InstalledAppDB};
pub use repository::InstalledAppRepository;
