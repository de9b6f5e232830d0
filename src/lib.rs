pub mod checksum;
pub mod corrections;
pub mod favorites;
pub mod reorder;

pub use checksum::jamcrc;
pub use corrections::{load_title_corrections, LoadError, TitleCorrections};
pub use favorites::{Entry, FavoritesError, FavoritesFile};
pub use reorder::{reorder_file, Operation, ReorderError, ReorderOptions};
