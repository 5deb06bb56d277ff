//! Market side of the pipeline: from raw quotes to a canonical snapshot.

pub mod favorite;
pub mod grouper;
pub mod selector;
pub mod snapshot;

pub use favorite::{FavoriteResolution, FavoriteResolver};
pub use grouper::{BookGrouper, GroupSelection, SourcedQuote};
pub use selector::QuoteSelector;
pub use snapshot::{snapshot_id, SnapshotBuilder};
