pub mod contest;
pub mod decision;
pub mod model;
pub mod quote;
pub mod snapshot;

pub use contest::*;
pub use decision::*;
pub use model::*;
pub use quote::*;
pub use snapshot::*;
