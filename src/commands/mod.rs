pub mod create;
pub mod preview;
pub mod resolve;
pub mod status;
pub mod track;

pub use create::*;
pub use preview::*;
pub use resolve::*;
pub use status::*;
pub use track::*;
