pub mod domain;
pub mod errors;
pub mod ids;
pub mod invoice;
pub mod utils;

pub use domain::*;
pub use errors::*;
pub use ids::*;
pub use invoice::*;
