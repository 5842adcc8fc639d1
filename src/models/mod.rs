pub mod feature;
pub mod flags;
pub mod range_table;
pub mod reading;
pub mod stage;
pub mod suitability;

pub use feature::*;
pub use flags::*;
pub use range_table::*;
pub use reading::*;
pub use stage::*;
pub use suitability::*;
