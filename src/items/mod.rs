//! Item categories and kind names used when describing equipment and pack
//! contents to the portal.

pub mod names;
pub mod types;

pub use names::{category_name, kind_name, NO_DESCRIPTION, UNKNOWN};
pub use types::ItemCategory;
