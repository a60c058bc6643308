pub mod chapter;
pub mod series;

pub use chapter::ChapterDescriptor;
pub use series::{Series, SiteScan};
