mod catalog;
mod extended;
mod reference;

pub use catalog::Catalog;
pub use extended::ExtendedMetadata;
pub use reference::{TrackReference, TrackReferenceBuilder, TrackReferenceBuilderError, UNKNOWN_AUTHOR};
