pub mod blob_store;
pub mod codec;
pub mod local_codec;

pub use blob_store::{BlobStore, FsBlobStore, InMemoryBlobStore};
pub use codec::ImageCodec;
pub use local_codec::{ImagingOptions, LocalCodec};
