mod in_memory;
mod port;

#[cfg(feature = "qdrant")]
mod qdrant;

pub use in_memory::InMemoryVectorStore;
pub use port::VectorStore;

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
