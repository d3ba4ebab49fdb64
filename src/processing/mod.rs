//! Reference corpus processing: chunking, embeddings and retrieval

pub mod document;
pub mod embeddings;
pub mod index;
