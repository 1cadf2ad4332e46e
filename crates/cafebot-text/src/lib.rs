//! cafebot-text
//!
//! Sparse lexical retrieval: a TF-IDF model over unigrams and bigrams, fitted
//! once over the whole store and searched by cosine similarity. Tokenization
//! goes through a tantivy text analyzer, see `tantivy_utils`.

pub mod lexical;
pub mod tantivy_utils;

pub use lexical::LexicalIndex;
