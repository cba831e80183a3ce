mod fastembed_provider;
pub mod mock;
mod provider;

pub use fastembed_provider::{FastEmbedProvider, ModelLoader, TextEmbedder};
pub use mock::MockEmbedder;
pub use provider::EmbeddingProvider;

/// Scale a vector to unit length in place. Zero vectors are left untouched.
///
/// Both the query path and the vector indexer go through this, which keeps
/// inner-product scores meaningful.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
