//! Extract, transform, load stages
//!
//! Export and import are both pipelines: export extracts resources from a
//! cluster and loads envelopes into a directory tree; import extracts
//! documents from the tree and loads them into a cluster.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::Transformer;
