// Collaborator implementations and data loading
pub mod catalogue;
pub mod embedding;
pub mod evaluation;
pub mod gazetteer;

pub use catalogue::{Catalogue, CatalogueError};
pub use embedding::{cosine_similarity, CosineSimilarity};
pub use evaluation::{
    average_precision, mean_average_precision, ndcg_at_k, precision_at_k, ranked_ids, recall_at_k, reciprocal_rank,
};
pub use gazetteer::{CityGazetteer, GazetteerError};
