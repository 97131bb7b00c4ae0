pub mod matrix;
pub mod io;

pub use matrix::SymmetricDistanceMatrix;
pub use io::{read_distance_matrix, read_grouping, grouping_for};
