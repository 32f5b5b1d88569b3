//! Point cloud processing utilities.

mod center;
mod pca2;
mod pca3;

pub use center::{
    bounding_box_center2, bounding_box_center3, centroid_mean2, centroid_mean3,
};
pub use pca2::{Pca2, Pca2Error};
pub use pca3::{Pca3, Pca3Error};
