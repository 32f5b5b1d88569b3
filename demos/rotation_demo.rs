//! Walks a fixed 2D point cloud through the alignment pipeline, step by step:
//! find its oriented bounding box, move the cloud onto the origin, and finally
//! rotate the box flat. Each stage logs the geometry a plotting frontend would
//! draw.
//!
//! Run with `cargo run --example rotation_demo`.

use finalign::{Obb2, Pca2};
use glam::{Mat2, Vec2};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // A hand-picked cloud trending up and to the right, standing in for a
    // profile curve sampled from wind-tunnel data.
    let cloud = vec![
        Vec2::new(3.7, 1.7),
        Vec2::new(4.1, 3.8),
        Vec2::new(4.7, 2.9),
        Vec2::new(5.2, 2.8),
        Vec2::new(6.0, 4.0),
        Vec2::new(6.3, 3.6),
        Vec2::new(9.7, 6.3),
        Vec2::new(10.0, 4.9),
        Vec2::new(11.0, 3.6),
        Vec2::new(12.5, 6.4),
    ];
    info!(points = cloud.len(), "starting with the raw point cloud");

    // Stage 1: find the cloud's center. This path deliberately uses the center
    // of the oriented bounding box, not the coordinate mean.
    let pca = Pca2::from_points(&cloud).expect("demo cloud is non-empty");
    let mut aligned = cloud.clone();
    pca.apply_transform(&mut aligned);
    let obb = Obb2::from_aligned_points(&aligned).expect("demo cloud is non-empty");

    let mut center = [obb.center];
    pca.revert_transform(&mut center);
    let center = center[0];
    info!(center = ?center.to_array(), "bounding-box center in the original frame");

    // Stage 2: move the cloud so that center sits on the origin.
    let at_origin: Vec<Vec2> = cloud.iter().map(|p| *p - center).collect();
    info!("cloud translated to the origin");

    // Stage 3: redo the analysis at the origin and recover the bounding-box
    // corners in the cloud's own frame. The corners come back as a closed
    // 5-point loop ready for plotting.
    let pca = Pca2::from_points(&at_origin).expect("demo cloud is non-empty");
    let mut aligned = at_origin.clone();
    pca.apply_transform(&mut aligned);
    let obb = Obb2::from_aligned_points(&aligned).expect("demo cloud is non-empty");

    let mut corners = obb.corners();
    pca.revert_transform(&mut corners);
    for (i, corner) in corners.iter().enumerate() {
        info!(corner = i, at = ?corner.to_array(), "bounding-box corner");
    }

    // Stage 4: rotate everything so the box's long edge lies flat. The edge
    // angle comes straight from the first two corners.
    let edge = corners[1] - corners[0];
    let theta = f32::atan2(edge.y, edge.x);
    info!(theta, "rotating the long edge onto the horizontal axis");

    let rotation = Mat2::from_angle(-theta);
    let flat_corners: Vec<Vec2> = corners.iter().map(|c| rotation * *c).collect();
    let flat_cloud: Vec<Vec2> = at_origin.iter().map(|p| rotation * *p).collect();

    for (i, corner) in flat_corners.iter().enumerate() {
        info!(corner = i, at = ?corner.to_array(), "flattened corner");
    }
    info!(points = flat_cloud.len(), "done; box edges are now axis-parallel");
}
