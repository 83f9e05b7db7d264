//! Example: Order-k coverage around a station
//!
//! Scatters stations, picks the one nearest the middle of the map and prints
//! its order-1 through order-5 regions.

use order_voronoi::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn main() {
    println!("Order-k Station Coverage Example");
    println!("================================\n");

    // Deterministic station layout around Berlin
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let stations: Vec<Site<String>> = (0..200)
        .map(|i| {
            let lon = rng.gen_range(13.0..13.8);
            let lat = rng.gen_range(52.3..52.7);
            Site::new(Point::new(lon, lat), format!("ST-{i:03}"))
        })
        .collect();
    let positions: Vec<Point> = stations.iter().map(|s| s.position).collect();

    let config = EngineConfigBuilder::new()
        .enclosing(&positions, 0.1)
        .unwrap()
        .build()
        .unwrap();

    let mut index = SiteIndex::new(stations);
    let nearest = index.find_nearest(Point::new(13.4, 52.5)).unwrap();
    let center = index.site(nearest).unwrap().clone();

    println!("Configuration:");
    println!("  Stations: {}", index.len());
    println!("  Center: {} at ({:.4}, {:.4})", center.data, center.position.x, center.position.y);
    println!("  Frame: {:?}", config.frame.corners());
    println!();

    let engine = VoronoiEngine::new(config, center).expect("center lies inside the frame");

    println!("Computing orders...");
    let polygons = pollster::block_on(engine.execute(5, &mut index, |order, points| {
        println!("  order {order} closed with {} vertices", points.len());
    }))
    .expect("Failed to compute order polygons");
    println!();

    println!("Regions:");
    for polygon in &polygons {
        let labels: Vec<&str> = polygon
            .boundary_sites
            .iter()
            .map(|s| s.data.as_str())
            .collect();
        println!(
            "  Order {}: area={:.5} deg², vertices={}, new stations={}, bounded by [{}]",
            polygon.order,
            polygon.area(),
            polygon.vertex_count(),
            polygon.new_sites.len(),
            labels.join(", ")
        );
    }

    println!("\nComputation complete!");
}
