// Example: three-column masonry feed with height-balancing placement.
use recycler::{Dimensions, LayoutManager, LayoutParams, LayoutUpdate, MasonryLayoutManager};

fn main() {
    let params = LayoutParams::new(Dimensions::new(390.0, 844.0))
        .with_max_columns(3)
        .with_optimize_item_arrangement(true);
    let mut masonry = MasonryLayoutManager::new(params);

    let updates: Vec<LayoutUpdate> = (0..300)
        .map(|i| LayoutUpdate::new(i, 130.0, 100.0 + ((i * 37) % 140) as f64))
        .collect();
    masonry.modify_layout(&updates, 300);

    println!("content_size={:?}", masonry.get_layout_size());
    for i in 0..6 {
        let layout = masonry.get_layout(i);
        println!("item {i}: x={} y={} h={}", layout.x, layout.y, layout.height);
    }
    println!("visible at 2000..2844: {:?}", masonry.get_visible_layouts(2000.0, 2844.0));
}
