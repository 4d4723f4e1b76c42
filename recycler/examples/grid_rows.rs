// Example: two-column grid with measured heights and a windowed query.
use recycler::{Dimensions, GridLayoutManager, LayoutManager, LayoutParams, LayoutUpdate};

fn main() {
    let params = LayoutParams::new(Dimensions::new(400.0, 800.0)).with_max_columns(2);
    let mut grid = GridLayoutManager::new(params);

    let updates: Vec<LayoutUpdate> = (0..1000)
        .map(|i| LayoutUpdate::new(i, 200.0, 80.0 + (i % 5) as f64 * 20.0))
        .collect();
    grid.modify_layout(&updates, 1000);

    println!("content_size={:?}", grid.get_layout_size());
    println!("visible at 10_000..10_800: {:?}", grid.get_visible_layouts(10_000.0, 10_800.0));
    println!("item 500: {:?}", grid.get_layout(500));
}
