// Example: engaged window tracking feeding the render-key recycler.
use recycler::{
    ConsecutiveNumbers, Dimensions, EngagedIndicesTracker, GridLayoutManager, LayoutManager,
    LayoutParams, LayoutUpdate, RenderStackManager, Velocity,
};

fn main() {
    let mut list = GridLayoutManager::new(LayoutParams::new(Dimensions::new(390.0, 844.0)));
    let updates: Vec<LayoutUpdate> = (0..10_000)
        .map(|i| LayoutUpdate::new(i, 390.0, 120.0))
        .collect();
    list.modify_layout(&updates, 10_000);

    let mut engaged = EngagedIndicesTracker::new();
    let mut stack = RenderStackManager::default();

    for step in 0..20u32 {
        let offset = step as f64 * 400.0;
        let velocity = Velocity::new(0.0, 1.5);
        if let Some(range) = engaged.update_scroll_offset(offset, Some(velocity), &list) {
            stack.sync(
                &|i| format!("item-{i}"),
                &|_| "cell".to_string(),
                range,
                10_000,
            );
            println!(
                "offset={offset} engaged={range:?} mounted_slots={}",
                stack.render_stack().len()
            );
        }
    }

    let visible: ConsecutiveNumbers = engaged.compute_visible_indices(&list);
    println!("visible at rest: {visible:?}");
}
