// Example: a full scroll session driven through the controller.
use std::sync::Arc;

use recycler::{
    Dimensions, GridLayoutManager, LayoutParams, LayoutUpdate, ViewabilityConfig,
};
use recycler_adapter::{Controller, DataSource};

struct Feed {
    count: usize,
}

impl DataSource for Feed {
    fn item_count(&self) -> usize {
        self.count
    }

    fn stable_id(&self, index: usize) -> String {
        format!("post-{index}")
    }

    fn item_type(&self, index: usize) -> String {
        if index % 10 == 0 { "ad" } else { "post" }.to_string()
    }
}

fn main() {
    let layout = GridLayoutManager::new(LayoutParams::new(Dimensions::new(390.0, 844.0)));
    let mut controller = Controller::new(Feed { count: 500 }, Box::new(layout), 0);
    controller.refresh(0);

    let config = ViewabilityConfig {
        item_visible_percent_threshold: Some(50.0),
        ..ViewabilityConfig::default()
    };
    controller
        .add_viewability_config(config, Arc::new(|change| {
            println!("viewable now: {:?}", change.viewable);
        }))
        .expect("single threshold");

    let updates: Vec<LayoutUpdate> = (0..500)
        .map(|i| LayoutUpdate::new(i, 390.0, 150.0))
        .collect();
    controller.apply_measurements(&updates, 16);

    let mut now = 16;
    for step in 1..=30u32 {
        now += 16;
        let update = controller.on_scroll(step as f64 * 300.0, now);
        if update.engaged_changed {
            println!(
                "engaged={:?} slots={}",
                controller.engaged_indices(),
                controller.render_stack().len()
            );
        }
        if update.reached_window_end {
            println!("reached end, load more");
            break;
        }
        controller.tick(now + 250);
    }
}
