/// Running average of the most recent `capacity` samples.
///
/// Samples are written into a fixed ring; once the ring is full, new samples
/// overwrite the oldest slot and the average is corrected incrementally
/// instead of being recomputed from scratch.
///
/// The layout managers use this to estimate the main-axis size of items that
/// have never been measured, so early measurements shape the initial
/// placement of items further down the list.
#[derive(Clone, Debug)]
pub struct AverageWindow {
    current_average: f64,
    current_count: usize,
    input_values: Vec<Option<f64>>,
    next_index: usize,
}

impl AverageWindow {
    /// Creates an empty window. `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            current_average: 0.0,
            current_count: 0,
            input_values: vec![None; capacity.max(1)],
            next_index: 0,
        }
    }

    /// Creates a window seeded with one starting sample.
    pub fn with_start_value(capacity: usize, start_value: f64) -> Self {
        let mut window = Self::new(capacity);
        window.input_values[0] = Some(start_value);
        window.current_average = start_value;
        window.current_count = 1;
        window.next_index = 1 % window.input_values.len();
        window
    }

    /// The current average, or 0 if no samples have been added.
    pub fn current_value(&self) -> f64 {
        self.current_average
    }

    pub fn sample_count(&self) -> usize {
        self.current_count
    }

    /// Adds a sample, overwriting the oldest slot once the ring is full.
    pub fn add_value(&mut self, value: f64) {
        let target = self.next_index;
        self.next_index = (self.next_index + 1) % self.input_values.len();

        let old_value = self.input_values[target];
        let new_count = match old_value {
            Some(_) => self.current_count,
            None => self.current_count + 1,
        };

        self.input_values[target] = Some(value);
        self.current_average = self.current_average * (self.current_count as f64 / new_count as f64)
            + (value - old_value.unwrap_or(0.0)) / new_count as f64;
        self.current_count = new_count;
    }
}
