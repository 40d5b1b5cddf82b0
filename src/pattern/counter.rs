use std::cell::Cell;

/// Monotonic group-id source shared by every nested parser of one parse.
#[derive(Debug, Default)]
pub struct GroupCounter {
    last: Cell<u32>,
}

impl GroupCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, starting at 1.
    pub fn next_id(&self) -> u32 {
        let id = self.last.get() + 1;
        self.last.set(id);
        id
    }

    pub fn next_group_id(&self) -> String {
        format!("g{}", self.next_id())
    }

    pub fn count(&self) -> u32 {
        self.last.get()
    }
}
