use gridpad_core::Point;

/// In-progress edit of one cell's raw value. `cursor` counts chars, not bytes.
#[derive(Debug, Clone)]
pub(super) struct EditState {
    point: Point,
    buffer: String,
    cursor: usize,
}

impl EditState {
    /// Start editing with the cursor after the existing value.
    pub(super) fn new(point: Point, value: String) -> Self {
        let cursor = value.chars().count();
        Self { point, buffer: value, cursor }
    }

    pub(super) fn point(&self) -> Point {
        self.point
    }

    pub(super) fn buffer(&self) -> &str {
        &self.buffer
    }

    pub(super) fn before_cursor(&self) -> &str {
        &self.buffer[..self.byte_index()]
    }

    fn byte_index(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    pub(super) fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    pub(super) fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.buffer.remove(at);
    }

    pub(super) fn delete(&mut self) {
        let at = self.byte_index();
        if at < self.buffer.len() {
            self.buffer.remove(at);
        }
    }

    pub(super) fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(super) fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub(super) fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub(super) fn move_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }
}
