//! Observable UI state that is not part of the session.
//!
//! The session owns protocol state; this module holds purely presentational
//! state layered on top of it, such as the lobby cursor.

/// Cursor over a list that can shrink or grow under it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
}

impl Selection {
    /// Cursor position. Always less than the list length when the list is
    /// non-empty.
    pub fn index(self) -> usize {
        self.index
    }

    /// Keep the cursor inside a list of `len` entries.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    /// Move up one entry, stopping at the top.
    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Move down one entry, stopping at the bottom.
    pub fn next(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Entry under the cursor.
    pub fn get<T>(self, items: &[T]) -> Option<&T> {
        items.get(self.index)
    }
}
