use crate::models::Book;

/// Rows currently shown in the "Books List" table plus the highlighted row.
/// The rows are whatever the last load or search returned.
#[derive(Default)]
pub(crate) struct BookTable {
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
}

impl BookTable {
    /// Replace the rows, keeping the selection on the same book id when it is
    /// still present.
    pub(crate) fn set_books(&mut self, books: Vec<Book>) {
        let focus_id = self.current_book().map(|book| book.id);
        self.books = books;
        if let Some(idx) =
            focus_id.and_then(|id| self.books.iter().position(|book| book.id == id))
        {
            self.selected = idx;
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    pub(crate) fn len(&self) -> usize {
        self.books.len()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let last = self.books.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.books.len() {
            self.selected = self.books.len().saturating_sub(1);
        }
    }
}
