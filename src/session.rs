use crate::models::{Category, Tag, Transaction};

/// The fixed list of transactions under review plus a cursor into it.
///
/// The cursor lives in `[0, len]`; `len` means the review pass is over.
/// Items are never inserted or removed, only replaced in place.
#[derive(Debug, Clone, Default)]
pub struct Session {
    transactions: Vec<Transaction>,
    cursor: usize,
}

impl Session {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Session {
            transactions,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.transactions.len()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    /// The transaction at the cursor, `None` once finished.
    pub fn current(&self) -> Option<&Transaction> {
        self.transactions.get(self.cursor)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.transactions.iter().position(|t| t.id == id)
    }

    /// Overwrite one slot with the server's copy. Out-of-range is ignored.
    pub fn replace(&mut self, index: usize, transaction: Transaction) {
        if let Some(slot) = self.transactions.get_mut(index) {
            *slot = transaction;
        }
    }

    /// Move forward one item; stays put on the last item.
    pub fn advance(&mut self) {
        if self.cursor + 1 < self.transactions.len() {
            self.cursor += 1;
        }
    }

    /// Move back one item; stays put on the first item.
    pub fn retreat(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn finish(&mut self) {
        self.cursor = self.transactions.len();
    }

    /// Set the category on every listed transaction without a round trip.
    pub fn patch_category(&mut self, ids: &[String], category: &Category) {
        for txn in self.transactions.iter_mut().filter(|t| ids.contains(&t.id)) {
            txn.category = category.clone();
        }
    }

    /// Set the tags on every listed transaction without a round trip.
    pub fn patch_tags(&mut self, ids: &[String], tags: &[Tag]) {
        for txn in self.transactions.iter_mut().filter(|t| ids.contains(&t.id)) {
            txn.tags = tags.to_vec();
        }
    }
}
