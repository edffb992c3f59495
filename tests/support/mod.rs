#![allow(dead_code)]

pub mod server;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;

use monarch_review::api::Remote;
use monarch_review::error::ApiError;
use monarch_review::models::{
    BulkUpdateOutcome, BulkUpdates, Category, CategoryGroup, Merchant, SearchFilters, SortOrder,
    Tag, Transaction, TransactionUpdates,
};
use monarch_review::ui::{Console, PromptError, Validator};
use reqwest::StatusCode;
use serde_json::json;

pub fn txn(id: &str, merchant: &str) -> Transaction {
    serde_json::from_value(json!({
        "id": id,
        "amount": -12.34,
        "date": "2024-01-02",
        "originalDate": "2024-01-01",
        "needsReview": true,
        "plaidName": format!("{} POS 0042", merchant.to_uppercase()),
        "merchant": { "id": format!("m-{merchant}"), "name": merchant, "transactionCount": 3 },
        "category": { "id": "0", "name": "Uncategorized", "icon": "?" },
        "account": { "id": "a1", "displayName": "Checking" },
        "tags": []
    }))
    .unwrap()
}

pub fn category(id: &str, group: &str, name: &str) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        icon: "*".into(),
        group: CategoryGroup {
            id: format!("g-{group}"),
            name: group.into(),
            kind: "expense".into(),
        },
        ..Default::default()
    }
}

pub fn tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.into(),
        name: name.into(),
        color: "#fff".into(),
        order: 0,
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::Transport {
        status: StatusCode::NOT_FOUND,
        body: format!("no transaction {id}"),
    }
}

/// In-memory stand-in for the Monarch API. Mutations are applied to `store`
/// the way the server would and recorded for assertions.
pub struct FakeRemote {
    pub store: RefCell<Vec<Transaction>>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub merchants: Vec<Merchant>,
    pub fail_updates: Cell<bool>,
    pub fail_fetch: Cell<bool>,
    pub fail_bulk: Cell<bool>,
    pub updates: RefCell<Vec<(String, TransactionUpdates)>>,
    pub tag_sets: RefCell<Vec<(String, Vec<String>)>>,
    pub bulk_calls: RefCell<Vec<(Vec<String>, BulkUpdates)>>,
    pub searches: RefCell<Vec<(SearchFilters, SortOrder, usize)>>,
}

impl FakeRemote {
    pub fn new(store: Vec<Transaction>) -> Self {
        FakeRemote {
            store: RefCell::new(store),
            categories: vec![
                category("0", "General", "Uncategorized"),
                category("9", "Food", "Food"),
                category("7", "Food", "Groceries"),
                category("5", "Work", "Reimbursable Travel"),
            ],
            tags: vec![tag("t1", "Trip"), tag("t2", "Work"), tag("t3", "Gift")],
            merchants: Vec::new(),
            fail_updates: Cell::new(false),
            fail_fetch: Cell::new(false),
            fail_bulk: Cell::new(false),
            updates: RefCell::new(Vec::new()),
            tag_sets: RefCell::new(Vec::new()),
            bulk_calls: RefCell::new(Vec::new()),
            searches: RefCell::new(Vec::new()),
        }
    }

    pub fn stored(&self, id: &str) -> Transaction {
        self.store
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .unwrap()
    }

    fn modify<F: FnOnce(&mut Transaction)>(&self, id: &str, f: F) -> Result<Transaction, ApiError> {
        let mut store = self.store.borrow_mut();
        let txn = store.iter_mut().find(|t| t.id == id).ok_or_else(|| not_found(id))?;
        f(txn);
        Ok(txn.clone())
    }
}

impl Remote for FakeRemote {
    fn search_transactions(
        &self,
        filters: &SearchFilters,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.searches
            .borrow_mut()
            .push((filters.clone(), order, limit));
        let needle = filters.search.to_lowercase();
        Ok(self
            .store
            .borrow()
            .iter()
            .filter(|t| t.merchant.name.to_lowercase().contains(&needle))
            .filter(|t| filters.needs_review != Some(true) || t.needs_review)
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_transaction(&self, id: &str) -> Result<Transaction, ApiError> {
        if self.fail_fetch.get() {
            return Err(not_found(id));
        }
        self.store
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn update_transaction(
        &self,
        transaction: &Transaction,
        updates: &TransactionUpdates,
    ) -> Result<Transaction, ApiError> {
        self.updates
            .borrow_mut()
            .push((transaction.id.clone(), updates.clone()));
        if self.fail_updates.get() {
            return Err(ApiError::Transport {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            });
        }
        let new_category = updates
            .category
            .as_ref()
            .and_then(|id| self.categories.iter().find(|c| &c.id == id).cloned());
        self.modify(&transaction.id, |t| {
            if updates.reviewed == Some(true) {
                t.needs_review = false;
            }
            if let Some(category) = new_category {
                t.category = category;
            }
            if let Some(hide) = updates.hide_from_reports {
                t.hide_from_reports = hide;
            }
            if let Some(notes) = &updates.notes {
                t.notes = Some(notes.clone());
            }
            if let Some(name) = &updates.name {
                t.merchant.name = name.clone();
            }
            if let Some(date) = updates.date {
                t.date = date;
            }
        })
    }

    fn set_transaction_tags(
        &self,
        transaction: &Transaction,
        tag_ids: &[String],
    ) -> Result<Transaction, ApiError> {
        self.tag_sets
            .borrow_mut()
            .push((transaction.id.clone(), tag_ids.to_vec()));
        let tags: Vec<Tag> = self
            .tags
            .iter()
            .filter(|t| tag_ids.contains(&t.id))
            .cloned()
            .collect();
        self.modify(&transaction.id, |t| t.tags = tags)?;
        self.get_transaction(&transaction.id)
    }

    fn bulk_update_transactions(
        &self,
        transaction_ids: &[String],
        updates: &BulkUpdates,
    ) -> Result<BulkUpdateOutcome, ApiError> {
        self.bulk_calls
            .borrow_mut()
            .push((transaction_ids.to_vec(), updates.clone()));
        if self.fail_bulk.get() {
            return Err(ApiError::GraphQl("Bulk update was rejected".into()));
        }
        let category = updates
            .category_id
            .as_ref()
            .and_then(|id| self.categories.iter().find(|c| &c.id == id).cloned());
        let tags: Option<Vec<Tag>> = updates.tags.as_ref().map(|ids| {
            self.tags
                .iter()
                .filter(|t| ids.contains(&t.id))
                .cloned()
                .collect()
        });
        let mut affected = 0;
        for txn in self
            .store
            .borrow_mut()
            .iter_mut()
            .filter(|t| transaction_ids.contains(&t.id))
        {
            if let Some(category) = &category {
                txn.category = category.clone();
            }
            if let Some(tags) = &tags {
                txn.tags = tags.clone();
            }
            affected += 1;
        }
        Ok(BulkUpdateOutcome {
            success: true,
            affected_count: affected,
        })
    }

    fn find_merchants(&self, query: &str) -> Result<Vec<Merchant>, ApiError> {
        let needle = query.to_lowercase();
        Ok(self
            .merchants
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.categories.clone())
    }

    fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        Ok(self.tags.clone())
    }
}

/// One scripted answer to the next prompt.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Pick(usize),
    Picks(Vec<usize>),
    /// Esc on a selection list.
    Back,
    /// Ctrl-C.
    Abort,
}

pub fn text(s: &str) -> Reply {
    Reply::Text(s.to_string())
}

/// Console that answers prompts from a script and records what was shown.
/// Running out of script behaves like end of input.
#[derive(Default)]
pub struct ScriptedConsole {
    replies: VecDeque<Reply>,
    pub output: Vec<String>,
    pub prompts: Vec<String>,
    pub menus: Vec<Vec<String>>,
    pub checked: Vec<Vec<bool>>,
    pub defaults: Vec<usize>,
    pub initials: Vec<String>,
    pub opened: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(replies: Vec<Reply>) -> Self {
        ScriptedConsole {
            replies: replies.into(),
            ..Default::default()
        }
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn text(
        &mut self,
        prompt: &str,
        initial: &str,
        validate: Option<Validator<'_>>,
    ) -> Result<String, PromptError> {
        self.prompts.push(prompt.to_string());
        self.initials.push(initial.to_string());
        loop {
            match self.replies.pop_front() {
                Some(Reply::Text(value)) => {
                    if let Some(check) = validate {
                        if let Err(message) = check(&value) {
                            self.output.push(message);
                            continue;
                        }
                    }
                    return Ok(value);
                }
                Some(Reply::Abort) | None => return Err(PromptError::Aborted),
                Some(other) => panic!("prompt {prompt:?} expected text, script had {other:?}"),
            }
        }
    }

    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, PromptError> {
        self.prompts.push(prompt.to_string());
        self.menus.push(items.to_vec());
        self.defaults.push(default);
        match self.replies.pop_front() {
            Some(Reply::Pick(i)) => Ok(Some(i)),
            Some(Reply::Back) => Ok(None),
            Some(Reply::Abort) | None => Err(PromptError::Aborted),
            Some(other) => panic!("prompt {prompt:?} expected a pick, script had {other:?}"),
        }
    }

    fn multi_select(
        &mut self,
        prompt: &str,
        items: &[String],
        checked: &[bool],
    ) -> Result<Option<Vec<usize>>, PromptError> {
        self.prompts.push(prompt.to_string());
        self.menus.push(items.to_vec());
        self.checked.push(checked.to_vec());
        match self.replies.pop_front() {
            Some(Reply::Picks(picks)) => Ok(Some(picks)),
            Some(Reply::Back) => Ok(None),
            Some(Reply::Abort) | None => Err(PromptError::Aborted),
            Some(other) => panic!("prompt {prompt:?} expected picks, script had {other:?}"),
        }
    }

    fn open_link(&mut self, url: &str) -> io::Result<()> {
        self.opened.push(url.to_string());
        Ok(())
    }
}
