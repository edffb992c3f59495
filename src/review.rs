// The review loop: show the transaction under the cursor, read a one-letter
// command, run its handler, move the cursor. Remote failures inside a
// handler are reported and leave the session untouched; only an aborted
// prompt ends the loop early.

use chrono::NaiveDate;
use crossterm::style::Stylize;
use tracing::{debug, warn};

use crate::api::Remote;
use crate::autocomplete;
use crate::commands::Command;
use crate::error::ApiError;
use crate::format;
use crate::links::LinkMap;
use crate::models::{
    BulkUpdates, Category, SearchFilters, SortOrder, Tag, Transaction, TransactionUpdates,
};
use crate::session::Session;
use crate::ui::{Console, PromptError};

pub const MAX_NOTES_CHARS: usize = 1024;
/// How many earlier transactions feed searches and the category hint.
pub const HISTORY_LIMIT: usize = 50;
const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Reject notes longer than `MAX_NOTES_CHARS`.
pub fn validate_notes(notes: &str) -> Result<(), String> {
    let len = notes.chars().count();
    if len > MAX_NOTES_CHARS {
        Err(format!("Max length: {MAX_NOTES_CHARS} chars (curr {len})"))
    } else {
        Ok(())
    }
}

pub fn validate_date(input: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(input.trim(), DATE_INPUT_FORMAT)
        .map(|_| ())
        .map_err(|_| "Enter a date as YYYY-MM-DD".to_string())
}

/// Categories and tags, loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    tags: Vec<Tag>,
}

impl Catalog {
    pub fn new(mut categories: Vec<Category>, mut tags: Vec<Tag>) -> Self {
        categories.sort_by_key(|c| c.qualified_name().to_lowercase());
        tags.sort_by_key(|t| t.name.to_lowercase());
        Catalog { categories, tags }
    }

    pub fn load<R: Remote>(remote: &R) -> Result<Self, ApiError> {
        Ok(Catalog::new(remote.categories()?, remote.tags()?))
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }
}

/// How the cursor moves after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Stay,
    Advance,
    Retreat,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The user quit, or there was nothing left to show.
    Finished,
    /// A prompt was interrupted or input ran out.
    Aborted,
}

#[derive(Clone, Copy)]
enum BulkPatch<'p> {
    Category(&'p Category),
    Tags(&'p [Tag]),
}

pub struct Reviewer<'a, R: Remote, C: Console> {
    remote: &'a R,
    console: &'a mut C,
    catalog: Catalog,
    links: LinkMap,
}

impl<'a, R: Remote, C: Console> Reviewer<'a, R, C> {
    pub fn new(remote: &'a R, console: &'a mut C, catalog: Catalog, links: LinkMap) -> Self {
        Reviewer {
            remote,
            console,
            catalog,
            links,
        }
    }

    /// Run until the user quits or input is aborted. Terminal failures other
    /// than an abort are returned.
    pub fn run(&mut self, session: &mut Session) -> Result<ReviewOutcome, PromptError> {
        self.show_summary(session);
        match self.review_loop(session) {
            Ok(()) => Ok(ReviewOutcome::Finished),
            Err(PromptError::Aborted) => {
                debug!(cursor = session.cursor(), "Review aborted");
                Ok(ReviewOutcome::Aborted)
            }
            Err(e) => Err(e),
        }
    }

    fn review_loop(&mut self, session: &mut Session) -> Result<(), PromptError> {
        while !session.is_done() {
            self.show_current(session);
            let input = self.console.text("Command", "", None)?;
            self.dispatch(Command::parse(&input), session)?;
        }
        Ok(())
    }

    /// Run one command against the transaction under the cursor.
    pub fn dispatch(&mut self, command: Command, session: &mut Session) -> Result<(), PromptError> {
        let step = if session.is_done() {
            Step::Finish
        } else {
            self.handle(command, session)?
        };
        match step {
            Step::Stay => {}
            Step::Advance => session.advance(),
            Step::Retreat => session.retreat(),
            Step::Finish => session.finish(),
        }
        Ok(())
    }

    fn handle(&mut self, command: Command, session: &mut Session) -> Result<Step, PromptError> {
        let index = session.cursor();
        let Some(txn) = session.current().cloned() else {
            return Ok(Step::Finish);
        };
        match command {
            Command::Next => {
                self.console
                    .say("Marking as reviewed and going to next transaction...");
                let updates = TransactionUpdates {
                    reviewed: Some(true),
                    ..Default::default()
                };
                if self.save(session, index, updates) {
                    Ok(Step::Advance)
                } else {
                    Ok(Step::Stay)
                }
            }
            Command::Skip => {
                self.console.say("Skipping to next transaction...");
                Ok(Step::Advance)
            }
            Command::Previous => {
                self.console.say("Going to previous transaction...");
                Ok(Step::Retreat)
            }
            Command::Merchant => self.change_merchant(session, index, &txn),
            Command::Notes => self.change_notes(session, index, &txn),
            Command::Category => self.change_category(session, index, &txn),
            Command::BulkEdit => self.bulk_edit(session, &txn),
            Command::Tags => self.change_tags(session, index, &txn),
            Command::Date => self.change_date(session, index, &txn),
            Command::Reload => {
                self.reload(session, index);
                Ok(Step::Stay)
            }
            Command::Find => self.find(&txn),
            Command::Link => self.open_link(&txn),
            Command::Quit => {
                self.console.say("Exiting...");
                Ok(Step::Finish)
            }
            Command::Unknown(input) => {
                self.console.say(&format!("Unknown command \"{input}\""));
                self.show_help();
                Ok(Step::Stay)
            }
            Command::Help => {
                self.show_help();
                Ok(Step::Stay)
            }
        }
    }

    fn show_help(&mut self) {
        for line in Command::help_lines() {
            self.console.say(&line);
        }
    }

    pub fn show_summary(&mut self, session: &Session) {
        self.console
            .say("========== Transactions To Review - Count by Merchant ==========");
        for (merchant, count) in format::merchant_counts(session.transactions()) {
            self.console.say(&format!("  {count}\t{merchant}"));
        }
    }

    pub fn show_current(&mut self, session: &Session) {
        let Some(txn) = session.current() else {
            return;
        };
        let filters = SearchFilters::text(txn.merchant.name.clone());
        let history = self.call("Loading history...", |r| {
            r.search_transactions(&filters, SortOrder::Chronological, HISTORY_LIMIT)
        });
        let previous = match history {
            Ok(prior) => format::previous_categories_line(
                prior.iter().map(|t| format::category_plain(&t.category)),
            ),
            Err(e) => {
                warn!(error = %e, "Could not load previous categories");
                None
            }
        };
        let card = format::transaction_card(txn, session.cursor(), session.len(), previous.as_deref());
        for line in card {
            self.console.say(&line);
        }
    }

    /// Run a remote call with a spinner showing.
    fn call<T>(
        &mut self,
        message: &str,
        f: impl FnOnce(&R) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let busy = self.console.busy(message);
        let result = f(self.remote);
        drop(busy);
        result
    }

    fn report(&mut self, context: &str, err: &ApiError) {
        warn!(error = %err, "{context}");
        let message = format!("{context}. Error: {err}");
        self.console.say(&message.red().to_string());
    }

    /// Send `updates` and replace the slot with the server's copy. Returns
    /// whether the save went through.
    fn save(&mut self, session: &mut Session, index: usize, updates: TransactionUpdates) -> bool {
        let Some(original) = session.get(index).cloned() else {
            return false;
        };
        self.console
            .say(&format!("Saving transaction {}...", original.id));
        match self.call("Saving...", |r| r.update_transaction(&original, &updates)) {
            Ok(fresh) => {
                session.replace(index, fresh);
                true
            }
            Err(e) => {
                self.report("Error saving transaction - please try again", &e);
                false
            }
        }
    }

    fn change_merchant(
        &mut self,
        session: &mut Session,
        index: usize,
        txn: &Transaction,
    ) -> Result<Step, PromptError> {
        let query = self.console.text("Merchant", &txn.merchant.name, None)?;
        let query = query.trim().to_string();

        let mut labels = Vec::new();
        let mut values = Vec::new();
        if query.is_empty() {
            labels.push(txn.merchant.name.clone());
            values.push(txn.merchant.name.clone());
        } else {
            match self.call("Searching merchants...", |r| r.find_merchants(&query)) {
                Ok(found) => {
                    let ranked =
                        autocomplete::rank(&found, &query, |m| m.name.clone(), |m| m.name.as_str());
                    for m in ranked {
                        let count = m.transaction_count.to_string();
                        labels.push(format!("{} {}", m.name, count.grey()));
                        values.push(m.name.clone());
                    }
                }
                Err(e) => self.report("Unable to search merchants", &e),
            }
            labels.push(format!("{} {}", "Create New Merchant:".grey(), query));
            values.push(query.clone());
        }
        labels.push(format!("{} {}", "Original Merchant:".grey(), txn.plaid_name));
        values.push(txn.plaid_name.clone());

        let picked = self.console.select("Merchant", &labels, 0)?;
        let Some(name) = picked.and_then(|i| values.get(i)).cloned() else {
            return Ok(Step::Stay);
        };
        self.console
            .say(&format!("Updating merchant to \"{name}\""));
        let updates = TransactionUpdates {
            name: Some(name),
            ..Default::default()
        };
        self.save(session, index, updates);
        Ok(Step::Stay)
    }

    fn change_notes(
        &mut self,
        session: &mut Session,
        index: usize,
        txn: &Transaction,
    ) -> Result<Step, PromptError> {
        let notes = self
            .console
            .text("Notes", txn.notes(), Some(&validate_notes))?;
        self.console.say(&format!("Updating notes to {notes}"));
        let updates = TransactionUpdates {
            notes: Some(notes),
            ..Default::default()
        };
        self.save(session, index, updates);
        Ok(Step::Stay)
    }

    fn change_category(
        &mut self,
        session: &mut Session,
        index: usize,
        txn: &Transaction,
    ) -> Result<Step, PromptError> {
        let Some(category) = self.pick_category(Some(txn.category.id.as_str()))? else {
            return Ok(Step::Stay);
        };
        let updates = TransactionUpdates {
            category: Some(category.id.clone()),
            // Reimbursable spending stays out of reports.
            hide_from_reports: category.is_reimbursable().then_some(true),
            ..Default::default()
        };
        self.save(session, index, updates);
        Ok(Step::Stay)
    }

    fn change_tags(
        &mut self,
        session: &mut Session,
        index: usize,
        txn: &Transaction,
    ) -> Result<Step, PromptError> {
        let Some(tags) = self.pick_tags(&txn.tag_ids())? else {
            return Ok(Step::Stay);
        };
        self.console
            .say(&format!("Updating tags for transaction {}...", txn.id));
        let tag_ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
        match self.call("Saving...", |r| r.set_transaction_tags(txn, &tag_ids)) {
            Ok(fresh) => session.replace(index, fresh),
            Err(e) => self.report("Error saving transaction - please try again", &e),
        }
        Ok(Step::Stay)
    }

    fn change_date(
        &mut self,
        session: &mut Session,
        index: usize,
        txn: &Transaction,
    ) -> Result<Step, PromptError> {
        let initial = txn.date.format(DATE_INPUT_FORMAT).to_string();
        let input = self.console.text("Date", &initial, Some(&validate_date))?;
        let Ok(date) = NaiveDate::parse_from_str(input.trim(), DATE_INPUT_FORMAT) else {
            return Ok(Step::Stay);
        };
        let updates = TransactionUpdates {
            date: Some(date),
            ..Default::default()
        };
        self.save(session, index, updates);
        Ok(Step::Stay)
    }

    fn reload(&mut self, session: &mut Session, index: usize) {
        let Some(id) = session.get(index).map(|t| t.id.clone()) else {
            return;
        };
        match self.call("Reloading...", |r| r.get_transaction(&id)) {
            Ok(fresh) => session.replace(index, fresh),
            Err(e) => self.report("Unable to reload transaction", &e),
        }
    }

    fn find(&mut self, txn: &Transaction) -> Result<Step, PromptError> {
        let results = self.search(&txn.merchant.name)?;
        if results.is_empty() {
            self.console.say(&"No results found".red().to_string());
        }
        for found in &results {
            self.console.say(&format::search_result(found));
        }
        Ok(Step::Stay)
    }

    fn bulk_edit(&mut self, session: &mut Session, txn: &Transaction) -> Result<Step, PromptError> {
        let mut results = self.search(&txn.merchant.name)?;
        if results.is_empty() {
            self.console.say("No search results found.");
            return Ok(Step::Stay);
        }
        results.reverse();

        let labels: Vec<String> = results.iter().map(format::search_result).collect();
        let checked = vec![false; labels.len()];
        let chosen = self
            .console
            .multi_select("Transactions", &labels, &checked)?
            .unwrap_or_default();
        let ids: Vec<String> = chosen
            .into_iter()
            .filter_map(|i| results.get(i).map(|t| t.id.clone()))
            .collect();
        if ids.is_empty() {
            self.console.say("No transactions selected.");
            return Ok(Step::Stay);
        }

        if let Some(category) = self.pick_category(None)? {
            let updates = BulkUpdates {
                category_id: Some(category.id.clone()),
                ..Default::default()
            };
            self.bulk_apply(session, &ids, "categories", updates, BulkPatch::Category(&category));
        }
        if let Some(tags) = self.pick_tags(&[])? {
            if !tags.is_empty() {
                let updates = BulkUpdates {
                    tags: Some(tags.iter().map(|t| t.id.clone()).collect()),
                    ..Default::default()
                };
                self.bulk_apply(session, &ids, "tags", updates, BulkPatch::Tags(&tags));
            }
        }
        Ok(Step::Stay)
    }

    /// Send one bulk update, then bring affected session items up to date:
    /// re-fetch each one, falling back to patching the field locally.
    fn bulk_apply(
        &mut self,
        session: &mut Session,
        ids: &[String],
        what: &str,
        updates: BulkUpdates,
        patch: BulkPatch<'_>,
    ) {
        self.console.say(&format!(
            "Updating {what} for transactions {}...",
            ids.join(", ")
        ));
        match self.call("Saving...", |r| r.bulk_update_transactions(ids, &updates)) {
            Ok(outcome) => debug!(
                success = outcome.success,
                affected = outcome.affected_count,
                requested = ids.len(),
                "Bulk update complete"
            ),
            Err(e) => {
                self.report("Error saving transactions - please try again", &e);
                return;
            }
        }

        for id in ids {
            let Some(position) = session.position(id) else {
                continue;
            };
            match self.remote.get_transaction(id) {
                Ok(fresh) => session.replace(position, fresh),
                Err(e) => {
                    warn!(id = %id, error = %e, "Re-fetch after bulk update failed, patching locally");
                    let one = std::slice::from_ref(id);
                    match patch {
                        BulkPatch::Category(category) => session.patch_category(one, category),
                        BulkPatch::Tags(tags) => session.patch_tags(one, tags),
                    }
                }
            }
        }
    }

    fn open_link(&mut self, txn: &Transaction) -> Result<Step, PromptError> {
        if self.links.is_empty() {
            self.console.say(
                &"No links configured. Create `links.json` based on `links.json.sample`."
                    .red()
                    .to_string(),
            );
            return Ok(Step::Stay);
        }
        let labels: Vec<String> = self.links.labels().into_iter().map(String::from).collect();
        let picked = self.console.select("Link Type", &labels, 0)?;
        let Some(label) = picked.and_then(|i| labels.get(i)) else {
            return Ok(Step::Stay);
        };
        if let Some(url) = self.links.resolve(label, txn) {
            self.console.say(&format!("Opening {url}"));
            if let Err(e) = self.console.open_link(&url) {
                warn!(error = %e, url = %url, "Failed to open link");
                self.console
                    .say(&format!("Unable to open link. Error: {e}").red().to_string());
            }
        }
        Ok(Step::Stay)
    }

    /// Prompt for a search term (pre-filled) and list matching transactions.
    fn search(&mut self, initial: &str) -> Result<Vec<Transaction>, PromptError> {
        let term = self.console.text("Search transactions", initial, None)?;
        let filters = SearchFilters::text(term);
        match self.call("Searching...", |r| {
            r.search_transactions(&filters, SortOrder::Chronological, HISTORY_LIMIT)
        }) {
            Ok(mut results) => {
                results.reverse();
                Ok(results)
            }
            Err(e) => {
                self.report("Unable to search transactions", &e);
                Ok(Vec::new())
            }
        }
    }

    /// Filter-then-pick category prompt. `None` when nothing matches or the
    /// user backs out.
    fn pick_category(&mut self, current: Option<&str>) -> Result<Option<Category>, PromptError> {
        let query = self.console.text("Category", "", None)?;
        let matches = autocomplete::rank(
            &self.catalog.categories,
            &query,
            |c| c.qualified_name(),
            |c| c.name.as_str(),
        );
        if matches.is_empty() {
            self.console.say("No matching categories.");
            return Ok(None);
        }
        let labels: Vec<String> = matches
            .iter()
            .map(|c| format!("{}  {}", c.icon, c.qualified_name()))
            .collect();
        let default = current
            .and_then(|id| matches.iter().position(|c| c.id == id))
            .unwrap_or(0);
        let choice = self.console.select("Category", &labels, default)?;
        Ok(choice.and_then(|i| matches.get(i)).map(|c| (*c).clone()))
    }

    /// Filter-then-pick tags prompt, pre-checking `current`. Tags hidden by
    /// the filter keep their current state.
    fn pick_tags(&mut self, current: &[String]) -> Result<Option<Vec<Tag>>, PromptError> {
        let query = self.console.text("Tags", "", None)?;
        let matches = autocomplete::rank(
            &self.catalog.tags,
            &query,
            |t| t.name.clone(),
            |t| t.name.as_str(),
        );
        if matches.is_empty() {
            self.console.say("No matching tags.");
            return Ok(None);
        }
        let labels: Vec<String> = matches.iter().map(|t| t.name.clone()).collect();
        let checked: Vec<bool> = matches.iter().map(|t| current.contains(&t.id)).collect();
        let Some(chosen) = self.console.multi_select("Tags", &labels, &checked)? else {
            return Ok(None);
        };

        let mut selected: Vec<Tag> = current
            .iter()
            .filter(|id| !matches.iter().any(|t| &t.id == *id))
            .filter_map(|id| self.catalog.tag(id).cloned())
            .collect();
        selected.extend(chosen.into_iter().filter_map(|i| matches.get(i).map(|t| (*t).clone())));
        Ok(Some(selected))
    }
}
