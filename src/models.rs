// Data shapes exchanged with the Monarch GraphQL API. Field names mirror
// the server's camelCase selection sets; everything the review loop does not
// strictly need is defaulted so partial selections still deserialize.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub pending: bool,
    pub date: NaiveDate,
    #[serde(default)]
    pub original_date: Option<NaiveDate>,
    #[serde(default)]
    pub hide_from_reports: bool,
    #[serde(default)]
    pub needs_review: bool,
    #[serde(default)]
    pub review_status: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plaid_name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account: Account,
    #[serde(default, deserialize_with = "null_as_default")]
    pub merchant: Merchant,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

impl Transaction {
    pub fn notes(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }

    pub fn tag_ids(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.id.clone()).collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub id: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    // The search selection spells this `transactionsCount`.
    #[serde(alias = "transactionsCount")]
    pub transaction_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub order: i64,
    pub is_disabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub group: CategoryGroup,
}

impl Category {
    /// `Group: Name`, or just the name when the group is unknown.
    pub fn qualified_name(&self) -> String {
        if self.group.name.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.group.name, self.name)
        }
    }

    pub fn is_reimbursable(&self) -> bool {
        self.name.starts_with("Reimbursable")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i64,
}

/// Server-side ordering of search results.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[serde(rename = "date")]
    Chronological,
    #[default]
    #[serde(rename = "inverse_date")]
    ReverseChronological,
}

/// Filters for the transaction search. The empty value means "no filter".
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub search: String,
    pub categories: Vec<String>,
    pub accounts: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_review_unassigned: Option<bool>,
}

impl SearchFilters {
    pub fn text(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    /// Everything awaiting review, including items nobody has been assigned.
    pub fn needs_review() -> Self {
        Self {
            needs_review: Some(true),
            needs_review_unassigned: Some(true),
            ..Self::default()
        }
    }
}

/// Sparse single-transaction update. Only `Some` fields are sent.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_from_reports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Sparse update applied to many transactions at once.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

/// What the server reports back for a bulk update.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUpdateOutcome {
    pub success: bool,
    pub affected_count: u64,
}
