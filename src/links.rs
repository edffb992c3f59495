// Custom links: a JSON object mapping a label to a URL template, e.g.
// { "Bank": "https://bank.example/search?q={plaidName}&on={date}" }.
// Templates only understand the fixed placeholders below.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::models::Transaction;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Failed to read links file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Links file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    PlaidName,
    Date,
    TransactionId,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [
        Placeholder::PlaidName,
        Placeholder::Date,
        Placeholder::TransactionId,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Placeholder::PlaidName => "{plaidName}",
            Placeholder::Date => "{date}",
            Placeholder::TransactionId => "{transactionId}",
        }
    }

    fn value(self, txn: &Transaction) -> String {
        match self {
            Placeholder::PlaidName => txn.plaid_name.clone(),
            Placeholder::Date => txn.date.format("%Y-%m-%d").to_string(),
            Placeholder::TransactionId => txn.id.clone(),
        }
    }
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Substitute the known placeholders into `template`; anything else in
/// braces is left untouched.
pub fn resolve(template: &str, txn: &Transaction) -> String {
    Placeholder::ALL.iter().fold(template.to_string(), |url, p| {
        url.replace(p.token(), &encode_component(&p.value(txn)))
    })
}

#[derive(Debug, Clone, Default)]
pub struct LinkMap {
    links: BTreeMap<String, String>,
}

impl LinkMap {
    /// A missing file is an empty map, not an error.
    pub fn load(path: &Path) -> Result<Self, LinkError> {
        if !path.exists() {
            return Ok(LinkMap::default());
        }
        let data = fs::read_to_string(path)?;
        let links: BTreeMap<String, String> = serde_json::from_str(&data)?;
        Ok(LinkMap { links })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        LinkMap {
            links: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.links.keys().map(String::as_str).collect()
    }

    pub fn resolve(&self, label: &str, txn: &Transaction) -> Option<String> {
        self.links.get(label).map(|template| resolve(template, txn))
    }
}
