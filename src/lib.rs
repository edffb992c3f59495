// Library root
// -----------
// Interactive review of Monarch transactions. The binary (`main.rs`) wires
// these modules together and hands control to the review loop.
//
// Module responsibilities:
// - `api`: blocking HTTP/GraphQL client, the `Remote` trait and the token cache.
// - `models` / `queries`: wire types and the GraphQL documents behind them.
// - `session`: the transactions under review and the cursor.
// - `review`: the command loop and its handlers.
// - `ui`: prompts and output behind the `Console` trait.
// - `format`, `links`, `autocomplete`: pure helpers used by the loop.
pub mod api;
pub mod autocomplete;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod links;
pub mod logging;
pub mod models;
pub mod queries;
pub mod review;
pub mod session;
pub mod ui;
