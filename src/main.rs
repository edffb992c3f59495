// Entrypoint for the review CLI.
// - Keeps `main` small: authenticate, load what needs review, hand it to
//   the review loop.
// - Returns `anyhow::Result`; only startup failures end the process with an error.

use anyhow::Context;
use monarch_review::api::{ApiClient, Remote, TokenCache, SEARCH_LIMIT};
use monarch_review::config::Settings;
use monarch_review::links::LinkMap;
use monarch_review::logging;
use monarch_review::models::{SearchFilters, SortOrder};
use monarch_review::review::{Catalog, Reviewer};
use monarch_review::session::Session;
use monarch_review::ui::TerminalConsole;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging()?;

    let settings = Settings::from_env();
    let mut api = ApiClient::new(&settings.base_url).context("Failed to build HTTP client")?;
    api.authenticate(&TokenCache::new(&settings.token_cache))
        .context("Authentication failed")?;

    let transactions = api
        .search_transactions(&SearchFilters::needs_review(), SortOrder::default(), SEARCH_LIMIT)
        .context("Failed to load transactions to review")?;
    let catalog = Catalog::load(&api).context("Failed to load categories and tags")?;
    let links = LinkMap::load(&settings.links_file).unwrap_or_else(|e| {
        warn!(path = %settings.links_file.display(), error = %e, "Ignoring links file");
        LinkMap::default()
    });

    let mut console = TerminalConsole::new();
    let mut session = Session::new(transactions);
    let outcome = Reviewer::new(&api, &mut console, catalog, links).run(&mut session)?;
    info!(?outcome, reviewed_up_to = session.cursor(), "Review ended");

    println!("done");
    Ok(())
}
