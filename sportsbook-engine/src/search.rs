use sportsbook_catalog::{Repository, SearchFilter, SearchResults};

use crate::error::CommandError;

/// Run a search filter against the catalog.
pub fn search(repo: &dyn Repository, filter: &SearchFilter) -> Result<SearchResults, CommandError> {
    let results = match filter {
        SearchFilter::All(keyword) => SearchResults::Catalog(repo.search_catalog(keyword)?),
        SearchFilter::Sport(keyword) => SearchResults::Sports(repo.search_sports(keyword)?),
        SearchFilter::Event(keyword) => SearchResults::Events(repo.search_events(keyword)?),
        SearchFilter::Market(keyword) => SearchResults::Markets(repo.search_markets(keyword)?),
        SearchFilter::Selection(keyword) => {
            SearchResults::Selections(repo.search_selections(keyword)?)
        }
        SearchFilter::Active(threshold) => {
            SearchResults::Activity(repo.activity_above(*threshold)?)
        }
    };
    Ok(results)
}
