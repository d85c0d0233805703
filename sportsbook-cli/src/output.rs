//! Rendering command outcomes for stdout.

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use serde::Serialize;
use sportsbook_catalog::*;

use crate::CliError;

/// One line per search row, either as JSON or as tab-separated text.
pub(crate) fn result_lines(results: &SearchResults, json: bool) -> Result<Vec<String>, CliError> {
    if json {
        return json_lines(results).map_err(|e| CliError::output(e.to_string()));
    }
    Ok(match results {
        SearchResults::Catalog(rows) => rows.iter().map(catalog_line).collect(),
        SearchResults::Sports(rows) => rows
            .iter()
            .map(|s| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    s.id,
                    s.name,
                    s.display_name,
                    s.slug,
                    active_label(s.active)
                )
            })
            .collect(),
        SearchResults::Events(rows) => rows
            .iter()
            .map(|e| {
                format!(
                    "{}\tsport {}\t{}\t{}\t{}",
                    e.id,
                    e.sport_id,
                    e.name,
                    e.slug,
                    active_label(e.active)
                )
            })
            .collect(),
        SearchResults::Markets(rows) => rows
            .iter()
            .map(|m| {
                format!(
                    "{}\t{}\t{}\tschema {}\t{}",
                    m.id,
                    m.name,
                    m.display_name,
                    m.schema,
                    active_label(m.active)
                )
            })
            .collect(),
        SearchResults::Selections(rows) => rows.iter().map(selection_line).collect(),
        SearchResults::Activity(rows) => rows
            .iter()
            .map(|r| format!("{}\t{}\t{}\t{}", r.kind, r.id, r.name, r.active_count))
            .collect(),
    })
}

/// Column header for the text rendering of `results`. It is logged, so
/// color follows stderr.
pub(crate) fn header(results: &SearchResults) -> String {
    let text = match results {
        SearchResults::Catalog(_) => "sport > event > market > selection",
        SearchResults::Sports(_) => "id\tname\tdisplay name\tslug\tstatus",
        SearchResults::Events(_) => "id\tsport\tname\tslug\tstatus",
        SearchResults::Markets(_) => "id\tname\tdisplay name\tschema\tstatus",
        SearchResults::Selections(_) => "id\tmarket event\tname\tprice\toutcome\tstatus",
        SearchResults::Activity(_) => "type\tid\tname\tactive",
    };
    text.if_supports_color(Stderr, |t| t.bold()).to_string()
}

fn json_lines(results: &SearchResults) -> Result<Vec<String>, serde_json::Error> {
    match results {
        SearchResults::Catalog(rows) => to_json(rows),
        SearchResults::Sports(rows) => to_json(rows),
        SearchResults::Events(rows) => to_json(rows),
        SearchResults::Markets(rows) => to_json(rows),
        SearchResults::Selections(rows) => to_json(rows),
        SearchResults::Activity(rows) => to_json(rows),
    }
}

fn to_json<T: Serialize>(rows: &[T]) -> Result<Vec<String>, serde_json::Error> {
    rows.iter().map(serde_json::to_string).collect()
}

fn catalog_line(row: &CatalogRow) -> String {
    let mut parts = vec![format!("{} {}", row.sport.id, row.sport.name)];
    if let Some(event) = &row.event {
        parts.push(format!("{} {}", event.id, event.name));
    }
    if let Some(market) = &row.market {
        parts.push(format!("{} {}", market.id, market.name));
    }
    if let Some(selection) = &row.selection {
        parts.push(format!(
            "{} {} @ {}",
            selection.id, selection.name, selection.price
        ));
    }
    parts.join(" > ")
}

fn selection_line(s: &Selection) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        s.id,
        s.marketevent_id,
        s.name,
        s.price,
        s.outcome.as_deref().unwrap_or("-"),
        active_label(s.active)
    )
}

fn active_label(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}
