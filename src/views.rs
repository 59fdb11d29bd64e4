//! Server-rendered HTML pages
//!
//! Minimal read-only views over the ledger: a home page plus one table per
//! entity. The event page shows person and activity names instead of ids.

use crate::api::SharedDb;
use crate::error::AppError;
use axum::{extract::State, response::Html, routing::get, Router};

/// Routes for the HTML pages
pub fn routes() -> Router<SharedDb> {
    Router::new()
        .route("/", get(home))
        .route("/person", get(people_page))
        .route("/activity", get(activities_page))
        .route("/event", get(events_page))
}

async fn home() -> Html<String> {
    Html(page(
        "Booking Ledger",
        "<ul>\
         <li><a href=\"/event\">Events</a></li>\
         <li><a href=\"/activity\">Activities</a></li>\
         <li><a href=\"/person\">People</a></li>\
         </ul>",
    ))
}

async fn people_page(State(db): State<SharedDb>) -> Result<Html<String>, AppError> {
    let rows: Vec<Vec<String>> = db
        .list_people()
        .await?
        .into_iter()
        .map(|p| vec![p.person_id.to_string(), p.name])
        .collect();

    Ok(Html(page("People", &table(&["ID", "Name"], &rows))))
}

async fn activities_page(State(db): State<SharedDb>) -> Result<Html<String>, AppError> {
    let rows: Vec<Vec<String>> = db
        .list_activities()
        .await?
        .into_iter()
        .map(|a| vec![a.activity_id.to_string(), a.name])
        .collect();

    Ok(Html(page("Activities", &table(&["ID", "Name"], &rows))))
}

async fn events_page(State(db): State<SharedDb>) -> Result<Html<String>, AppError> {
    let rows: Vec<Vec<String>> = db
        .overview()
        .await?
        .into_iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.person,
                e.activity,
                e.date,
                format!("{:.2}", e.amount),
            ]
        })
        .collect();

    Ok(Html(page(
        "Events",
        &table(&["ID", "Person", "Activity", "Date", "Amount"], &rows),
    )))
}

/// Wrap a body fragment in a complete HTML document
fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n<p><a href=\"/\">Home</a></p>\n{body}\n</body>\n</html>\n",
        title = html_escape(title),
        body = body,
    )
}

/// Render an HTML table; every cell is escaped
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "<p>Nothing booked yet.</p>".to_string();
    }

    let mut html = String::from("<table>\n<tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", html_escape(header)));
    }
    html.push_str("</tr>\n");

    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", html_escape(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

/// Escape text for use inside HTML elements and attribute values
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
