//!  Skyhop Flight Search
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! CLI for multi-leg flight search.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use skyhop_flight_search::{
    ApiConfig, FormError, ResultView, SearchForm, SearchResponse, SegmentView, SkyhopClient,
};
use std::cmp::max;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "skyhop-search")]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Origin airport code (e.g., ICN, GMP)
    #[arg(short, long)]
    from: String,

    /// Destination airport code (e.g., NRT, KIX)
    #[arg(short, long)]
    to: String,

    /// First day of the travel window (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short, long)]
    start: String,

    /// Last day of the travel window (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short, long)]
    end: String,

    /// Nights to stay at the destination (clamped to the travel window)
    #[arg(short, long)]
    nights: Option<String>,

    /// Search backend base URL (defaults to the build-time address)
    #[arg(long)]
    api_url: Option<String>,

    /// Print the raw backend response as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

/// Configure logging based on verbosity level
fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse date string to NaiveDate
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .context(format!(
            "Invalid date format: {}. Use YYYY-MM-DD or YYYY/MM/DD",
            s
        ))
}

fn check_form(form: &SearchForm) -> Result<()> {
    match form.error() {
        Some(err) => Err(anyhow!("{}", err)),
        None => Ok(()),
    }
}

/// Fill the form the way a user would, field by field.
fn fill_form(args: &CliArgs) -> Result<SearchForm> {
    let mut form = SearchForm::new();
    form.set_from_airport(&args.from);
    check_form(&form)?;
    form.set_to_airport(&args.to);
    check_form(&form)?;
    form.set_start_date(Some(parse_date(&args.start)?));
    form.set_end_date(Some(parse_date(&args.end)?));
    if let Some(nights) = &args.nights {
        form.set_trip_nights_input(nights);
        if form.trip_nights().is_none() && !nights.trim().is_empty() {
            tracing::debug!("Ignoring trip nights input {:?}", nights);
        }
    }
    if let Some(err) = form
        .error()
        .filter(|e| matches!(e, FormError::NightsExceeded { .. }))
    {
        eprintln!("⚠️  {}", err);
    }
    Ok(form)
}

/// Get terminal width for responsive tables
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

fn dash_bar() -> String {
    "-".repeat(get_terminal_width().min(100))
}

/// Calculate column widths from the segment cells
fn calc_column_widths(segments: &[SegmentView]) -> (usize, usize, usize, usize, usize) {
    let mut route_w = 11;
    let mut date_w = 12;
    let mut times_w = 13;
    let mut flight_w = 6;
    let mut provider_w = 8;

    for seg in segments {
        route_w = max(route_w, seg.route.chars().count());
        date_w = max(date_w, seg.date.chars().count());
        times_w = max(times_w, seg.times.as_deref().map_or(0, |t| t.chars().count()));
        flight_w = max(flight_w, seg.flight_number.as_deref().map_or(0, str::len));
        provider_w = max(provider_w, seg.provider.chars().count());
    }

    (route_w, date_w, times_w, flight_w, provider_w)
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}

/// Render results to stdout
fn render_results(view: &ResultView, search_url: &str) {
    let title_bar = format!(
        "================================================================================================\n  🛫  {}\n================================================================================================",
        view.route_pattern
    );
    println!("{}\n", title_bar);

    println!("💰 Total:  {}", view.total_cost);
    if let Some(span) = &view.trip_span {
        println!("🗓️  Trip:   {}", span);
    }
    if let (Some(dep), Some(ret)) = (&view.departure_date, &view.return_date) {
        println!("✈️  Dates:  {} ~ {}", dep, ret);
    }
    if let (Some(direct), Some(saved)) = (&view.direct_cost, &view.savings) {
        println!("🎉 Direct: {}  ({})", direct, saved);
    }
    println!("\n🔗 Endpoint: {}", search_url);

    if view.segments.is_empty() {
        println!("\nNo segments returned.");
        return;
    }

    let (rw, dw, tw, fw, pw) = calc_column_widths(&view.segments);

    println!("\n🧭 Segments:");
    println!("{}\n", dash_bar());
    println!(
        "  {:>2}  {}  {}  {}  {}  {}   PRICE",
        "#",
        pad("ROUTE", rw),
        pad("DATE", dw),
        pad("TIMES", tw),
        pad("FLIGHT", fw),
        pad("PROVIDER", pw)
    );
    println!("{}\n", dash_bar());

    for (i, seg) in view.segments.iter().enumerate() {
        println!(
            "  {:>2}  {}  {}  {}  {}  {}   {}",
            i + 1,
            pad(&seg.route, rw),
            pad(&seg.date, dw),
            pad(seg.times.as_deref().unwrap_or(""), tw),
            pad(seg.flight_number.as_deref().unwrap_or(""), fw),
            pad(&seg.provider, pw),
            seg.price
        );
    }
}

fn render_json(response: &SearchResponse) -> Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to encode response")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting skyhop-search CLI");
    tracing::debug!("Args: {:?}", args);

    let config = ApiConfig::resolve(args.api_url.as_deref()).context("Invalid --api-url")?;
    let mut form = fill_form(&args)?;
    let request = form.submit().map_err(|e| anyhow!("{}", e))?;

    tracing::info!(
        "Parsed request: {} -> {} ({} ~ {}), nights: {:?}",
        request.departure,
        request.destination,
        request.start_date,
        request.end_date,
        request.trip_nights
    );

    let client = SkyhopClient::new(config)?;
    let response = client
        .search(&request)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    if args.json {
        return render_json(&response);
    }

    let view = ResultView::from_response(&response);
    render_results(&view, &client.config().search_url());

    Ok(())
}
