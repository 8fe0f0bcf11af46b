use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;

use crate::api::{ApiClient, ReviewBackend};
use crate::config::Config;
use crate::listing::ReviewPage;
use crate::pagination::{page_window, render_window};
use crate::query::{DateRange, ReplyStatus, SortOrder};
use crate::reply::{submit_replies, ReplyDraft};
use crate::store::{FetchRequest, FilterAction, ReviewStore};
use crate::text::{star_bar, truncate_text};

fn parse_date(matches: &ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    matches
        .get_one::<String>(name)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("--{} must be YYYY-MM-DD, got '{}'", name, raw))
        })
        .transpose()
}

/// Translate `list` flags into store actions. The page comes last since
/// every other action sends the store back to page 1.
pub fn filter_actions(matches: &ArgMatches) -> Result<Vec<FilterAction>> {
    let mut actions = Vec::new();

    if let Some(search) = matches.get_one::<String>("search") {
        actions.push(FilterAction::Search(search.clone()));
    }
    if let Some(stars) = matches.get_one::<u8>("stars") {
        actions.push(FilterAction::StarRating(Some(*stars)));
    }
    if let Some(status) = matches.get_one::<String>("reply-status") {
        actions.push(FilterAction::ReplyStatus(Some(status.parse::<ReplyStatus>()?)));
    }
    if let Some(sort) = matches.get_one::<String>("sort") {
        actions.push(FilterAction::Sort(sort.parse::<SortOrder>()?));
    }
    if matches.get_flag("has-comment") {
        actions.push(FilterAction::HasComment(Some(true)));
    }

    let from = parse_date(matches, "from")?;
    let to = parse_date(matches, "to")?;
    if from.is_some() || to.is_some() {
        actions.push(FilterAction::DateRange(Some(DateRange::new(from, to))));
    }

    if let Some(page) = matches.get_one::<u32>("page") {
        actions.push(FilterAction::GoToPage(*page));
    }
    Ok(actions)
}

/// Run the `list` flags through a fresh store and return the request it would issue.
pub fn request_from_args(config: &Config, matches: &ArgMatches) -> Result<FetchRequest> {
    let mut store = ReviewStore::new(config.account_id.clone(), config.per_page);
    let mut request = store.dispatch(FilterAction::Refresh);
    for action in filter_actions(matches)? {
        if let Some(next) = store.dispatch(action) {
            request = Some(next);
        }
    }
    request.ok_or_else(|| anyhow!("No review query to send"))
}

pub async fn list(config: &Config, matches: &ArgMatches) -> Result<()> {
    let request = request_from_args(config, matches)?;
    let api = ApiClient::new(config)?;
    let page = api
        .fetch_reviews(&request.query)
        .await
        .context("Failed to fetch reviews")?;

    print_page(&page);
    Ok(())
}

fn print_page(page: &ReviewPage) {
    if page.reviews.is_empty() {
        println!("No reviews match these filters.");
    }

    for review in &page.reviews {
        println!(
            "{}  {:<8} {}  {:<20} {}",
            review.date.format("%Y-%m-%d"),
            review.status.label(),
            star_bar(review.rating),
            truncate_text(&review.customer_name, 20),
            truncate_text(&review.comment, 60)
        );
        if let Some(reply) = &review.business_reply {
            println!("            ↳ {}", truncate_text(&reply.text, 70));
        }
    }

    let summary = &page.summary;
    println!();
    println!(
        "Page {} of {} · {} reviews total · average on this page {:.2}",
        page.pagination.page, page.pagination.total_pages, summary.total, summary.average_rating
    );
    for star in (1..=5u8).rev() {
        println!("  {} {}", star_bar(star), summary.count_for(star));
    }

    let window = page_window(page.pagination.page, page.pagination.total_pages);
    if !window.is_empty() {
        println!("{}", render_window(&window));
    }
}

pub async fn reply(config: &Config, matches: &ArgMatches) -> Result<()> {
    let review_id = matches
        .get_one::<String>("review-id")
        .ok_or_else(|| anyhow!("review id is required"))?;
    let text = matches
        .get_one::<String>("text")
        .ok_or_else(|| anyhow!("reply text is required"))?;

    let draft = ReplyDraft {
        review_id: review_id.clone(),
        text: text.clone(),
        is_public: !matches.get_flag("private"),
    };

    let api = ApiClient::new(config)?;
    let confirmation = api
        .post_reply(&draft)
        .await
        .with_context(|| format!("Failed to reply to {}", review_id))?;

    match confirmation.message {
        Some(message) => println!("Replied to {}: {}", review_id, message),
        None => println!("Replied to {}", review_id),
    }
    Ok(())
}

pub async fn reply_batch(config: &Config, matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("file")
        .ok_or_else(|| anyhow!("batch file is required"))?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path))?;
    let drafts: Vec<ReplyDraft> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse batch file {}", path))?;

    let api = ApiClient::new(config)?;
    let outcome = submit_replies(&api, &drafts).await;

    println!("{} of {} replies posted", outcome.succeeded.len(), drafts.len());
    for failure in &outcome.failed {
        let hint = if failure.error.is_retryable() { " (retryable)" } else { "" };
        println!("  ✗ {}: {}{}", failure.review_id, failure.error, hint);
    }

    if !outcome.is_complete_success() {
        bail!("{} replies failed", outcome.failed.len());
    }
    Ok(())
}

pub async fn location(config: &Config, matches: &ArgMatches) -> Result<()> {
    let location_id = matches
        .get_one::<String>("location-id")
        .ok_or_else(|| anyhow!("location id is required"))?;
    let api = ApiClient::new(config)?;
    let profile = api
        .get_location(location_id)
        .await
        .with_context(|| format!("Failed to fetch location {}", location_id))?;

    println!("{}", profile.display_name());
    let fields = [
        ("Category", profile.primary_category.as_deref()),
        ("Address", profile.address.as_deref()),
        ("Phone", profile.phone.as_deref()),
        ("Website", profile.website.as_deref()),
        ("About", profile.description.as_deref()),
    ];
    for (label, value) in fields {
        println!("  {:<9} {}", label, value.unwrap_or("—"));
    }
    if let (Some(rating), Some(count)) = (profile.average_rating, profile.total_reviews) {
        println!("  {:<9} {:.1} from {} reviews", "Rating", rating, count);
    }
    Ok(())
}

pub async fn hygiene(config: &Config, matches: &ArgMatches) -> Result<()> {
    let location_id = matches
        .get_one::<String>("location-id")
        .ok_or_else(|| anyhow!("location id is required"))?;
    let api = ApiClient::new(config)?;
    let hygiene = api
        .get_location_hygiene(location_id)
        .await
        .with_context(|| format!("Failed to fetch hygiene for {}", location_id))?;

    println!("Profile health: {}%", hygiene.health);
    for item in hygiene.checklist() {
        println!("  [{}] {}", if item.done { "x" } else { " " }, item.label);
    }
    let missing = hygiene.missing();
    if !missing.is_empty() {
        println!("Missing: {}", missing.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command;
    use std::path::PathBuf;

    fn config() -> Config {
        Config {
            api_base_url: "https://api.example.com".into(),
            api_token: "t".into(),
            account_id: Some("acc-3".into()),
            per_page: 20,
            log_dir: PathBuf::from("logs"),
        }
    }

    fn list_matches(args: &[&str]) -> ArgMatches {
        let mut full = vec!["gmb-reviews", "list"];
        full.extend_from_slice(args);
        let matches = command().try_get_matches_from(full).unwrap();
        matches.subcommand_matches("list").unwrap().clone()
    }

    #[test]
    fn list_flags_become_query() {
        let matches = list_matches(&[
            "--search", "parking", "--stars", "2", "--reply-status", "not_replied",
            "--sort", "oldest", "--from", "2025-02-01", "--to", "2025-01-01", "--page", "3",
            "--has-comment",
        ]);
        let query = request_from_args(&config(), &matches).unwrap().query;

        assert_eq!(query.account_id.as_deref(), Some("acc-3"));
        assert_eq!(query.search.as_deref(), Some("parking"));
        assert_eq!(query.star_rating, Some(2));
        assert_eq!(query.reply_status, Some(ReplyStatus::NotReplied));
        assert_eq!(query.sort, SortOrder::Oldest);
        assert_eq!(query.has_comment, Some(1));
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 20);
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2025, 2, 1));
    }

    #[test]
    fn page_flag_is_applied_after_filters() {
        let actions = filter_actions(&list_matches(&["--page", "4", "--stars", "5"])).unwrap();
        assert_eq!(actions.last(), Some(&FilterAction::GoToPage(4)));
    }

    #[test]
    fn bad_date_is_reported() {
        let matches = list_matches(&["--from", "01/02/2025"]);
        let err = filter_actions(&matches).unwrap_err();
        assert!(err.to_string().contains("--from"));
    }

    #[test]
    fn no_flags_means_first_page_unfiltered() {
        let request = request_from_args(&config(), &list_matches(&[])).unwrap();
        assert_eq!(request.seq, 1);
        assert_eq!(request.query.page, 1);
        assert!(request.query.search.is_none());
        assert!(request.query.star_rating.is_none());
    }
}
