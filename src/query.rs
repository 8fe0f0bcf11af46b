use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Replied,
    NotReplied,
}

impl ReplyStatus {
    /// Cycle used by the dashboard: any → replied → not replied → any.
    pub fn cycle(current: Option<ReplyStatus>) -> Option<ReplyStatus> {
        match current {
            None => Some(ReplyStatus::Replied),
            Some(ReplyStatus::Replied) => Some(ReplyStatus::NotReplied),
            Some(ReplyStatus::NotReplied) => None,
        }
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyStatus::Replied => write!(f, "replied"),
            ReplyStatus::NotReplied => write!(f, "not replied"),
        }
    }
}

impl FromStr for ReplyStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replied" => Ok(ReplyStatus::Replied),
            "not_replied" | "not-replied" | "unreplied" => Ok(ReplyStatus::NotReplied),
            _ => Err(anyhow!("Unknown reply status '{}' (expected replied or not_replied)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    HighestRating,
    LowestRating,
}

impl SortOrder {
    pub fn next(self) -> SortOrder {
        match self {
            SortOrder::Newest => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::HighestRating,
            SortOrder::HighestRating => SortOrder::LowestRating,
            SortOrder::LowestRating => SortOrder::Newest,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::HighestRating => "highest rating",
            SortOrder::LowestRating => "lowest rating",
        };
        f.write_str(label)
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "highest_rating" | "highest" => Ok(SortOrder::HighestRating),
            "lowest_rating" | "lowest" => Ok(SortOrder::LowestRating),
            _ => Err(anyhow!("Unknown sort order '{}'", s)),
        }
    }
}

/// Inclusive calendar range; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Ends given in the wrong order are swapped.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        match (from, to) {
            (Some(a), Some(b)) if a > b => DateRange {
                from: Some(b),
                to: Some(a),
            },
            _ => DateRange { from, to },
        }
    }
}

/// The user's current filter selection. Only the store mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub star_rating: Option<u8>,
    pub reply_status: Option<ReplyStatus>,
    pub has_comment: Option<bool>,
    pub date_range: Option<DateRange>,
    pub sort: SortOrder,
    pub page: u32,
    pub per_page: u32,
}

impl FilterState {
    pub fn new(per_page: u32) -> Self {
        FilterState {
            search_term: String::new(),
            star_rating: None,
            reply_status: None,
            has_comment: None,
            date_range: None,
            sort: SortOrder::default(),
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn is_filtered(&self) -> bool {
        !self.search_term.is_empty()
            || self.star_rating.is_some()
            || self.reply_status.is_some()
            || self.has_comment.is_some()
            || self.date_range.is_some()
    }

    pub fn to_query(&self, account_id: Option<&str>) -> ReviewQuery {
        let search = self.search_term.trim();
        ReviewQuery {
            account_id: account_id.map(str::to_string),
            page: self.page,
            per_page: self.per_page,
            search: (!search.is_empty()).then(|| search.to_string()),
            star_rating: self.star_rating,
            reply_status: self.reply_status,
            has_comment: self.has_comment.map(u8::from),
            start_date: self.date_range.and_then(|r| r.from),
            end_date: self.date_range.and_then(|r| r.to),
            sort: self.sort,
        }
    }
}

/// JSON body of `POST /review/account`. Unset criteria are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_status: Option<ReplyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_comment: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub sort: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_query_omits_unset_criteria() {
        let query = FilterState::new(10).to_query(None);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "page": 1, "per_page": 10, "sort": "newest" })
        );
    }

    #[test]
    fn full_query_serializes_every_criterion() {
        let mut filters = FilterState::new(25);
        filters.search_term = "  cold brew ".to_string();
        filters.star_rating = Some(2);
        filters.reply_status = Some(ReplyStatus::NotReplied);
        filters.has_comment = Some(true);
        filters.date_range = Some(DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 31),
            NaiveDate::from_ymd_opt(2025, 1, 1),
        ));
        filters.sort = SortOrder::LowestRating;

        assert_eq!(
            serde_json::to_value(filters.to_query(Some("acc-7"))).unwrap(),
            json!({
                "account_id": "acc-7",
                "page": 1,
                "per_page": 25,
                "search": "cold brew",
                "star_rating": 2,
                "reply_status": "not_replied",
                "has_comment": 1,
                "start_date": "2025-01-01",
                "end_date": "2025-03-31",
                "sort": "lowest_rating"
            })
        );
    }

    #[test]
    fn reply_status_cycles_through_any() {
        let mut status = None;
        status = ReplyStatus::cycle(status);
        assert_eq!(status, Some(ReplyStatus::Replied));
        status = ReplyStatus::cycle(status);
        assert_eq!(status, Some(ReplyStatus::NotReplied));
        assert_eq!(ReplyStatus::cycle(status), None);
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("not-replied".parse::<ReplyStatus>().unwrap(), ReplyStatus::NotReplied);
        assert_eq!("highest-rating".parse::<SortOrder>().unwrap(), SortOrder::HighestRating);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
