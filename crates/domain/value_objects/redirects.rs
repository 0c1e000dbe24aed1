use serde::Serialize;
use url::Url;

use crate::domain::entities::restaurants::RestaurantEntity;

const PLACE_REVIEW_BASE: &str = "https://search.google.com/local/writereview";
const SEARCH_BASE: &str = "https://www.google.com/search";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RedirectSource {
    ReviewUrl,
    BusinessUrl,
    PlaceIdDeepLink,
    NameSearch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub url: String,
    pub source: RedirectSource,
}

pub fn normalize_redirect_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return Some(trimmed.to_string());
    }

    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    Some(format!("https://{trimmed}"))
}

/// Picks where a diner lands. Order: review url, business url, place-id deep link,
/// name search. The last step always yields a url.
pub fn select_redirect(restaurant: &RestaurantEntity) -> RedirectTarget {
    if let Some(url) = restaurant
        .google_review_url
        .as_deref()
        .and_then(normalize_redirect_url)
    {
        return RedirectTarget {
            url,
            source: RedirectSource::ReviewUrl,
        };
    }

    if let Some(url) = restaurant
        .google_business_url
        .as_deref()
        .and_then(normalize_redirect_url)
    {
        return RedirectTarget {
            url,
            source: RedirectSource::BusinessUrl,
        };
    }

    if let Some(place_id) = restaurant.place_id() {
        return RedirectTarget {
            url: place_review_url(place_id),
            source: RedirectSource::PlaceIdDeepLink,
        };
    }

    RedirectTarget {
        url: name_search_url(
            &restaurant.name,
            restaurant.city.as_deref(),
            restaurant.address.as_deref(),
        ),
        source: RedirectSource::NameSearch,
    }
}

pub fn place_review_url(place_id: &str) -> String {
    with_query(PLACE_REVIEW_BASE, "placeid", place_id)
}

pub fn name_search_url(name: &str, city: Option<&str>, address: Option<&str>) -> String {
    let query = [Some(name), city, address, Some("reviews")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    with_query(SEARCH_BASE, "q", &query)
}

fn with_query(base: &str, key: &str, value: &str) -> String {
    match Url::parse_with_params(base, &[(key, value)]) {
        Ok(url) => url.to_string(),
        // Both bases are constant, valid urls.
        Err(_) => base.to_string(),
    }
}
