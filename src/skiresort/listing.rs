use super::Location;
use crate::utils::{resolve_url, trimmed_text};
use lazy_regex::regex;
use lazy_static::lazy_static;
use scraper::{Html, Selector};

const E: &str = "Invalid selector";
lazy_static! {
    static ref RESORT_ITEM: Selector =
        Selector::parse(r#"div[id="resortList"] div.resort-list-item"#).expect(E);
    static ref DETAIL_LINK: Selector =
        Selector::parse("a.pull-right.btn.btn-default.btn-sm[href]").expect(E);
    static ref BREADCRUMB: Selector = Selector::parse("div.sub-breadcrumb a").expect(E);
    static ref PAGE_LINK: Selector = Selector::parse(r#"ul[id="pagebrowser1"] a[href]"#).expect(E);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub url: String,
    pub location: Location,
}

/// URL of the `n`-th (1-based) index page. Any `page/<k>/` suffix already on
/// `start_url` is replaced.
pub fn page_url(start_url: &str, n: usize) -> String {
    if n <= 1 {
        return start_url.to_string();
    }
    let base = regex!(r"page/\d+/?$").replace(start_url, "");
    let base = base.trim_end_matches('/');
    format!("{}/page/{}/", base, n)
}

pub fn listing_entries(doc: &Html, origin: &str) -> Vec<ListingEntry> {
    doc.select(&RESORT_ITEM)
        .filter_map(|item| {
            let href = item.select(&DETAIL_LINK).next()?.value().attr("href")?;
            let url = resolve_url(origin, href)?;

            let mut crumbs = item
                .select(&BREADCRUMB)
                .map(trimmed_text)
                .filter(|c| !c.is_empty());
            let location = Location {
                continent: crumbs.next(),
                country: crumbs.next(),
                region: crumbs.next(),
            };

            Some(ListingEntry { url, location })
        })
        .collect()
}

/// Highest page number linked from this page's browser. The browser can
/// show only a window of pages, so this is a lower bound of the last page.
pub fn last_page_number(doc: &Html) -> Option<usize> {
    doc.select(&PAGE_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| {
            regex!(r"page/(\d+)")
                .captures(href)
                .and_then(|caps| caps[1].parse::<usize>().ok())
        })
        .max()
}
