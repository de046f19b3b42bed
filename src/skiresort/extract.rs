use super::{normalize_price, RiderCategory, TicketPrice, TicketPrices, UNKNOWN_NAME};
use crate::utils::{
    child_elements, child_node_texts, resolve_url, resort_id_from_url, trimmed_text,
};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const E: &str = "Invalid selector";
lazy_static! {
    static ref H1: Selector = Selector::parse("h1").expect(E);
    static ref NAME: Selector = Selector::parse("span.fn").expect(E);
    static ref LOGO_BOX: Selector = Selector::parse("div.resort-logo").expect(E);
    static ref IMG: Selector = Selector::parse("img").expect(E);
    static ref A: Selector = Selector::parse("a").expect(E);
    static ref ALTITUDE: Selector = Selector::parse(r#"div[id="selAlti"]"#).expect(E);
    static ref DESCRIPTION: Selector =
        Selector::parse("p.p_before_list span.js-more-text").expect(E);
    static ref RUN_TABLE: Selector = Selector::parse("table.run-table").expect(E);
    static ref LIFT_TABLE: Selector = Selector::parse("table.lift-table").expect(E);
    static ref TR: Selector = Selector::parse("tr").expect(E);
    static ref DISTANCE: Selector = Selector::parse("td.distance").expect(E);
    static ref LIFT_GROUP: Selector = Selector::parse("div.lift-count[title]").expect(E);
    static ref AMOUNT: Selector = Selector::parse(".amount").expect(E);
    static ref TICKET_ADULT: Selector = Selector::parse(r#"td[id="selTicketA"]"#).expect(E);
    static ref TICKET_YOUTH: Selector = Selector::parse(r#"td[id="selTicketY"]"#).expect(E);
    static ref TICKET_CHILD: Selector = Selector::parse(r#"td[id="selTicketC"]"#).expect(E);
    static ref PANEL: Selector = Selector::parse("div.panel.panel-default").expect(E);
    static ref LIST_GROUP: Selector = Selector::parse("ul.list-group").expect(E);
    static ref MORE_INFOS: Selector = Selector::parse("a.more-infos").expect(E);
    static ref STARS: Selector = Selector::parse("div.stars-link-element[title]").expect(E);
}

/// A layout-specific way of reading one field. Strategies for a field are
/// tried in order and the first `Some` wins.
type Strategy<T> = fn(&Html) -> Option<T>;

fn first_success<T>(doc: &Html, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(doc))
}

pub fn trail_map_page_url(origin: &str, id: &str) -> String {
    format!("{}/ski-resort/{}/trail-map/", origin.trim_end_matches('/'), id)
}

pub fn test_result_page_url(detail_url: &str) -> String {
    format!("{}/test-result/", detail_url.trim_end_matches('/'))
}

/// Everything that can be read off a resort's own detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub id: String,
    pub url: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub altitude_m: f64,
    pub description: Option<String>,
    pub slope_distances_km: IndexMap<String, f64>,
    pub lift_counts: IndexMap<String, u32>,
    pub ticket_prices: TicketPrices,
}

impl DetailPage {
    /// `None` only when no resort id can be derived from `url`; every other
    /// field falls back to its empty value.
    pub fn extract(doc: &Html, url: &str, origin: &str) -> Option<DetailPage> {
        let id = resort_id_from_url(url)?;
        let logo_box = doc.select(&LOGO_BOX).next();

        Some(DetailPage {
            id,
            url: url.to_string(),
            name: name(doc),
            logo_url: logo_box.and_then(|b| logo_url(b, origin)),
            website_url: logo_box.and_then(|b| website_url(b, origin)),
            altitude_m: altitude(doc),
            description: description(doc),
            slope_distances_km: slope_distances(doc),
            lift_counts: lift_counts(doc),
            ticket_prices: ticket_prices(doc),
        })
    }

    /// First "more info" link of the trail map page.
    pub fn trail_map_link(doc: &Html, origin: &str) -> Option<String> {
        let panel = doc.select(&PANEL).next()?;
        let list = panel.select(&LIST_GROUP).next()?;
        let link = list.select(&MORE_INFOS).next()?;
        link.value()
            .attr("href")
            .and_then(|href| resolve_url(origin, href))
    }

    /// Ratings of the test-result page. The title reads like
    /// `"4.5 out of 5 stars"` and the label sits in the third child element.
    pub fn quality_scores(doc: &Html) -> IndexMap<String, f64> {
        let mut scores = IndexMap::new();
        for el in doc.select(&STARS) {
            let title = el.value().attr("title").unwrap_or_default();
            let score = title
                .find("out")
                .and_then(|end| title[..end].trim().parse::<f64>().ok())
                .filter(|s| (0.0..=10.0).contains(s));
            let label = child_elements(el)
                .nth(2)
                .map(trimmed_text)
                .filter(|l| !l.is_empty());

            match (label, score) {
                (Some(label), Some(score)) => {
                    scores.insert(label, score);
                }
                _ => debug!("Skip rating element with title {:?}", title),
            }
        }
        scores
    }
}

fn name(doc: &Html) -> String {
    doc.select(&H1)
        .next()
        .and_then(|h1| h1.select(&NAME).next())
        .map(trimmed_text)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

fn logo_url(logo_box: ElementRef, origin: &str) -> Option<String> {
    let src = logo_box.select(&IMG).next()?.value().attr("src")?;
    resolve_url(origin, src)
}

fn website_url(logo_box: ElementRef, origin: &str) -> Option<String> {
    let href = logo_box.select(&A).next()?.value().attr("href")?;
    resolve_url(origin, href)
}

/// Peak elevation out of text like `"1200 m - 2000 m"`.
fn parse_peak_altitude(text: &str) -> Option<f64> {
    text.split(" - ")
        .nth(1)?
        .split('m')
        .next()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|alt| *alt >= 0.0)
}

fn altitude_node(doc: &Html, position: usize) -> Option<f64> {
    let container = doc.select(&ALTITUDE).next()?;
    child_node_texts(container)
        .get(position)
        .and_then(|text| parse_peak_altitude(text))
}

/// A tooltip span in front of the numbers moves them to the third node.
fn altitude_after_tooltip(doc: &Html) -> Option<f64> {
    altitude_node(doc, 2)
}

fn altitude_first_node(doc: &Html) -> Option<f64> {
    altitude_node(doc, 0)
}

const ALTITUDE_STRATEGIES: &[Strategy<f64>] = &[altitude_after_tooltip, altitude_first_node];

fn altitude(doc: &Html) -> f64 {
    first_success(doc, ALTITUDE_STRATEGIES).unwrap_or(0.0)
}

fn description(doc: &Html) -> Option<String> {
    doc.select(&DESCRIPTION)
        .next()
        .map(trimmed_text)
        .filter(|d| !d.is_empty())
}

fn cells(row: ElementRef) -> Vec<ElementRef> {
    child_elements(row)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect()
}

fn parse_km(text: &str) -> Option<f64> {
    if !text.contains("km") {
        return None;
    }
    text.split("km")
        .next()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|km| *km >= 0.0)
}

fn slope_distances(doc: &Html) -> IndexMap<String, f64> {
    let mut slopes = IndexMap::new();
    let Some(table) = doc.select(&RUN_TABLE).next() else {
        debug!("No slope table");
        return slopes;
    };

    for row in table.select(&TR) {
        let cells = cells(row);
        if cells.len() < 3 {
            continue;
        }
        let label = trimmed_text(cells[0]);
        let distance = row.select(&DISTANCE).next().map(trimmed_text);
        if let Some(km) = distance.as_deref().and_then(parse_km) {
            slopes.insert(label, km);
        }
    }
    slopes
}

fn parse_count(text: &str) -> u32 {
    let text = text.trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        text.parse::<u32>().unwrap_or(0)
    } else {
        0
    }
}

fn lifts_from_table(doc: &Html) -> Option<IndexMap<String, u32>> {
    let table = doc.select(&LIFT_TABLE).next()?;
    let mut lifts = IndexMap::new();
    for row in table.select(&TR) {
        let cells = cells(row);
        if cells.len() < 2 || cells.iter().all(|c| c.value().name() == "th") {
            continue;
        }
        lifts.insert(trimmed_text(cells[0]), parse_count(&trimmed_text(cells[1])));
    }
    if lifts.is_empty() {
        None
    } else {
        Some(lifts)
    }
}

fn lifts_from_groups(doc: &Html) -> Option<IndexMap<String, u32>> {
    let mut lifts = IndexMap::new();
    for group in doc.select(&LIFT_GROUP) {
        let label = group.value().attr("title").unwrap_or_default().trim();
        let count = group
            .select(&AMOUNT)
            .next()
            .map(trimmed_text)
            .unwrap_or_else(|| trimmed_text(group));
        lifts.insert(label.to_string(), parse_count(&count));
    }
    if lifts.is_empty() {
        None
    } else {
        Some(lifts)
    }
}

const LIFT_STRATEGIES: &[Strategy<IndexMap<String, u32>>] = &[lifts_from_table, lifts_from_groups];

fn lift_counts(doc: &Html) -> IndexMap<String, u32> {
    first_success(doc, LIFT_STRATEGIES).unwrap_or_else(|| {
        debug!("No lift table");
        IndexMap::new()
    })
}

fn ticket_cell(category: RiderCategory) -> &'static Selector {
    match category {
        RiderCategory::Adult => &TICKET_ADULT,
        RiderCategory::Youth => &TICKET_YOUTH,
        RiderCategory::Child => &TICKET_CHILD,
    }
}

fn ticket_prices(doc: &Html) -> TicketPrices {
    let mut prices = TicketPrices::default();
    for category in RiderCategory::ALL {
        let Some(cell) = doc.select(ticket_cell(category)).next() else {
            continue;
        };
        // Skip whitespace-only nodes in front of the price.
        let token = child_node_texts(cell)
            .into_iter()
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
            .unwrap_or_default();

        let price = match normalize_price(&token) {
            Ok(price) => {
                prices.currency = Some(price.currency);
                TicketPrice::Listed(price.amount)
            }
            Err(e) => {
                debug!("{} price: {}", category.label(), e);
                TicketPrice::Unparsed(token)
            }
        };
        *prices.get_mut(category) = price;
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn altitude_reads_third_node_after_tooltip() {
        let html = doc(r#"<div id="selAlti">Elevation <span class="tooltip">i</span> - 1800m</div>"#);
        assert_eq!(altitude(&html), 1800.0);
    }

    #[test]
    fn altitude_falls_back_to_first_node() {
        let html = doc(r#"<div id="selAlti">1000 m - 2300 m</div>"#);
        assert_eq!(altitude(&html), 2300.0);

        let html = doc(r#"<div id="selAlti">780 m - 1420 m<span class="tooltip">i</span></div>"#);
        assert_eq!(altitude(&html), 1420.0);
    }

    #[test]
    fn altitude_defaults_to_zero() {
        assert_eq!(altitude(&doc("<p>nothing</p>")), 0.0);
        assert_eq!(altitude(&doc(r#"<div id="selAlti">unknown</div>"#)), 0.0);
    }

    #[test]
    fn name_defaults_to_unknown() {
        assert_eq!(name(&doc("<h1>No span</h1>")), UNKNOWN_NAME);
        assert_eq!(name(&doc("<p>No heading</p>")), UNKNOWN_NAME);
        assert_eq!(
            name(&doc(r#"<h1>Ski resort <span class="fn"> Zermatt </span></h1>"#)),
            "Zermatt"
        );
    }

    #[test]
    fn slope_rows_need_km_unit() {
        let html = doc(
            r#"<table class="run-table">
                <tr><td>Easy</td><td></td><td class="distance">12.5 km</td></tr>
                <tr><td>Freeride</td><td></td><td class="distance">n/a</td></tr>
                <tr><td>Short</td><td class="distance">3 km</td></tr>
                <tr><td>Difficult</td><td></td><td class="distance">4km</td></tr>
            </table>"#,
        );
        assert_eq!(
            slope_distances(&html),
            IndexMap::from([("Easy".to_string(), 12.5), ("Difficult".to_string(), 4.0)])
        );
    }

    #[test]
    fn missing_slope_table_is_empty() {
        assert!(slope_distances(&doc("<p></p>")).is_empty());
    }

    #[test]
    fn flat_lift_table() {
        let html = doc(
            r#"<table class="lift-table">
                <tr><th>Type</th><th>Number</th></tr>
                <tr><td>Chairlift</td><td>7</td></tr>
                <tr><td>Rope tow</td><td>?</td></tr>
            </table>"#,
        );
        assert_eq!(
            lift_counts(&html),
            IndexMap::from([("Chairlift".to_string(), 7), ("Rope tow".to_string(), 0)])
        );
    }

    #[test]
    fn grouped_lift_layout() {
        let html = doc(
            r#"<div class="lift-count" title="Gondola lift"><span class="amount">3</span><span>x</span></div>
               <div class="lift-count" title="T-bar lift">5</div>"#,
        );
        assert_eq!(
            lift_counts(&html),
            IndexMap::from([("Gondola lift".to_string(), 3), ("T-bar lift".to_string(), 5)])
        );
    }

    #[test]
    fn header_only_table_falls_through_to_groups() {
        let html = doc(
            r#"<table class="lift-table"><tr><th>Type</th><th>Number</th></tr></table>
               <div class="lift-count" title="Chairlift"><span class="amount">4</span></div>"#,
        );
        assert_eq!(
            lift_counts(&html),
            IndexMap::from([("Chairlift".to_string(), 4)])
        );
    }

    #[test]
    fn no_lifts_is_empty() {
        assert!(lift_counts(&doc("<p>no lifts</p>")).is_empty());
    }

    #[test]
    fn prices_take_last_currency() {
        let html = doc(
            r#"<table><tr>
                <td id="selTicketA">€ 45,50</td>
                <td id="selTicketY">SFr. 30<span>approx.</span></td>
            </tr></table>"#,
        );
        let prices = ticket_prices(&html);
        assert_eq!(prices.adult, TicketPrice::Listed("45".to_string()));
        assert_eq!(prices.youth, TicketPrice::Listed("30".to_string()));
        assert_eq!(prices.child, TicketPrice::Missing);
        assert_eq!(prices.currency.as_deref(), Some("Swiss Franc"));
    }

    #[test]
    fn malformed_price_is_marked() {
        let html = doc(r#"<table><tr><td id="selTicketA">€45</td></tr></table>"#);
        let prices = ticket_prices(&html);
        assert_eq!(prices.adult, TicketPrice::Unparsed("€45".to_string()));
        assert_eq!(prices.currency, None);
    }

    #[test]
    fn price_after_whitespace_node() {
        let html = doc(
            "<table><tr><td id=\"selTicketA\">\n    <span>€ 45,50</span></td></tr></table>",
        );
        let prices = ticket_prices(&html);
        assert_eq!(prices.adult, TicketPrice::Listed("45".to_string()));
        assert_eq!(prices.currency.as_deref(), Some("European Euro"));
    }

    #[test]
    fn empty_price_cell_is_unparsed() {
        let html = doc(r#"<table><tr><td id="selTicketC">  </td></tr></table>"#);
        let prices = ticket_prices(&html);
        assert_eq!(prices.child, TicketPrice::Unparsed(String::new()));
        assert_eq!(prices.adult, TicketPrice::Missing);
    }

    #[test]
    fn trail_map_link_needs_every_level() {
        let origin = "https://www.skiresort.info";
        let html = doc(
            r#"<div class="panel panel-default"><ul class="list-group">
                <li><a class="more-infos" href="/ski-resort/x/trail-map/interactive/">Open</a></li>
            </ul></div>"#,
        );
        assert_eq!(
            DetailPage::trail_map_link(&html, origin).as_deref(),
            Some("https://www.skiresort.info/ski-resort/x/trail-map/interactive/")
        );

        let html = doc(r#"<div class="panel panel-default"><p>no list</p></div>"#);
        assert_eq!(DetailPage::trail_map_link(&html, origin), None);
    }

    #[test]
    fn quality_scores_skip_bad_titles() {
        let html = doc(
            r#"<div class="stars-link-element" title="4.5 out of 5 stars"><span></span><span></span><div> Snow reliability </div></div>
               <div class="stars-link-element" title="stars"><span></span><span></span><div>Slopes</div></div>"#,
        );
        assert_eq!(
            DetailPage::quality_scores(&html),
            IndexMap::from([("Snow reliability".to_string(), 4.5)])
        );
    }

    #[test]
    fn derived_urls() {
        assert_eq!(
            trail_map_page_url("https://www.skiresort.info", "zermatt"),
            "https://www.skiresort.info/ski-resort/zermatt/trail-map/"
        );
        assert_eq!(
            test_result_page_url("https://www.skiresort.info/ski-resort/zermatt/"),
            "https://www.skiresort.info/ski-resort/zermatt/test-result/"
        );
    }
}
