// extractor.rs
use crate::scraper::models::{ListingField, RawListing};
use crate::scraper::ScraperError;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const LISTING_CARD: &str = r#"li[data-cy="rp-property-cd"]"#;
const LISTING_LINK: &str = "a[href]";
const NEXT_PAGE_BUTTON: &str = r#"button[data-testid="next-page"]"#;
const RESULTS_TOTAL: &str = r#"[data-cy="rp-title-txt"]"#;

/// Where each card field lives inside a listing card.
pub const FIELD_SELECTORS: [(ListingField, &str); 7] = [
    (ListingField::Location, r#"h2[data-cy="rp-cardProperty-location-txt"]"#),
    (ListingField::LocationDetail, r#"p[data-cy="rp-cardProperty-street-txt"]"#),
    (ListingField::Size, r#"li[data-cy="rp-cardProperty-propertyArea-txt"]"#),
    (ListingField::Bedrooms, r#"li[data-cy="rp-cardProperty-bedroomQuantity-txt"]"#),
    (ListingField::Bathrooms, r#"li[data-cy="rp-cardProperty-bathroomQuantity-txt"]"#),
    (
        ListingField::ParkingSpaces,
        r#"li[data-cy="rp-cardProperty-parkingSpacesQuantity-txt"]"#,
    ),
    (ListingField::Price, r#"div[data-cy="rp-cardProperty-price-txt"]"#),
];

/// State of the results page's "next page" button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    HasNext,
    Last,
    /// No pagination control on the page at all.
    Missing,
}

impl Pagination {
    pub fn has_next(self) -> bool {
        matches!(self, Pagination::HasNext)
    }
}

/// Everything the crawl needs from one results page.
#[derive(Debug)]
pub struct ResultsPage {
    pub listings: Vec<RawListing>,
    pub pagination: Pagination,
    pub declared_total: Option<usize>,
}

pub struct ListingExtractor {
    card: Selector,
    link: Selector,
    fields: Vec<(ListingField, Selector)>,
    next_page: Selector,
    results_total: Selector,
}

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::HtmlParse(format!("{css}: {e}")))
}

impl ListingExtractor {
    pub fn new() -> Result<Self, ScraperError> {
        let fields = FIELD_SELECTORS
            .iter()
            .map(|(field, css)| selector(css).map(|sel| (*field, sel)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            card: selector(LISTING_CARD)?,
            link: selector(LISTING_LINK)?,
            fields,
            next_page: selector(NEXT_PAGE_BUTTON)?,
            results_total: selector(RESULTS_TOTAL)?,
        })
    }

    /// Parses a page once: its listings in document order plus the
    /// pagination and results-total signals.
    pub fn extract(&self, html: &str) -> ResultsPage {
        let document = Html::parse_document(html);
        ResultsPage {
            listings: self.listings(&document).collect(),
            pagination: self.pagination(&document),
            declared_total: self.declared_total(&document),
        }
    }

    /// Listings of an already parsed page. Cards without a link (ads and
    /// other filler sharing the card marker) are left out.
    pub fn listings<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = RawListing> + 'a {
        document
            .select(&self.card)
            .enumerate()
            .filter_map(move |(idx, card)| {
                let listing = self.extract_card(card);
                if listing.is_none() {
                    debug!(card = idx, "Skipping card without link");
                }
                listing
            })
    }

    fn extract_card(&self, card: ElementRef<'_>) -> Option<RawListing> {
        let href = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))?;

        let mut listing = RawListing::new(href);
        for (field, selector) in &self.fields {
            listing.set(*field, first_text(card, selector));
        }
        Some(listing)
    }

    pub fn pagination(&self, document: &Html) -> Pagination {
        match document.select(&self.next_page).next() {
            Some(button) if button.value().attr("disabled").is_some() => Pagination::Last,
            Some(_) => Pagination::HasNext,
            None => Pagination::Missing,
        }
    }

    /// Total listing count announced in the results header, e.g.
    /// "1.234 Apartamentos para alugar em Fortaleza, CE" -> 1234.
    pub fn declared_total(&self, document: &Html) -> Option<usize> {
        let header = document.select(&self.results_total).next()?;
        let text: String = header.text().collect();
        leading_count(&text)
    }
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

fn leading_count(text: &str) -> Option<usize> {
    let token = text.split_whitespace().next()?;
    token.replace('.', "").parse().ok()
}
