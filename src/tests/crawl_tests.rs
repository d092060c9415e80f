// src/tests/crawl_tests.rs

use super::utils::{card, crawl_config, filler_card, location, page, FakeFetcher, NextButton};
use crate::domain::params::SearchCombination;
use crate::scraper::{ListingExtractor, ListingsScraper, ScraperError};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://www.zapimoveis.com.br/aluguel/imoveis/ce+fortaleza/?transacao=aluguel").unwrap()
}

fn scraper(pages: Vec<Result<String, u16>>) -> ListingsScraper<FakeFetcher> {
    ListingsScraper::new(FakeFetcher::new(pages), crawl_config()).unwrap()
}

#[test]
fn stops_on_disabled_next_button() {
    let scraper = scraper(vec![
        Ok(page(&[card(1), card(2)], 6, NextButton::Enabled)),
        Ok(page(&[card(3), card(4)], 6, NextButton::Enabled)),
        Ok(page(&[card(5), card(6)], 6, NextButton::Disabled)),
        Ok(page(&[card(7)], 6, NextButton::Disabled)),
    ]);

    let outcome = scraper.crawl_url("fortaleza", base_url()).unwrap();

    assert_eq!(scraper.fetcher().pages_requested(), vec![1, 2, 3]);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.declared_total, 6);

    // page-encounter order
    let ids: Vec<_> = outcome
        .listings
        .iter()
        .map(|l| l.link.rsplit("-id-").next().unwrap().trim_end_matches('/').to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
}

#[test]
fn count_mismatch_is_a_consistency_error() {
    let cards: Vec<String> = (1..=44).map(card).collect();
    let scraper = scraper(vec![Ok(page(&cards, 45, NextButton::Disabled))]);

    let err = scraper.crawl_url("fortaleza", base_url()).unwrap_err();

    match err {
        ScraperError::Consistency {
            declared,
            accumulated,
        } => {
            assert_eq!(declared, 45);
            assert_eq!(accumulated, 44);
        }
        other => panic!("expected consistency error, got {other:?}"),
    }
}

#[test]
fn fetch_failure_aborts_the_crawl() {
    let scraper = scraper(vec![
        Ok(page(&[card(1)], 3, NextButton::Enabled)),
        Err(503),
        Ok(page(&[card(3)], 3, NextButton::Disabled)),
    ]);

    let err = scraper.crawl_url("fortaleza", base_url()).unwrap_err();

    assert!(matches!(err, ScraperError::Status { status: 503, .. }));
    assert!(err.is_fetch_error());
    assert_eq!(scraper.fetcher().pages_requested(), vec![1, 2]);
}

#[test]
fn missing_pagination_control_ends_the_crawl() {
    let scraper = scraper(vec![
        Ok(page(&[card(1), card(2)], 2, NextButton::Absent)),
        Ok(page(&[card(3)], 2, NextButton::Disabled)),
    ]);

    let outcome = scraper.crawl_url("fortaleza", base_url()).unwrap();

    assert_eq!(scraper.fetcher().pages_requested(), vec![1]);
    assert_eq!(outcome.listings.len(), 2);
}

#[test]
fn missing_results_header_fails_validation() {
    let html = r#"<html><body><button data-testid="next-page" disabled></button></body></html>"#;
    let scraper = scraper(vec![Ok(html.to_string())]);

    let err = scraper.crawl_url("fortaleza", base_url()).unwrap_err();

    assert!(matches!(err, ScraperError::MissingTotal));
    assert!(!err.is_fetch_error());
}

#[test]
fn filler_cards_do_not_count() {
    let scraper = scraper(vec![Ok(page(
        &[card(1), filler_card(), card(2), filler_card()],
        2,
        NextButton::Disabled,
    ))]);

    let outcome = scraper.crawl_url("fortaleza", base_url()).unwrap();

    assert_eq!(outcome.listings.len(), 2);
}

#[test]
fn crawl_uses_combination_url() {
    let scraper = scraper(vec![Ok(page(&[card(1)], 1, NextButton::Disabled))]);
    let combination = SearchCombination::new(
        "aluguel",
        "apartamento_residencial",
        &location("Ceará", "CE", "Fortaleza"),
    );

    scraper.crawl(&combination).unwrap();

    let calls = scraper.fetcher().calls.borrow();
    assert_eq!(calls.len(), 1);
    let (url, page) = &calls[0];
    assert_eq!(*page, 1);
    assert!(url.starts_with("https://www.zapimoveis.com.br/aluguel/imoveis/ce+fortaleza/?onde="));
    assert!(url.ends_with("tipos=apartamento_residencial&transacao=aluguel"));
}

#[test]
fn fetched_pages_are_kept_when_a_dump_dir_is_set() {
    let dir = std::env::temp_dir().join(format!(
        "pages_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let first = page(&[card(1), card(2)], 3, NextButton::Enabled);
    let second = page(&[card(3)], 3, NextButton::Disabled);
    let mut cfg = crawl_config();
    cfg.page_dump_dir = Some(dir.clone());
    let scraper = ListingsScraper::new(
        FakeFetcher::new(vec![Ok(first.clone()), Ok(second.clone())]),
        cfg,
    )
    .unwrap();

    scraper.crawl_url("fortaleza", base_url()).unwrap();

    let kept = std::fs::read_to_string(dir.join("fortaleza_page1.html")).unwrap();
    assert_eq!(kept, first);
    assert_eq!(
        std::fs::read_to_string(dir.join("fortaleza_page2.html")).unwrap(),
        second
    );
    assert!(!dir.join("fortaleza_page3.html").exists());

    // a kept page can be re-extracted offline
    let extractor = ListingExtractor::new().unwrap();
    assert_eq!(extractor.extract(&kept).listings.len(), 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn combination_pages_are_named_after_the_combination() {
    let dir = std::env::temp_dir().join(format!(
        "combo_pages_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let mut cfg = crawl_config();
    cfg.page_dump_dir = Some(dir.clone());
    let scraper = ListingsScraper::new(
        FakeFetcher::new(vec![Ok(page(&[card(1)], 1, NextButton::Disabled))]),
        cfg,
    )
    .unwrap();
    let combination = SearchCombination::new(
        "aluguel",
        "apartamento_residencial",
        &location("Ceará", "CE", "Fortaleza"),
    );

    scraper.crawl(&combination).unwrap();

    assert!(dir
        .join("aluguel_apartamento_residencial_ce+fortaleza_page1.html")
        .exists());
    std::fs::remove_dir_all(&dir).ok();
}
