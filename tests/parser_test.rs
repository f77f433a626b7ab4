use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rs_article_parser::{
    Error, ExtractorRegistry, FetchError, FetchedPage, Fetcher, FieldRules, ParseOptions, Parser, SelectionRule,
};

/// Serves pages from memory and counts fetches.
#[derive(Clone, Default)]
struct MemoryFetcher {
    pages: Arc<HashMap<String, FetchedPage>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryFetcher {
    fn new(pages: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, html)| (url, FetchedPage::html(html)))
                    .collect(),
            ),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_page(url: &str, page: FetchedPage) -> Self {
        Self {
            pages: Arc::new(HashMap::from([(url.to_string(), page)])),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> Result<FetchedPage, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(format!("resource returned a response status code of 404 for {url}")))
    }
}

const BASE: &str = "https://longreads.example.org/features/river-journey";

fn page_url(n: usize) -> String {
    if n == 1 {
        BASE.to_string()
    } else {
        format!("{BASE}/{n}")
    }
}

fn chapter(n: usize, next: Option<&str>) -> String {
    let link = next.map_or_else(String::new, |href| format!(r#"<link rel="next" href="{href}">"#));
    format!(
        r#"<html><head><title>The river journey</title>{link}</head><body>
        <article><h1>The river journey</h1>
        <p>Chapter {n} begins where the water slows, and the banks widen into reed beds, mud flats, and old
           wooden jetties that have not seen a boat in years.</p>
        <p>We camped on a gravel bar for the night, listening to the herons, the wind in the willows, and
           the distant sound of a weir further downstream.</p>
        </article></body></html>"#
    )
}

fn chain(pages: usize) -> MemoryFetcher {
    MemoryFetcher::new((1..=pages).map(|n| {
        let next = (n < pages).then(|| page_url(n + 1));
        (page_url(n), chapter(n, next.as_deref()))
    }))
}

#[tokio::test]
async fn single_page_article() {
    let fetcher = chain(1);
    let parser = Parser::new(fetcher.clone());

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.title.as_deref(), Some("The river journey"));
            assert_eq!(article.total_pages, 1);
            assert_eq!(article.pages_rendered, 1);
            assert!(article.content.is_some_and(|c| c.contains("Chapter 1 begins")));
            assert_eq!(fetcher.fetch_count(), 1);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn pagination_merges_pages_in_order() {
    let fetcher = chain(3);
    let parser = Parser::new(fetcher.clone());

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.total_pages, 3);
            assert_eq!(article.pages_rendered, 3);
            let content = article.content.unwrap_or_default();
            let page2 = content.find("<h4>Page 2</h4>").unwrap_or(usize::MAX);
            let page3 = content.find("<h4>Page 3</h4>").unwrap_or(usize::MAX);
            assert!(content.find("Chapter 1 begins").unwrap_or(usize::MAX) < page2);
            assert!(page2 < page3 && page3 < usize::MAX);
            assert!(content.contains("Chapter 3 begins"));
            assert!(article.word_count > 3 * 40);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn pagination_stops_at_page_cap() {
    let fetcher = chain(40);
    let parser = Parser::new(fetcher.clone());

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.total_pages, 26);
            assert_eq!(fetcher.fetch_count(), 26);
            let content = article.content.unwrap_or_default();
            assert!(content.contains("<h4>Page 26</h4>"));
            assert!(!content.contains("Chapter 27 begins"));
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn pagination_cycle_terminates() {
    let fetcher = MemoryFetcher::new([
        (page_url(1), chapter(1, Some(&page_url(2)))),
        (page_url(2), chapter(2, Some(&page_url(3)))),
        (page_url(3), chapter(3, Some(&page_url(2)))),
    ]);
    let parser = Parser::new(fetcher.clone());

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.total_pages, 3);
            assert_eq!(fetcher.fetch_count(), 3);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn failed_next_page_keeps_collected_content() {
    let fetcher = MemoryFetcher::new([
        (page_url(1), chapter(1, Some(&page_url(2)))),
        (page_url(2), chapter(2, Some(&page_url(3)))),
    ]);
    let parser = Parser::new(fetcher.clone());

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.total_pages, 2);
            assert!(article.content.is_some_and(|c| c.contains("Chapter 2 begins")));
            assert_eq!(fetcher.fetch_count(), 3);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn fetch_all_pages_disabled() {
    let fetcher = chain(5);
    let parser = Parser::new(fetcher.clone()).with_options(ParseOptions {
        fetch_all_pages: false,
        ..ParseOptions::default()
    });

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.total_pages, 1);
            assert_eq!(article.next_page_url.as_deref(), Some(page_url(2).as_str()));
            assert_eq!(fetcher.fetch_count(), 1);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn parse_html_skips_first_fetch() {
    let fetcher = chain(2);
    let parser = Parser::new(fetcher.clone());

    match parser.parse_html(BASE, &chapter(1, None)).await {
        Ok(article) => {
            assert_eq!(article.total_pages, 1);
            assert_eq!(fetcher.fetch_count(), 0);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn custom_registry_and_extend_fields() {
    let mut registry = ExtractorRegistry::new();
    registry.register(rs_article_parser::ExtractionRuleSet {
        title: Some(FieldRules::new([SelectionRule::exactly_one("article h1")])),
        ..rs_article_parser::ExtractionRuleSet::new("example.org")
    });
    let options = ParseOptions {
        fetch_all_pages: false,
        extend: [(
            "chapter_count".to_string(),
            FieldRules::new([SelectionRule::multi_array("article p")]),
        )]
        .into(),
        ..ParseOptions::default()
    };
    let parser = Parser::new(chain(1)).with_registry(registry).with_options(options);

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.title.as_deref(), Some("The river journey"));
            match article.extended.get("chapter_count") {
                Some(rs_article_parser::SelectedValue::Multiple(paragraphs)) => assert_eq!(paragraphs.len(), 2),
                other => panic!("expected two paragraphs, got {other:?}"),
            }
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn fallback_disabled_leaves_unruled_fields_empty() {
    let mut registry = ExtractorRegistry::new();
    registry.register(rs_article_parser::ExtractionRuleSet {
        title: Some(FieldRules::new([SelectionRule::exactly_one("article h1")])),
        ..rs_article_parser::ExtractionRuleSet::new("longreads.example.org")
    });
    let parser = Parser::new(chain(1)).with_registry(registry).with_options(ParseOptions {
        fallback: false,
        ..ParseOptions::default()
    });

    match parser.parse(BASE).await {
        Ok(article) => {
            assert_eq!(article.title.as_deref(), Some("The river journey"));
            assert_eq!(article.content, None);
            assert_eq!(article.word_count, 0);
            assert_eq!(article.url, "");
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[tokio::test]
async fn first_page_errors_surface() {
    let parser = Parser::new(MemoryFetcher::default());
    assert!(matches!(parser.parse("not a url").await, Err(Error::InvalidUrl(_))));
    assert!(matches!(parser.parse(BASE).await, Err(Error::Fetch(_))));

    let pdf = FetchedPage {
        body: b"%PDF-1.7".to_vec(),
        headers: vec![("Content-Type".to_string(), "application/pdf".to_string())],
    };
    let parser = Parser::new(MemoryFetcher::with_page(BASE, pdf));
    match parser.parse(BASE).await {
        Ok(article) => panic!("expected an error, got {article:?}"),
        Err(err) => assert!(err.is_malformed_input()),
    }
}
