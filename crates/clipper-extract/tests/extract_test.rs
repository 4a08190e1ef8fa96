use async_trait::async_trait;
use clipper_browser::{BrowserActions, BrowserCookie, BrowserError, Result as BrowserResult};
use clipper_core::{Category, CrawlConfig, SearchTerm};
use clipper_extract::{
    extractors_for, CategoryExtractor, CategoryRules, PageSettler, Record, RuleSet,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const ORIGIN: &str = "https://site";

const SAMPLE_VIDEO: &str = r#"
    <html><body>
        <div class="x1yztbdb">
            <h2><a href="/watch/?v=1">Sample</a></h2>
        </div>
    </body></html>
"#;

/// Scripted results page
#[derive(Default)]
struct FakePage {
    html: String,
    results_present: bool,
    navigation_fails: bool,
    heights: Mutex<VecDeque<u64>>,
    height_fails: bool,
    visited: Mutex<Vec<String>>,
    scrolls: AtomicUsize,
    content_reads: AtomicUsize,
}

impl FakePage {
    fn with_results(html: &str) -> Self {
        Self {
            html: html.to_string(),
            results_present: true,
            heights: Mutex::new(VecDeque::from(vec![800, 800])),
            ..Self::default()
        }
    }

    fn with_heights(heights: &[u64]) -> Self {
        Self {
            heights: Mutex::new(heights.iter().copied().collect()),
            ..Self::default()
        }
    }

    fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserActions for FakePage {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        if self.navigation_fails {
            return Err(BrowserError::NavigationError("net::ERR_ABORTED".into()));
        }
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn wait_for_navigation(&self) -> BrowserResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout_ms: u64) -> BrowserResult<()> {
        if self.results_present {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    async fn exists(&self, _selector: &str) -> BrowserResult<bool> {
        Ok(self.results_present)
    }

    async fn type_text(&self, _s: &str, _v: &str, _delay: Duration) -> BrowserResult<()> {
        Ok(())
    }

    async fn click(&self, _selector: &str) -> BrowserResult<()> {
        Ok(())
    }

    async fn body_text(&self) -> BrowserResult<String> {
        Ok(String::new())
    }

    async fn content(&self) -> BrowserResult<String> {
        self.content_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }

    async fn scroll_height(&self) -> BrowserResult<u64> {
        if self.height_fails {
            return Err(BrowserError::ScriptError("context destroyed".into()));
        }
        let mut heights = self.heights.lock().unwrap();
        // The last scripted height repeats forever
        let height = if heights.len() > 1 {
            heights.pop_front().unwrap_or_default()
        } else {
            heights.front().copied().unwrap_or_default()
        };
        Ok(height)
    }

    async fn scroll_to_bottom(&self) -> BrowserResult<()> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn cookies(&self) -> BrowserResult<Vec<BrowserCookie>> {
        Ok(Vec::new())
    }

    async fn set_cookies(&self, _cookies: &[BrowserCookie]) -> BrowserResult<()> {
        Ok(())
    }

    async fn close(&self) -> BrowserResult<()> {
        Ok(())
    }
}

fn crawl_config() -> CrawlConfig {
    CrawlConfig {
        settle_rounds: 3,
        settle_dwell_ms: 5_000,
        post_navigation_delay_ms: 5_000,
        results_timeout_ms: 10_000,
        ..CrawlConfig::default()
    }
}

fn term(raw: &str) -> SearchTerm {
    SearchTerm::new(raw).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_settle_stops_when_height_is_stable() {
    let page = FakePage::with_heights(&[1000, 1000]);
    let settler = PageSettler::new(3, Duration::from_secs(5));

    let scrolls = settler.settle(&page).await;

    assert_eq!(scrolls, 1);
    assert_eq!(page.scrolls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_settle_is_bounded_on_endless_feed() {
    let page = FakePage::with_heights(&[1000, 2000, 3000, 4000, 5000, 6000]);
    let settler = PageSettler::new(3, Duration::from_secs(5));

    let started = tokio::time::Instant::now();
    let scrolls = settler.settle(&page).await;

    assert_eq!(scrolls, 3);
    assert_eq!(started.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_settle_gives_up_quietly_on_browser_error() {
    let page = FakePage {
        height_fails: true,
        ..FakePage::default()
    };
    let settler = PageSettler::new(3, Duration::from_secs(5));

    assert_eq!(settler.settle(&page).await, 0);
    assert_eq!(page.scrolls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_extract_video_with_defaults() {
    let page = FakePage::with_results(SAMPLE_VIDEO);
    let extractor =
        CategoryExtractor::new(Category::Video, CategoryRules::videos(), ORIGIN, &crawl_config());

    let records = extractor.extract(&term("termA"), &page).await;

    assert_eq!(records.len(), 1);
    let Record::Video(video) = &records[0] else {
        panic!("expected a video record");
    };
    assert_eq!(video.title, "Sample");
    assert_eq!(video.duration, "Unknown");
    assert_eq!(video.views, 0);
    assert_eq!(video.post_url, "https://site/watch/?v=1");

    let visited = page.visited.lock().unwrap().clone();
    assert_eq!(visited.len(), 1);
    assert!(visited[0].starts_with("https://site/search/videos/?q=termA"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_results_marker_yields_nothing() {
    let page = FakePage {
        html: SAMPLE_VIDEO.to_string(),
        ..FakePage::default()
    };
    let extractor =
        CategoryExtractor::new(Category::Video, CategoryRules::videos(), ORIGIN, &crawl_config());

    let records = extractor.extract(&term("termA"), &page).await;

    assert!(records.is_empty());
    assert_eq!(page.content_reads.load(Ordering::SeqCst), 0);
    assert_eq!(page.scrolls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_yields_nothing() {
    let page = FakePage {
        navigation_fails: true,
        results_present: true,
        html: SAMPLE_VIDEO.to_string(),
        ..FakePage::default()
    };
    let extractor =
        CategoryExtractor::new(Category::Video, CategoryRules::videos(), ORIGIN, &crawl_config());

    assert!(extractor.extract(&term("termA"), &page).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_namespaced_term_searches_query_only() {
    let page = FakePage::with_results("<html></html>");
    let extractor =
        CategoryExtractor::new(Category::Page, CategoryRules::pages(), ORIGIN, &crawl_config());

    let records = extractor.extract(&term("channel:zee zoo"), &page).await;

    assert!(records.is_empty());
    let visited = page.visited.lock().unwrap().clone();
    assert_eq!(visited, vec!["https://site/search/pages/?q=zee%20zoo"]);
}

#[test]
fn test_extractors_follow_priority_order() {
    let extractors = extractors_for(&RuleSet::default(), ORIGIN, &crawl_config());
    let order: Vec<Category> = extractors.iter().map(CategoryExtractor::category).collect();
    assert_eq!(order, vec![Category::Page, Category::Video, Category::Post]);
}
