// scraper.rs
use crate::config::{BASE_URL, PAGE_DELAY, REQUEST_TIMEOUT, USER_AGENT};
use crate::events::{EventSink, PipelineEvent};
use crate::scraper::extract::ListingExtractor;
use crate::scraper::models::{PageOutcome, RawListing};
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Anything that can hand back the markup of one index page.
pub trait PageSource {
    fn fetch_page(&self, page: u32) -> PageOutcome;
}

/// Fetches index pages from the live site. One attempt per page.
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ScraperError> {
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::Config(e.to_string()))?;

        let mut builder = Client::builder().user_agent(USER_AGENT).timeout(REQUEST_TIMEOUT);
        if matches!(base_url.host_str(), Some("127.0.0.1" | "localhost")) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }

    fn try_fetch(&self, page: u32) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(self.page_url(page))
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Status(status.as_u16()));
        }

        resp.text()
            .map_err(|e| ScraperError::Network(e.to_string()))
    }
}

impl PageSource for HttpFetcher {
    fn fetch_page(&self, page: u32) -> PageOutcome {
        match self.try_fetch(page) {
            Ok(html) => PageOutcome::Fetched(html),
            Err(e) => PageOutcome::Unavailable(e.to_string()),
        }
    }
}

/// Walks a page range and gathers every listing it can find.
pub struct Collector<'a, S: PageSource> {
    source: &'a S,
    extractor: &'a ListingExtractor,
    delay: Duration,
}

impl<'a, S: PageSource> Collector<'a, S> {
    pub fn new(source: &'a S, extractor: &'a ListingExtractor) -> Self {
        Self {
            source,
            extractor,
            delay: PAGE_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Pages are visited in ascending order; unavailable pages are skipped.
    /// Sleeps between requests, never after the last one.
    pub fn collect(&self, start_page: u32, end_page: u32, sink: &dyn EventSink) -> Vec<RawListing> {
        let mut listings = Vec::new();
        let mut pages_read = 0;

        for page in start_page..=end_page {
            match self.source.fetch_page(page) {
                PageOutcome::Fetched(html) => {
                    sink.emit(&PipelineEvent::PageFetched {
                        page,
                        bytes: html.len(),
                    });
                    let found = self.extractor.extract_page(&html);
                    sink.emit(&PipelineEvent::PageParsed {
                        page,
                        listings: found.len(),
                    });
                    listings.extend(found);
                    pages_read += 1;
                }
                PageOutcome::Unavailable(reason) => {
                    sink.emit(&PipelineEvent::PageSkipped { page, reason });
                }
            }

            if page < end_page && !self.delay.is_zero() {
                sink.emit(&PipelineEvent::PageDelay {
                    after_page: page,
                    millis: self.delay.as_millis() as u64,
                });
                std::thread::sleep(self.delay);
            }
        }

        sink.emit(&PipelineEvent::ScrapeCompleted {
            pages: pages_read,
            listings: listings.len(),
        });

        listings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListingMarkers;
    use crate::events::MemorySink;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    /// Answers exactly one request with `response` and hands back the request head.
    fn serve_once(response: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            head
        });

        (format!("http://{addr}/houses-for-sale"), handle)
    }

    struct Pages(Vec<u32>);

    impl PageSource for Pages {
        fn fetch_page(&self, page: u32) -> PageOutcome {
            if self.0.contains(&page) {
                PageOutcome::Fetched("<html></html>".to_string())
            } else {
                PageOutcome::Unavailable("missing".to_string())
            }
        }
    }

    #[test]
    fn page_url_sets_page_query() {
        let fetcher = HttpFetcher::new().unwrap();
        assert_eq!(
            fetcher.page_url(3).as_str(),
            "https://www.buyrentkenya.com/houses-for-sale?page=3"
        );
    }

    #[test]
    fn bad_base_url_is_a_config_error() {
        assert!(matches!(
            HttpFetcher::with_base_url("not a url"),
            Err(ScraperError::Config(_))
        ));
    }

    #[test]
    fn success_status_returns_body_and_sends_identity() {
        let body = "<html>ok</html>";
        let (base, server) = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ));

        let fetcher = HttpFetcher::with_base_url(&base).unwrap();
        assert_eq!(fetcher.fetch_page(2), PageOutcome::Fetched(body.to_string()));

        let head = server.join().unwrap();
        assert!(head.starts_with("GET /houses-for-sale?page=2 HTTP/1.1"), "{head}");
        let expected = format!("user-agent: {}", USER_AGENT.to_lowercase());
        assert!(head.to_lowercase().contains(&expected), "{head}");
    }

    #[test]
    fn error_status_is_unavailable() {
        let (base, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        );

        let fetcher = HttpFetcher::with_base_url(&base).unwrap();
        assert_eq!(
            fetcher.fetch_page(1),
            PageOutcome::Unavailable("HTTP status 503".to_string())
        );
        server.join().unwrap();
    }

    #[test]
    fn closed_port_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::with_base_url(&format!("http://{addr}/houses-for-sale")).unwrap();
        assert!(matches!(fetcher.fetch_page(1), PageOutcome::Unavailable(_)));
    }

    #[test]
    fn pauses_between_pages_but_not_after_last() {
        let extractor = ListingExtractor::new(&ListingMarkers::default()).unwrap();
        let source = Pages(vec![1, 3]);
        let sink = MemorySink::new();
        let delay = Duration::from_millis(5);

        let started = Instant::now();
        Collector::new(&source, &extractor)
            .with_delay(delay)
            .collect(1, 3, &sink);
        assert!(started.elapsed() >= delay * 2);

        let pauses: Vec<u32> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::PageDelay { after_page, .. } => Some(after_page),
                _ => None,
            })
            .collect();
        assert_eq!(pauses, vec![1, 2]);
    }

    #[test]
    fn single_page_never_pauses() {
        let extractor = ListingExtractor::new(&ListingMarkers::default()).unwrap();
        let sink = MemorySink::new();

        Collector::new(&Pages(vec![1]), &extractor)
            .with_delay(Duration::from_millis(5))
            .collect(1, 1, &sink);

        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::PageDelay { .. })));
    }
}
