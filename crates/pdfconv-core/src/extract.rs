//! Page-by-page transcript extraction.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tracing::{debug, info};

use crate::error::{ConvertError, ExtractionError, Result};
use crate::pdf::{
    EngineKind, LopdfEngine, PdfDocument, PdfEngine, PdfExtractEngine, PdfPage, TextFragment,
};

/// Separator appended after every page of a transcript.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Separator placed between the fragments of one page.
pub const FRAGMENT_SEPARATOR: &str = " ";

/// Cooperative cancellation flag shared between a caller and an extraction.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the extraction stop at its next await point.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_aborted() {
            Err(ConvertError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Progress report emitted after each page is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// Page just read (1-indexed).
    pub page: u32,
    /// Total pages in the document.
    pub total: u32,
}

type ProgressFn = Box<dyn Fn(PageProgress)>;

/// Future awaited between pages. Front ends with their own event loop supply
/// one that resumes on the loop's next turn.
pub type PauseFn = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()>>>>;

/// Suspend once, letting the executor run whatever else is queued.
///
/// Engines finish their work without suspending, so the page loop has to
/// yield on its own for a cancel request to be seen between pages.
pub fn yield_now() -> impl Future<Output = ()> {
    YieldNow { yielded: false }
}

struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Extracts a plain-text transcript from PDF bytes through a [`PdfEngine`].
pub struct Extractor<E> {
    engine: E,
    signal: AbortSignal,
    on_page: Option<ProgressFn>,
    pause: Option<PauseFn>,
}

impl<E: PdfEngine> Extractor<E> {
    /// Create a new extractor over the given engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            signal: AbortSignal::new(),
            on_page: None,
            pause: None,
        }
    }

    /// Stop extracting when `signal` is aborted.
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = signal;
        self
    }

    /// Call `f` after each page has been read.
    pub fn on_page(mut self, f: impl Fn(PageProgress) + 'static) -> Self {
        self.on_page = Some(Box::new(f));
        self
    }

    /// Await `f()` after each page instead of [`yield_now`].
    pub fn with_pause(
        mut self,
        f: impl Fn() -> Pin<Box<dyn Future<Output = ()>>> + 'static,
    ) -> Self {
        self.pause = Some(Box::new(f));
        self
    }

    /// Extract the transcript of a whole document.
    ///
    /// Pages are read strictly in ascending order. Any failure aborts the run
    /// and no partial transcript is returned.
    pub async fn extract(&self, data: &[u8]) -> Result<String> {
        self.signal.check()?;

        let document = self
            .engine
            .open(data)
            .await
            .map_err(ExtractionError::Open)?;

        let total = document.page_count();
        debug!("PDF loaded. Number of pages: {}", total);

        let mut pages = Vec::with_capacity(total as usize);
        for number in 1..=total {
            self.signal.check()?;

            let page = document
                .page(number)
                .await
                .map_err(|source| ExtractionError::Page { page: number, source })?;
            let fragments = page
                .text_fragments()
                .await
                .map_err(|source| ExtractionError::TextContent { page: number, source })?;

            pages.push(join_fragments(&fragments));
            debug!("Page {} processed", number);

            if let Some(on_page) = &self.on_page {
                on_page(PageProgress { page: number, total });
            }

            match &self.pause {
                Some(pause) => pause().await,
                None => yield_now().await,
            }
        }

        self.signal.check()?;

        let transcript = pages_to_transcript(&pages);
        info!("Extracted {} chars from {} pages", transcript.len(), total);
        Ok(transcript)
    }
}

/// Join the fragments of one page with single spaces, keeping engine order.
pub fn join_fragments(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR)
}

/// Concatenate page texts, each followed by a blank line, then trim the ends.
pub fn pages_to_transcript<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push_str(PAGE_SEPARATOR);
    }
    text.trim().to_string()
}

/// Extract a transcript with the engine selected by `kind`.
pub async fn extract_transcript(
    kind: EngineKind,
    data: &[u8],
    signal: AbortSignal,
) -> Result<String> {
    match kind {
        EngineKind::Lopdf => Extractor::new(LopdfEngine::new())
            .with_signal(signal)
            .extract(data)
            .await,
        EngineKind::PdfExtract => Extractor::new(PdfExtractEngine::new())
            .with_signal(signal)
            .extract(data)
            .await,
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory engine used by tests.

    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::error::PdfError;
    use crate::pdf::{PdfDocument, PdfEngine, PdfPage, Result, TextFragment};

    /// Page fixture: fragments, or a failure when fetching / reading text.
    #[derive(Clone)]
    pub enum MockPage {
        Text(Vec<&'static str>),
        MissingPage,
        BrokenText,
    }

    #[derive(Clone, Default)]
    pub struct MockEngine {
        pub pages: Vec<MockPage>,
        pub fail_open: bool,
        /// Page numbers fetched, in order.
        pub fetched: Rc<RefCell<Vec<u32>>>,
    }

    impl MockEngine {
        pub fn with_pages(pages: &[&[&'static str]]) -> Self {
            Self {
                pages: pages.iter().map(|p| MockPage::Text(p.to_vec())).collect(),
                ..Self::default()
            }
        }
    }

    pub struct MockDocument {
        engine: MockEngine,
    }

    pub struct MockTextPage {
        page: MockPage,
        number: u32,
    }

    impl PdfEngine for MockEngine {
        type Document = MockDocument;

        async fn open(&self, data: &[u8]) -> Result<MockDocument> {
            if self.fail_open || !data.starts_with(b"%PDF") {
                return Err(PdfError::Parse("Invalid PDF structure.".to_string()));
            }
            Ok(MockDocument {
                engine: self.clone(),
            })
        }
    }

    impl PdfDocument for MockDocument {
        type Page = MockTextPage;

        fn page_count(&self) -> u32 {
            self.engine.pages.len() as u32
        }

        async fn page(&self, number: u32) -> Result<MockTextPage> {
            self.engine.fetched.borrow_mut().push(number);
            match self.engine.pages.get((number - 1) as usize) {
                Some(MockPage::MissingPage) | None => Err(PdfError::InvalidPage(number)),
                Some(page) => Ok(MockTextPage {
                    page: page.clone(),
                    number,
                }),
            }
        }
    }

    impl PdfPage for MockTextPage {
        async fn text_fragments(&self) -> Result<Vec<TextFragment>> {
            match &self.page {
                MockPage::Text(fragments) => {
                    Ok(fragments.iter().map(|t| TextFragment::new(*t)).collect())
                }
                _ => Err(PdfError::TextContent(format!(
                    "bad content stream on page {}",
                    self.number
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::mock::{MockEngine, MockPage};
    use super::*;
    use pretty_assertions::assert_eq;

    const PDF: &[u8] = b"%PDF-1.7 fake";

    #[tokio::test]
    async fn test_two_pages_hello_world() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&["Hello"], &["World"]]));
        let transcript = extractor.extract(PDF).await.unwrap();
        assert_eq!(transcript, "Hello\n\nWorld");
    }

    #[tokio::test]
    async fn test_fragments_joined_with_spaces() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&["The", "quick", "fox"]]));
        assert_eq!(extractor.extract(PDF).await.unwrap(), "The quick fox");
    }

    #[tokio::test]
    async fn test_zero_pages_is_empty_transcript() {
        let extractor = Extractor::new(MockEngine::with_pages(&[]));
        assert_eq!(extractor.extract(PDF).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_interior_separator_count() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&["a"], &["b"], &["c"], &["d"]]));
        let transcript = extractor.extract(PDF).await.unwrap();
        assert_eq!(transcript.matches(PAGE_SEPARATOR).count(), 3);
        assert_eq!(transcript, transcript.trim());
    }

    #[tokio::test]
    async fn test_empty_page_keeps_its_separator() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&["a"], &[], &["c"]]));
        assert_eq!(extractor.extract(PDF).await.unwrap(), "a\n\n\n\nc");
    }

    #[tokio::test]
    async fn test_leading_and_trailing_empty_pages_trimmed() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&[], &["only"], &[]]));
        assert_eq!(extractor.extract(PDF).await.unwrap(), "only");
    }

    #[tokio::test]
    async fn test_pages_fetched_in_order() {
        let engine = MockEngine::with_pages(&[&["1"], &["2"], &["3"]]);
        let fetched = Rc::clone(&engine.fetched);
        Extractor::new(engine).extract(PDF).await.unwrap();
        assert_eq!(*fetched.borrow(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&["x", "y"], &["z"]]));
        let first = extractor.extract(PDF).await.unwrap();
        let second = extractor.extract(PDF).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_corrupted_bytes_fail_to_open() {
        let extractor = Extractor::new(MockEngine::with_pages(&[&["Hello"]]));
        let err = extractor.extract(b"garbage").await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Extraction(ExtractionError::Open(_))
        ));
        assert!(err.to_string().contains("Invalid PDF structure."));
    }

    #[tokio::test]
    async fn test_page_failure_aborts_whole_run() {
        let mut engine = MockEngine::with_pages(&[&["a"], &["b"], &["c"]]);
        engine.pages[1] = MockPage::MissingPage;
        let fetched = Rc::clone(&engine.fetched);

        let err = Extractor::new(engine).extract(PDF).await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Extraction(ExtractionError::Page { page: 2, .. })
        ));
        assert_eq!(*fetched.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_text_content_failure() {
        let mut engine = MockEngine::with_pages(&[&["a"]]);
        engine.pages[0] = MockPage::BrokenText;

        let err = Extractor::new(engine).extract(PDF).await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Extraction(ExtractionError::TextContent { page: 1, .. })
        ));
        assert!(err.to_string().contains("bad content stream on page 1"));
    }

    #[tokio::test]
    async fn test_aborted_before_start() {
        let signal = AbortSignal::new();
        signal.abort();
        let extractor = Extractor::new(MockEngine::with_pages(&[&["a"]])).with_signal(signal);
        assert!(matches!(
            extractor.extract(PDF).await,
            Err(ConvertError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_abort_between_pages_stops_fetching() {
        let engine = MockEngine::with_pages(&[&["a"], &["b"], &["c"]]);
        let fetched = Rc::clone(&engine.fetched);
        let signal = AbortSignal::new();
        let trip = signal.clone();

        let extractor = Extractor::new(engine)
            .with_signal(signal)
            .on_page(move |progress| {
                if progress.page == 1 {
                    trip.abort();
                }
            });

        assert!(matches!(
            extractor.extract(PDF).await,
            Err(ConvertError::Cancelled)
        ));
        assert_eq!(*fetched.borrow(), vec![1]);
    }

    #[tokio::test]
    async fn test_progress_reports_every_page() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let extractor = Extractor::new(MockEngine::with_pages(&[&["a"], &["b"]]))
            .on_page(move |progress| sink.borrow_mut().push(progress));

        extractor.extract(PDF).await.unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                PageProgress { page: 1, total: 2 },
                PageProgress { page: 2, total: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_spawned_abort_runs_between_pages() {
        let engine = MockEngine::with_pages(&[&["a"], &["b"], &["c"], &["d"]]);
        let fetched = Rc::clone(&engine.fetched);
        let signal = AbortSignal::new();
        let trip = signal.clone();

        tokio::spawn(async move { trip.abort() });
        let outcome = Extractor::new(engine).with_signal(signal).extract(PDF).await;

        assert!(matches!(outcome, Err(ConvertError::Cancelled)));
        assert_eq!(*fetched.borrow(), vec![1]);
    }

    #[tokio::test]
    async fn test_custom_pause_awaited_after_each_page() {
        let pauses = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&pauses);
        let extractor = Extractor::new(MockEngine::with_pages(&[&["a"], &["b"], &["c"]]))
            .with_pause(move || {
                *counter.borrow_mut() += 1;
                Box::pin(yield_now())
            });

        assert_eq!(extractor.extract(PDF).await.unwrap(), "a\n\nb\n\nc");
        assert_eq!(*pauses.borrow(), 3);
    }

    #[test]
    fn test_pages_to_transcript() {
        assert_eq!(pages_to_transcript(&["  Hello", "World  "]), "Hello\n\nWorld");
        assert_eq!(pages_to_transcript::<&str>(&[]), "");
    }
}
