//! Body wrappers that count data bytes as they stream past.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Buf;
use http_body::{Body, Frame, SizeHint};
use httpmeter_core::Summary;
use pin_project_lite::pin_project;

/// Bytes seen by a [`CountingBody`], shared with whoever reads the result.
#[derive(Debug, Default)]
pub struct BodyTally {
    bytes: AtomicU64,
    complete: AtomicBool,
}

impl BodyTally {
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Acquire)
    }

    /// True once the wrapped body reported end of stream.
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    fn add(&self, n: u64) {
        self.bytes.fetch_add(n, Ordering::AcqRel);
    }

    fn finish(&self) {
        self.complete.store(true, Ordering::Release);
    }
}

/// Observes the tally into a summary when dropped.
struct ObserveOnDrop {
    tally: Arc<BodyTally>,
    summary: Arc<Summary>,
}

impl Drop for ObserveOnDrop {
    fn drop(&mut self) {
        self.summary.observe(self.tally.bytes() as f64);
    }
}

pin_project! {
    /// Pass-through body that counts data frame bytes.
    ///
    /// Frames are forwarded untouched; only their lengths are recorded.
    pub struct CountingBody<B> {
        #[pin]
        inner: B,
        tally: Arc<BodyTally>,
        on_drop: Option<ObserveOnDrop>,
    }
}

impl<B> CountingBody<B> {
    pub fn new(inner: B) -> (Self, Arc<BodyTally>) {
        let tally = Arc::new(BodyTally::default());
        let body = Self {
            inner,
            tally: Arc::clone(&tally),
            on_drop: None,
        };
        (body, tally)
    }

    /// Count the body and observe the total into `summary` once the body is
    /// dropped, whether it finished streaming or the client went away.
    pub fn observed(inner: B, summary: Arc<Summary>) -> Self {
        let tally = Arc::new(BodyTally::default());
        Self {
            inner,
            tally: Arc::clone(&tally),
            on_drop: Some(ObserveOnDrop { tally, summary }),
        }
    }
}

impl<B: Body> Body for CountingBody<B> {
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();
        match this.inner.as_mut().poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.tally.add(data.remaining() as u64);
                }
                if this.inner.is_end_stream() {
                    this.tally.finish();
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(None) => {
                this.tally.finish();
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
