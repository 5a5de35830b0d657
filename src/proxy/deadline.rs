//! Deadline enforcement for streamed bodies.
//!
//! The upstream timeout is a budget for the whole exchange, not just for
//! the response head. [`DeadlineBody`] wraps a body and fails it once the
//! deadline passes, which makes hyper abort the connection it is being
//! read from or written to and drop the wrapped body.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use hyper::body::{Body as HttpBody, Bytes, Frame, SizeHint};
use tokio::time::{Instant, Sleep};

use crate::error::RelayError;

pub struct DeadlineBody {
    inner: Body,
    sleep: Pin<Box<Sleep>>,
    budget: Duration,
    expired: bool,
}

impl DeadlineBody {
    #[must_use]
    pub fn new(inner: Body, deadline: Instant, budget: Duration) -> Self {
        Self {
            inner,
            sleep: Box::pin(tokio::time::sleep_until(deadline)),
            budget,
            expired: false,
        }
    }

    /// Wrap `body` and erase the wrapper back into an axum [`Body`].
    #[must_use]
    pub fn wrap(body: Body, deadline: Instant, budget: Duration) -> Body {
        Body::new(Self::new(body, deadline, budget))
    }
}

impl HttpBody for DeadlineBody {
    type Data = Bytes;
    type Error = axum::BoxError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        if this.expired {
            return Poll::Ready(None);
        }

        // Checked before the inner body so a steady trickle cannot outlive the deadline.
        if this.sleep.as_mut().poll(cx).is_ready() {
            this.expired = true;
            this.inner = Body::empty();
            return Poll::Ready(Some(Err(Box::new(RelayError::UpstreamTimeout {
                after: this.budget,
            }))));
        }

        Pin::new(&mut this.inner)
            .poll_frame(cx)
            .map(|frame| frame.map(|result| result.map_err(Into::into)))
    }

    fn is_end_stream(&self) -> bool {
        self.expired || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn next_frame(body: &mut DeadlineBody) -> Option<Result<Frame<Bytes>, axum::BoxError>> {
        std::future::poll_fn(|cx| Pin::new(&mut *body).poll_frame(cx)).await
    }

    #[tokio::test]
    async fn passes_frames_through_before_the_deadline() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut body = DeadlineBody::new(Body::from("hello"), deadline, Duration::from_secs(5));

        let frame = next_frame(&mut body).await.unwrap().unwrap();
        assert_eq!(frame.into_data().unwrap(), "hello");
        assert!(next_frame(&mut body).await.is_none());
    }

    #[tokio::test]
    async fn stalled_body_fails_at_the_deadline() {
        let budget = Duration::from_millis(50);
        let stalled = Body::new(StalledBody);
        let mut body = DeadlineBody::new(stalled, Instant::now() + budget, budget);

        let err = tokio::time::timeout(Duration::from_secs(5), next_frame(&mut body))
            .await
            .expect("deadline should end the read")
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RelayError>(),
            Some(RelayError::UpstreamTimeout { after }) if *after == budget
        ));
        assert!(body.is_end_stream());
        assert!(next_frame(&mut body).await.is_none());
    }

    struct StalledBody;

    impl HttpBody for StalledBody {
        type Data = Bytes;
        type Error = std::convert::Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
            Poll::Pending
        }
    }
}
