//! Tunnelling for upgraded connections (`101 Switching Protocols`).

use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

/// Splice the client and upstream connections once both sides have
/// switched protocols. Runs until either side closes.
pub fn tunnel(client: OnUpgrade, upstream: OnUpgrade, request_id: String) {
    tokio::spawn(async move {
        let (client, upstream) = match tokio::try_join!(client, upstream) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "protocol upgrade failed");
                return;
            }
        };

        let mut client = TokioIo::new(client);
        let mut upstream = TokioIo::new(upstream);
        match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
            Ok((to_upstream, to_client)) => tracing::debug!(
                request_id = %request_id,
                to_upstream,
                to_client,
                "upgraded connection closed"
            ),
            Err(e) => tracing::debug!(
                request_id = %request_id,
                error = %e,
                "upgraded connection ended"
            ),
        }
    });
}
