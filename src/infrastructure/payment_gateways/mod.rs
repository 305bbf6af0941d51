pub mod orange_money;
pub mod signature;
pub mod wave;

use serde::de::DeserializeOwned;
use tracing::{error, warn};

/// Reads a checkout answer. A non-2xx status or an unreadable body is a refusal
/// (`None`), not a transport failure.
pub(crate) async fn read_checkout_answer<T>(
    resp: reqwest::Response,
    provider: &str,
    context: &str,
) -> Option<T>
where
    T: DeserializeOwned,
{
    let status = resp.status();
    if !status.is_success() {
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            provider = %provider,
            response_body = %body,
            context = %context,
            "payment gateway request failed"
        );
        return None;
    }

    match resp.json::<T>().await {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(provider = %provider, context = %context, error = %err, "payment gateway answer is not valid json");
            None
        }
    }
}
