//! Batch fan-out: one concurrent fetch per URL, joined into a partitioned response

use futures_util::future::join_all;

use shared::{InvokeRequest, InvokeResponse, UrlOutcome};
use crate::traits::UrlFetcher;

/// Fetch every URL of the request concurrently and partition the outcomes
///
/// The response accounts for each input URL exactly once, either in
/// `url_list` or in `error_url_list`.
pub async fn run_batch<F>(fetcher: &F, request: &InvokeRequest) -> InvokeResponse
where
    F: UrlFetcher + ?Sized,
{
    let fetches = request.urls.iter().map(|url| async move {
        let outcome = fetcher.fetch(url, &request.headers).await;
        UrlOutcome::new(url.clone(), outcome)
    });

    InvokeResponse::from_outcomes(join_all(fetches).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockUrlFetcher;
    use shared::FetchOutcome;

    #[tokio::test]
    async fn test_every_url_lands_in_exactly_one_list() {
        let mut fetcher = MockUrlFetcher::new();
        fetcher.expect_fetch().times(4).returning(|url, _| {
            if url.contains("down") {
                FetchOutcome::Error("connection refused".to_string())
            } else if url.contains("missing") {
                FetchOutcome::Success(404)
            } else {
                FetchOutcome::Success(200)
            }
        });

        let request = InvokeRequest::get(
            vec![
                "http://up.test".to_string(),
                "http://down.test".to_string(),
                "http://missing.test".to_string(),
                "http://down-too.test".to_string(),
            ],
            Default::default(),
        );

        let response = run_batch(&fetcher, &request).await;

        assert!(response.is_well_formed());
        assert_eq!(response.len(), 4);
        assert_eq!(response.url_list, vec!["http://up.test", "http://missing.test"]);
        assert_eq!(response.status_code_list, vec![200, 404]);
        assert_eq!(response.error_url_list, vec!["http://down.test", "http://down-too.test"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = MockUrlFetcher::new();
        let request = InvokeRequest::get(Vec::new(), Default::default());

        let response = run_batch(&fetcher, &request).await;
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_headers_forwarded_to_every_fetch() {
        let mut fetcher = MockUrlFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, headers| headers.get("accept-language").map(String::as_str) == Some("en"))
            .times(2)
            .returning(|_, _| FetchOutcome::Success(200));

        let mut headers = std::collections::HashMap::new();
        headers.insert("accept-language".to_string(), "en".to_string());
        let request = InvokeRequest::get(vec!["http://a.test".into(), "http://b.test".into()], headers);

        let response = run_batch(&fetcher, &request).await;
        assert_eq!(response.url_list.len(), 2);
    }
}
