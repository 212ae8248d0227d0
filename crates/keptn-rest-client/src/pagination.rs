//! Cursor-driven listing of multi-page endpoints

use keptn_api_contract::{is_last_page, page_key_value, PageEnvelope, NEXT_PAGE_KEY};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::client::RestClient;
use crate::error::{RestClientError, RestClientResult};
use crate::response::Outcome;

/// Fetch every page of a listing and concatenate the items in arrival order.
///
/// The first request goes to `base` unchanged; later requests add the
/// `nextPageKey` returned by the previous page. Listing stops at a `""` or `"0"`
/// cursor, or once `page_limit` is non-zero and the numeric cursor reaches it.
/// Any failure aborts the whole listing, including a page with an empty body.
pub async fn fetch_all<P: PageEnvelope>(
    client: &RestClient,
    cancel: &CancellationToken,
    base: &Url,
    page_limit: u32,
) -> RestClientResult<Vec<P::Item>> {
    let mut items = Vec::new();
    let mut next_page_key = String::new();
    let mut pages = 0usize;

    loop {
        let url = page_url(base, &next_page_key);
        let page: P = match client.get(cancel, url).await? {
            Outcome::Value(page) => page,
            Outcome::Empty => serde_json::from_slice(&[]).map_err(|source| {
                RestClientError::Decode {
                    source,
                    body: String::new(),
                }
            })?,
        };
        pages += 1;

        let key = page.next_page_key().to_string();
        items.extend(page.into_items());
        debug!(pages, items = items.len(), next_page_key = %key, "received page");

        if is_last_page(&key) {
            break;
        }
        if page_limit > 0 && page_key_value(&key) >= u64::from(page_limit) {
            break;
        }
        next_page_key = key;
    }

    Ok(items)
}

fn page_url(base: &Url, next_page_key: &str) -> Url {
    let mut url = base.clone();
    if next_page_key.is_empty() {
        return url;
    }

    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != NEXT_PAGE_KEY)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(NEXT_PAGE_KEY, next_page_key);
    url
}
