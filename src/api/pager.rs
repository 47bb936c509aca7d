use super::ApiError;
use crate::catalog::{Catalog, DetailedPage, Item};
use futures::stream::{self, StreamExt};

/// Fetches one summary page and enriches every entry with its full detail.
///
/// All detail requests for the page are issued at once and joined. Results
/// keep the summary order. An entry whose detail request fails is dropped and
/// logged; it never fails the page.
///
/// # Errors
///
/// Only a failure of the summary request itself is returned.
pub async fn fetch_page_with_details(
    catalog: &dyn Catalog,
    limit: usize,
    offset: usize,
) -> Result<DetailedPage, ApiError> {
    let page = catalog.fetch_page(limit, offset).await?;
    let has_more = page.has_more;
    if page.results.is_empty() {
        return Ok(DetailedPage {
            items: Vec::new(),
            has_more,
        });
    }

    let requested = page.results.len();
    let details: Vec<Option<Item>> = stream::iter(page.results)
        .map(|summary| async move {
            match catalog.fetch_detail(&summary.name).await {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(
                        name = %summary.name,
                        error = %e,
                        "Dropping entry whose detail failed to load"
                    );
                    None
                }
            }
        })
        // Ordered buffering with room for the whole page: fully concurrent, summary order kept
        .buffered(requested)
        .collect()
        .await;

    let items: Vec<Item> = details.into_iter().flatten().collect();
    tracing::debug!(
        offset,
        requested,
        loaded = items.len(),
        has_more,
        "Enriched summary page"
    );

    Ok(DetailedPage { items, has_more })
}
