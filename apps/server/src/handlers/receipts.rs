//! # Receipt Handlers
//!
//! Receipt parsing is best-effort by contract: the extractor never fails,
//! it just returns fewer items. Clients treat the result as a draft for
//! the user to correct.

use axum::Json;
use serde::Deserialize;
use tracing::info;

use tally_core::{extract_items, ExtractedReceipt};

use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ParseReceiptRequest {
    pub text: String,
}

/// POST /api/receipts/parse
pub async fn parse_receipt(
    Json(req): Json<ParseReceiptRequest>,
) -> ApiResult<Json<ExtractedReceipt>> {
    let extracted = extract_items(&req.text);
    info!(
        lines = req.text.lines().count(),
        items = extracted.items.len(),
        "receipt parsed"
    );
    Ok(Json(extracted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Money;

    #[tokio::test]
    async fn test_parse_receipt() {
        let req = ParseReceiptRequest {
            text: "Cafe Test\nEspresso 3.50\nCroissant 4.25\nTOTAL 7.75\n".to_string(),
        };

        let Json(extracted) = parse_receipt(Json(req)).await.unwrap();

        assert_eq!(extracted.items.len(), 2);
        assert_eq!(extracted.items[0].name, "Espresso");
        assert_eq!(extracted.items[0].unit_price, Money::from_minor(350));
        assert_eq!(extracted.total, Money::from_minor(775));
    }

    #[tokio::test]
    async fn test_parse_garbage_is_empty_not_error() {
        let req = ParseReceiptRequest {
            text: "%%% ??? \u{0000}".to_string(),
        };
        let Json(extracted) = parse_receipt(Json(req)).await.unwrap();
        assert!(extracted.items.is_empty());
    }
}
