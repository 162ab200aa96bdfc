pub mod engine;
pub mod event;
mod fallback;
mod parse;
mod prompt;
pub mod retry;

use thiserror::Error;
use tracing::{debug, warn};

use fitcheck_core::{GeneratedOutfit, PersonalizationFilters, SelectionSnapshot, UserProfile};

pub use engine::{GenerateError, GenerationClient};
pub use fallback::synthesize_fallback;
pub use parse::{parse_outfit, GENERIC_TIP};
pub use prompt::{build_prompt, event_prompt};

/// Successful responses shorter than this are treated as unusable. A floor,
/// not a law; tuned against observed model chatter.
pub const MIN_RESPONSE_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("select at least one top and one bottom before generating")]
    InsufficientSelection,
}

/// Run the full generation pipeline: validate the selection, build the
/// prompt, call the model, parse the response. Any client failure or parse
/// miss lands on the deterministic fallback — once the selection passes
/// validation, this always produces an outfit.
pub async fn generate_outfit(
    client: &GenerationClient,
    selection: &SelectionSnapshot,
    profile: Option<&UserProfile>,
    filters: &PersonalizationFilters,
) -> Result<GeneratedOutfit, SuggestError> {
    if !selection.has_minimum() {
        return Err(SuggestError::InsufficientSelection);
    }

    let prompt = build_prompt(selection, profile, filters);

    match client.generate(&prompt).await {
        Ok(raw) if raw.len() >= MIN_RESPONSE_LEN => {
            debug!(len = raw.len(), "model responded");
            if let Some(outfit) = parse_outfit(&raw, selection) {
                return Ok(outfit);
            }
            debug!("no parsable outfit line in response, using fallback");
        }
        Ok(_) => debug!("response below minimum length, using fallback"),
        Err(e) => warn!(error = %e, "generation failed, using fallback"),
    }

    Ok(synthesize_fallback(selection, profile, filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcheck_core::{Category, GenerationSettings, WardrobeItem};
    use std::time::Instant;

    fn selection() -> SelectionSnapshot {
        SelectionSnapshot {
            tops: vec![WardrobeItem::new("item-1", "White Shirt", Category::Tops)],
            bottoms: vec![WardrobeItem::new("item-2", "Blue Jeans", Category::Bottoms)],
            ..Default::default()
        }
    }

    fn unreachable_client() -> GenerationClient {
        GenerationClient::new(&GenerationSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn insufficient_selection_is_rejected_before_any_network_call() {
        let mut sel = selection();
        sel.bottoms.clear();
        let started = Instant::now();
        let err = generate_outfit(
            &unreachable_client(),
            &sel,
            None,
            &PersonalizationFilters::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SuggestError::InsufficientSelection));
        // even the health probe would cost time against this endpoint
        assert!(started.elapsed().as_millis() < 100);
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_fallback_outfit() {
        let outfit = generate_outfit(
            &unreachable_client(),
            &selection(),
            None,
            &PersonalizationFilters::default(),
        )
        .await
        .unwrap();
        assert_eq!(outfit.items.top, "White Shirt");
        assert_eq!(outfit.items.bottom, "Blue Jeans");
        assert_eq!(outfit.items.shoes, "Any shoes");
    }

    #[tokio::test]
    async fn every_filled_slot_names_a_selected_item_or_sentinel() {
        let sel = selection();
        let outfit = generate_outfit(
            &unreachable_client(),
            &sel,
            None,
            &PersonalizationFilters::default(),
        )
        .await
        .unwrap();
        for value in outfit.items.filled() {
            let known = sel.find_item_by_name(value).is_some() || value == "Any shoes";
            assert!(known, "slot value {value:?} not in selection");
        }
    }
}
