use fitcheck_core::{WardrobeItem, WeatherReport};
use tracing::warn;

use crate::engine::GenerationClient;
use crate::{prompt, retry};

/// Fixed attempt count for the event suggestion screen.
pub const EVENT_ATTEMPTS: usize = 3;

const MIN_EVENT_RESPONSE_LEN: usize = 40;

const WEATHER_TERMS: &[&str] = &[
    "weather",
    "temperature",
    "degrees",
    "warm",
    "cold",
    "hot",
    "cool",
    "rain",
    "sun",
    "wind",
    "layer",
];

/// Completeness check for event suggestions: non-trivial length, mentions
/// the item by name, and engages with the weather at all.
pub fn response_complete(response: &str, item_name: &str) -> bool {
    let lower = response.to_lowercase();
    response.trim().len() >= MIN_EVENT_RESPONSE_LEN
        && lower.contains(&item_name.to_lowercase())
        && WEATHER_TERMS.iter().any(|t| lower.contains(t))
}

/// Styling advice for wearing one item to an occasion. Retries up to
/// EVENT_ATTEMPTS times, accepting the first complete response; any total
/// failure degrades to a deterministic canned suggestion, never an error.
pub async fn suggest_for_event(
    client: &GenerationClient,
    item: &WardrobeItem,
    event: &str,
    weather: Option<&WeatherReport>,
) -> String {
    let prompt = prompt::event_prompt(item, event, weather);
    let result = retry::generate_with_retry(
        EVENT_ATTEMPTS,
        |text| response_complete(text, &item.name),
        || client.generate(&prompt),
    )
    .await;

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "event suggestion unavailable, using canned advice");
            canned_suggestion(item, event, weather)
        }
    }
}

fn canned_suggestion(item: &WardrobeItem, event: &str, weather: Option<&WeatherReport>) -> String {
    let weather_note = match weather {
        Some(w) => format!(
            " With {} and around {:.0} degrees expected, bring a layer you can shed.",
            w.condition, w.temperature
        ),
        None => String::new(),
    };
    format!(
        "Wear your {} as the anchor piece for {} and keep the rest neutral.{}",
        item.name, event, weather_note
    )
}
