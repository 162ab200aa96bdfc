use fitcheck_core::{
    Category, PersonalizationFilters, SelectionSnapshot, UserProfile, WardrobeItem, WeatherReport,
};
use tracing::debug;

/// Build the constrained generation instruction from a selection snapshot.
/// Every selected item name is enumerated into an explicit allow-list;
/// empty categories are called out so the model never invents items.
pub fn build_prompt(
    selection: &SelectionSnapshot,
    profile: Option<&UserProfile>,
    filters: &PersonalizationFilters,
) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str(
        "You are composing one outfit from a user's own wardrobe.\n\
         Use ONLY the item names listed below, exactly as written. \
         Never invent, rename, or substitute items. \
         Write None for any slot you cannot fill from the list.\n\n",
    );

    out.push_str("AVAILABLE ITEMS:\n");
    for category in Category::ALL {
        out.push_str(category.label());
        out.push_str(": ");
        let items = selection.items_for(category);
        if items.is_empty() {
            out.push_str("None available");
        } else {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&item.name);
            }
        }
        out.push('\n');
    }

    if let Some(profile) = profile {
        push_personalization(&mut out, profile, filters);
    }

    out.push_str("\nRespond with exactly one line in this format:\n");
    out.push_str("Name | Top | Bottom | Shoes | Accessory | Tip\n");
    out.push_str(
        "Example: Casual Friday | Blue Oxford Shirt | Dark Jeans | White Sneakers | \
         Leather Watch | Roll the sleeves for a relaxed look\n",
    );

    out
}

/// A filter flag with no backing profile field adds no clause.
fn push_personalization(out: &mut String, profile: &UserProfile, filters: &PersonalizationFilters) {
    let mut clauses = String::new();

    if filters.use_gender {
        match &profile.gender {
            Some(gender) => {
                clauses.push_str("- Choose pieces suited to a ");
                clauses.push_str(gender);
                clauses.push_str(" wardrobe.\n");
            }
            None => debug!("gender filter set but profile has no gender"),
        }
    }
    if filters.use_body_type {
        match &profile.body_type {
            Some(body_type) => {
                clauses.push_str("- Favor cuts that flatter a ");
                clauses.push_str(body_type);
                clauses.push_str(" body type.\n");
            }
            None => debug!("body type filter set but profile has no body type"),
        }
    }
    if filters.use_lifestyle {
        match &profile.lifestyle {
            Some(lifestyle) => {
                clauses.push_str("- The outfit should fit a ");
                clauses.push_str(lifestyle);
                clauses.push_str(" lifestyle.\n");
            }
            None => debug!("lifestyle filter set but profile has no lifestyle"),
        }
    }

    if !clauses.is_empty() {
        out.push_str("\nPERSONALIZATION:\n");
        out.push_str(&clauses);
    }
}

/// Prompt for the event-based suggestion screen: one item, one occasion,
/// weather context injected as free text when available.
pub fn event_prompt(item: &WardrobeItem, event: &str, weather: Option<&WeatherReport>) -> String {
    let mut out = String::with_capacity(512);

    out.push_str("Suggest how to style the item \"");
    out.push_str(&item.name);
    out.push_str("\" for this occasion: ");
    out.push_str(event);
    out.push_str(".\n");

    if let Some(weather) = weather {
        out.push_str("Expected weather: ");
        out.push_str(&weather.condition);
        out.push_str(", ");
        out.push_str(&format!("{:.0}", weather.temperature));
        out.push_str(" degrees.\n");
    }

    out.push_str(
        "Mention the item by name, account for the weather, and keep the advice \
         to two or three sentences.\n",
    );

    out
}
