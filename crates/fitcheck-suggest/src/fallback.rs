use fitcheck_core::{
    GeneratedOutfit, OutfitSlots, PersonalizationFilters, SelectionSnapshot, UserProfile,
};

use crate::parse::GENERIC_TIP;

/// Build an outfit directly from the selection when generation fails or is
/// unparseable. Deterministic, no I/O, never fails: even a selection with no
/// tops and no bottoms yields the "Select More Items" sentinel instead of an
/// error.
pub fn synthesize_fallback(
    selection: &SelectionSnapshot,
    profile: Option<&UserProfile>,
    filters: &PersonalizationFilters,
) -> GeneratedOutfit {
    if selection.tops.is_empty() && selection.bottoms.is_empty() {
        return GeneratedOutfit {
            name: "Select More Items".to_string(),
            items: OutfitSlots::default(),
            styling_tip: "Add at least one top and one bottom to your selection, then try again."
                .to_string(),
        };
    }

    let first_name = |items: &[fitcheck_core::WardrobeItem]| {
        items.first().map(|i| i.name.clone()).unwrap_or_default()
    };

    let shoes = selection
        .shoes
        .first()
        .map(|i| i.name.clone())
        .unwrap_or_else(|| "Any shoes".to_string());
    let accessory = selection
        .accessories
        .first()
        .or_else(|| selection.jackets.first())
        .map(|i| i.name.clone())
        .unwrap_or_default();

    GeneratedOutfit {
        name: "Everyday Combination".to_string(),
        items: OutfitSlots {
            top: first_name(&selection.tops),
            bottom: first_name(&selection.bottoms),
            shoes,
            accessory,
        },
        styling_tip: fallback_tip(profile, filters),
    }
}

/// Canned tip selection: lifestyle over body type over gender over a generic
/// style-preference phrasing, each gated the same way prompt clauses are.
fn fallback_tip(profile: Option<&UserProfile>, filters: &PersonalizationFilters) -> String {
    if let Some(profile) = profile {
        if filters.use_lifestyle {
            if let Some(lifestyle) = &profile.lifestyle {
                return format!(
                    "Built around your {lifestyle} lifestyle, so it stays comfortable all day."
                );
            }
        }
        if filters.use_body_type {
            if let Some(body_type) = &profile.body_type {
                return format!("Clean lines that flatter a {body_type} body type.");
            }
        }
        if filters.use_gender {
            if let Some(gender) = &profile.gender {
                return format!("A dependable staple for any {gender} wardrobe.");
            }
        }
        if let Some(style) = &profile.style {
            return format!("Leans into your {style} style preference.");
        }
    }
    GENERIC_TIP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcheck_core::{Category, WardrobeItem};

    fn selection() -> SelectionSnapshot {
        SelectionSnapshot {
            tops: vec![WardrobeItem::new("item-1", "White Shirt", Category::Tops)],
            bottoms: vec![WardrobeItem::new("item-2", "Blue Jeans", Category::Bottoms)],
            ..Default::default()
        }
    }

    #[test]
    fn picks_first_items_with_shoe_sentinel() {
        let outfit = synthesize_fallback(&selection(), None, &PersonalizationFilters::default());
        assert_eq!(outfit.items.top, "White Shirt");
        assert_eq!(outfit.items.bottom, "Blue Jeans");
        assert_eq!(outfit.items.shoes, "Any shoes");
        assert_eq!(outfit.items.accessory, "");
        assert_eq!(outfit.styling_tip, GENERIC_TIP);
    }

    #[test]
    fn accessory_falls_back_to_jackets() {
        let mut sel = selection();
        sel.jackets
            .push(WardrobeItem::new("item-3", "Denim Jacket", Category::Jackets));
        let outfit = synthesize_fallback(&sel, None, &PersonalizationFilters::default());
        assert_eq!(outfit.items.accessory, "Denim Jacket");

        sel.accessories
            .push(WardrobeItem::new("item-4", "Leather Belt", Category::Accessories));
        let outfit = synthesize_fallback(&sel, None, &PersonalizationFilters::default());
        assert_eq!(outfit.items.accessory, "Leather Belt");
    }

    #[test]
    fn is_deterministic_for_same_inputs() {
        let sel = selection();
        let profile = UserProfile {
            lifestyle: Some("active".into()),
            gender: Some("men's".into()),
            ..Default::default()
        };
        let filters = PersonalizationFilters {
            use_lifestyle: true,
            use_gender: true,
            ..Default::default()
        };
        let a = synthesize_fallback(&sel, Some(&profile), &filters);
        let b = synthesize_fallback(&sel, Some(&profile), &filters);
        assert_eq!(a, b);
    }

    #[test]
    fn tip_priority_lifestyle_first() {
        let profile = UserProfile {
            lifestyle: Some("active".into()),
            body_type: Some("athletic".into()),
            gender: Some("men's".into()),
            style: Some("minimalist".into()),
            ..Default::default()
        };
        let all = PersonalizationFilters {
            use_gender: true,
            use_body_type: true,
            use_lifestyle: true,
        };
        let outfit = synthesize_fallback(&selection(), Some(&profile), &all);
        assert!(outfit.styling_tip.contains("active lifestyle"));

        let no_lifestyle = PersonalizationFilters {
            use_lifestyle: false,
            ..all
        };
        let outfit = synthesize_fallback(&selection(), Some(&profile), &no_lifestyle);
        assert!(outfit.styling_tip.contains("athletic body type"));
    }

    #[test]
    fn style_phrasing_used_without_filter_backing() {
        let profile = UserProfile {
            style: Some("minimalist".into()),
            ..Default::default()
        };
        let outfit =
            synthesize_fallback(&selection(), Some(&profile), &PersonalizationFilters::default());
        assert!(outfit.styling_tip.contains("minimalist"));
    }

    #[test]
    fn empty_selection_yields_sentinel_outfit() {
        let outfit = synthesize_fallback(
            &SelectionSnapshot::default(),
            None,
            &PersonalizationFilters::default(),
        );
        assert_eq!(outfit.name, "Select More Items");
        assert!(outfit.items.filled().next().is_none());
    }
}
