use fitcheck_core::{GeneratedOutfit, OutfitSlots, SelectionSnapshot};
use tracing::debug;

/// Used when the model omits the tip field.
pub const GENERIC_TIP: &str = "Keep the rest of the look simple and let the pieces speak.";

/// Preambles the generator tends to emit before the outfit line. Matched
/// case-insensitively, anchored at the start of the text.
const BOILERPLATE_PREFIXES: &[&str] = &[
    "sure, here",
    "sure! here",
    "sure thing",
    "of course",
    "certainly",
    "here is",
    "here's",
    "great choice",
    "okay",
    "i'm sorry",
    "i am sorry",
    "as requested",
    "based on your wardrobe",
];

/// Best-effort extraction of one structured outfit from free-text model
/// output. Returns None when no line yields a valid outfit; the caller
/// treats that as a normal branch, not an error.
pub fn parse_outfit(raw: &str, selection: &SelectionSnapshot) -> Option<GeneratedOutfit> {
    let text = strip_boilerplate(raw);

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !line.contains('|') {
            continue;
        }
        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        if parts.len() < 4 {
            continue;
        }

        let name = clean_slot(parts[0]);
        // Slot values are resolved against the selection so an outfit can
        // never reference an item the user did not pick; an unresolvable
        // value empties the slot.
        let top = resolve_slot(parts[1], selection);
        let bottom = resolve_slot(parts[2], selection);
        let shoes = resolve_slot(parts[3], selection);
        let accessory = parts
            .get(4)
            .map(|p| resolve_slot(p, selection))
            .unwrap_or_default();
        let styling_tip = parts
            .get(5)
            .map(|p| p.to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| GENERIC_TIP.to_string());

        if name.is_empty() || top.is_empty() || bottom.is_empty() {
            debug!(%line, "candidate outfit line rejected, scanning on");
            continue;
        }

        return Some(GeneratedOutfit {
            name,
            items: OutfitSlots {
                top,
                bottom,
                shoes,
                accessory,
            },
            styling_tip,
        });
    }

    None
}

/// Repeatedly drop leading boilerplate. When the preamble shares a line with
/// the outfit ("Sure, here's an outfit: Casual | ..."), only the text up to
/// and including the colon is removed.
fn strip_boilerplate(raw: &str) -> &str {
    let mut text = raw.trim_start();
    'outer: loop {
        for prefix in BOILERPLATE_PREFIXES {
            if text.len() >= prefix.len()
                && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
            {
                let rest = &text[prefix.len()..];
                let line_end = rest.find('\n').unwrap_or(rest.len());
                let cut = match rest[..line_end].find(':') {
                    Some(i) => i + 1,
                    // A delimiter with no colon means this is the outfit
                    // line itself and the "preamble" is part of its name.
                    None if rest[..line_end].contains('|') => break 'outer,
                    None => line_end,
                };
                text = rest[cut..].trim_start();
                continue 'outer;
            }
        }
        break;
    }
    text
}

/// The literal token "none" in any slot means the slot is empty.
fn clean_slot(part: &str) -> String {
    if part.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        part.to_string()
    }
}

/// Map a slot value onto the canonical name of a selected item, or empty
/// when nothing in the snapshot matches.
fn resolve_slot(part: &str, selection: &SelectionSnapshot) -> String {
    let value = clean_slot(part);
    if value.is_empty() {
        return value;
    }
    match selection.find_item_by_name(&value) {
        Some(item) => item.name.clone(),
        None => {
            debug!(%value, "slot value not found in selection, dropping");
            String::new()
        }
    }
}
