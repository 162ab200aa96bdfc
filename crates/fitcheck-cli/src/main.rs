use std::env;
use std::process::ExitCode;

use chrono::Utc;
use fitcheck_core::{
    next_outfit_id, GeneratedOutfit, PersonalizationFilters, SavedOutfit, SelectionSnapshot,
};
use fitcheck_suggest::{generate_outfit, GenerationClient, SuggestError};
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("");

    let result = match command {
        "wardrobes" => cmd_wardrobes(),
        "show" => cmd_show(&args[2..]),
        "suggest" => cmd_suggest(&args[2..]).await,
        "event" => cmd_event(&args[2..]).await,
        "health" => cmd_health().await,
        "settings" => cmd_settings(&args[2..]),
        _ => {
            eprintln!(
                "Usage: fitcheck <command>\n\
                 \n\
                 Commands:\n\
                 \x20 wardrobes                        list stored wardrobes\n\
                 \x20 show <wardrobe>                  list items by category\n\
                 \x20 suggest <wardrobe> [--save]      generate an outfit from all items\n\
                 \x20 event <wardrobe> <item> <event>  styling advice for one item\n\
                 \x20 health                           probe the generation endpoint\n\
                 \x20 settings [base-url model]        show or update endpoint settings"
            );
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_wardrobes() -> Result<(), String> {
    let names = fitcheck_core::list_wardrobes().map_err(|e| e.to_string())?;
    if names.is_empty() {
        println!("No wardrobes yet. Drop a <name>.closet file into ~/.fitcheck/.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn cmd_show(args: &[String]) -> Result<(), String> {
    let name = args.first().ok_or("usage: fitcheck show <wardrobe>")?;
    let wardrobe = fitcheck_core::read_wardrobe(name).map_err(|e| e.to_string())?;
    let selection = SelectionSnapshot::from_items(&wardrobe.items);
    if selection.is_empty() {
        println!("Wardrobe {name:?} has no items in recognized categories.");
        return Ok(());
    }
    for category in fitcheck_core::Category::ALL {
        let items = selection.items_for(category);
        if items.is_empty() {
            continue;
        }
        println!("{}:", category.label());
        for item in items {
            println!("  {} ({})", item.name, item.id);
        }
    }
    Ok(())
}

fn load_client() -> Result<GenerationClient, String> {
    let settings = fitcheck_core::read_settings();
    if !fitcheck_core::endpoint_configured(&settings) {
        return Err(
            "generation endpoint not configured; run `fitcheck settings <base-url> <model>`"
                .to_string(),
        );
    }
    Ok(GenerationClient::new(&settings))
}

async fn cmd_suggest(args: &[String]) -> Result<(), String> {
    let name = args
        .first()
        .ok_or("usage: fitcheck suggest <wardrobe> [--save]")?;
    let save = args.iter().any(|a| a == "--save");

    let wardrobe = fitcheck_core::read_wardrobe(name).map_err(|e| e.to_string())?;
    let selection = SelectionSnapshot::from_items(&wardrobe.items);
    let client = load_client()?;

    let outfit = match generate_outfit(
        &client,
        &selection,
        None,
        &PersonalizationFilters::default(),
    )
    .await
    {
        Ok(outfit) => outfit,
        Err(SuggestError::InsufficientSelection) => {
            return Err("this wardrobe needs at least one top and one bottom".to_string());
        }
    };

    print_outfit(&outfit, &selection);

    if save {
        let resolved: Vec<String> = outfit
            .items
            .filled()
            .filter_map(|v| selection.find_item_by_name(v))
            .map(|i| i.id.clone())
            .collect();
        let existing = fitcheck_core::list_saved_outfits(name).map_err(|e| e.to_string())?;
        let saved = SavedOutfit {
            id: next_outfit_id(&existing),
            name: outfit.name.clone(),
            styling_tip: outfit.styling_tip.clone(),
            item_ids: resolved,
            created_at: Utc::now(),
        };
        debug!(id = %saved.id, "persisting outfit");
        fitcheck_core::save_outfit(name, saved).map_err(|e| e.to_string())?;
        println!("\nSaved.");
    }

    Ok(())
}

fn print_outfit(outfit: &GeneratedOutfit, selection: &SelectionSnapshot) {
    println!("{}", outfit.name);
    for (slot, value) in [
        ("top", outfit.items.top.as_str()),
        ("bottom", outfit.items.bottom.as_str()),
        ("shoes", outfit.items.shoes.as_str()),
        ("accessory", outfit.items.accessory.as_str()),
    ] {
        if value.is_empty() {
            continue;
        }
        // re-attach the stored image where the slot names a real item
        match selection.find_item_by_name(value) {
            Some(item) if !item.image_uri.is_empty() => {
                println!("  {slot}: {} [{}]", value, item.image_uri)
            }
            _ => println!("  {slot}: {value}"),
        }
    }
    println!("  tip: {}", outfit.styling_tip);
}

async fn cmd_event(args: &[String]) -> Result<(), String> {
    let [wardrobe, item_name, event @ ..] = args else {
        return Err("usage: fitcheck event <wardrobe> <item> <event...>".to_string());
    };
    if event.is_empty() {
        return Err("usage: fitcheck event <wardrobe> <item> <event...>".to_string());
    }
    let event = event.join(" ");

    let wardrobe = fitcheck_core::read_wardrobe(wardrobe).map_err(|e| e.to_string())?;
    let selection = SelectionSnapshot::from_items(&wardrobe.items);
    let item = selection
        .find_item_by_name(item_name)
        .ok_or_else(|| format!("no item matching {item_name:?} in this wardrobe"))?;

    let client = load_client()?;
    let advice = fitcheck_suggest::event::suggest_for_event(&client, item, &event, None).await;
    println!("{advice}");
    Ok(())
}

async fn cmd_health() -> Result<(), String> {
    let client = load_client()?;
    if client.check_health().await {
        println!("endpoint reachable");
        Ok(())
    } else {
        Err("endpoint unreachable".to_string())
    }
}

fn cmd_settings(args: &[String]) -> Result<(), String> {
    match args {
        [] => {
            let settings = fitcheck_core::read_settings();
            if fitcheck_core::endpoint_configured(&settings) {
                println!("base url: {}", settings.base_url);
                println!("model:    {}", settings.model);
                println!("timeout:  {}ms", settings.timeout_ms);
            } else {
                println!("not configured; run `fitcheck settings <base-url> <model>`");
            }
            Ok(())
        }
        [base_url, model] => {
            let mut settings = fitcheck_core::read_settings();
            settings.base_url = base_url.clone();
            settings.model = model.clone();
            fitcheck_core::write_settings(&settings).map_err(|e| e.to_string())?;
            println!("settings updated");
            Ok(())
        }
        _ => Err("usage: fitcheck settings [base-url model]".to_string()),
    }
}
