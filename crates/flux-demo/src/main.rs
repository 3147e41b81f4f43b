use anyhow::Result;
use flux_core::{Flux, FluxOptions, StateWatcher};
use flux_storage::{FileStorage, FluxConfig, PersistedStore, StorageScope};
use serde_json::{json, Value};
use std::path::Path;

mod logger;
mod stores;

use stores::{CartStore, OrdersStore, ADD_ITEM, CHECKOUT, REMOVE_ITEM};

const VISITS_KEY: &str = "visits";

fn main() -> Result<()> {
    let log_file = logger::init()?;

    log::info!("Starting flux-demo");
    println!("Logging to {}", log_file.display());

    let config = FluxConfig::load();
    let root = config.storage_dir.as_deref();

    // First session: fill the cart, state is written through to session storage
    let mut flux = Flux::with_storage(FluxOptions::from(&config), open_storage(root)?);
    run_shopping(&mut flux);
    drop(flux);

    // Same storage, fresh dispatcher: registered stores seed from the cache
    let mut flux = Flux::with_storage(FluxOptions::from(&config), open_storage(root)?);
    flux.register_store(CartStore::default());
    flux.register_store(OrdersStore);
    println!(
        "After restart the cart holds {} and {} order(s) were placed",
        flux.get_state("cart", json!([])),
        flux.get_state(["orders", "count"], json!(0))
    );

    let visits = count_visit(flux.storage_mut());
    println!("This demo has run {} time(s)", visits);

    // End of session
    flux.storage_mut().clear(StorageScope::Session);

    log::info!("Exiting flux-demo");
    Ok(())
}

fn open_storage(root: Option<&Path>) -> Result<PersistedStore> {
    Ok(PersistedStore::new(
        Box::new(FileStorage::session(root)?),
        Box::new(FileStorage::local(root)?),
    ))
}

fn run_shopping(flux: &mut Flux) {
    flux.register_store(CartStore::default());
    flux.register_store(OrdersStore);

    flux.on(ADD_ITEM, |payload| {
        println!("  added {}", payload.get("item").unwrap_or(&Value::Null));
    });
    flux.on(CHECKOUT, |payload| {
        println!("  checked out {}", payload.get("items").unwrap_or(&Value::Null));
    });

    let mut cart = StateWatcher::new("cart", json!([]));
    let mut render = |flux: &Flux| {
        if let Some(items) = cart.poll(flux) {
            println!("  cart: {}", items);
        }
    };

    render(flux);
    flux.dispatch(json!({"type": ADD_ITEM, "item": "apple"}));
    render(flux);
    flux.dispatch(json!({"type": ADD_ITEM, "item": "banana"}));
    render(flux);
    flux.dispatch(json!({"type": "UNKNOWN_ACTION"}));
    render(flux);

    flux.enable_debugger();
    flux.dispatch(json!([
        {"type": ADD_ITEM, "item": "cherry"},
        {"type": REMOVE_ITEM, "item": "banana"},
        {"item": "no type, skipped"},
    ]));
    render(flux);

    let items = flux.get_state("cart", json!([]));
    flux.dispatch(json!({"type": CHECKOUT, "items": items}));
    render(flux);
    println!(
        "  orders placed: {}",
        flux.get_state(["orders", "count"], json!(0))
    );

    flux.dispatch(json!({"type": ADD_ITEM, "item": "dates"}));
    render(flux);
}

/// Increment the durable visit counter
fn count_visit(storage: &mut PersistedStore) -> u64 {
    let visits = storage
        .get_local_data(VISITS_KEY)
        .and_then(|value| value.as_u64())
        .unwrap_or(0)
        + 1;
    storage.set_local_data(VISITS_KEY, &json!(visits));
    visits
}
