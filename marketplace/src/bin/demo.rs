//! Tikiti marketplace demo
//!
//! Walks through both sides of the marketplace against the mock ports:
//! - An organizer fills the tier wizard and publishes the event
//! - A buyer selects tickets, which land in the persisted cart
//! - The buyer checks out and the push payment is requested
//!
//! # Usage
//!
//! ```bash
//! # In-memory cart
//! cargo run --bin demo
//!
//! # Cart persisted under ./.tikiti
//! TIKITI_CART_DIR=.tikiti cargo run --bin demo
//! ```

use chrono::{Days, Utc};
use std::sync::Arc;
use tikiti_core::environment::{KeyValueStore, SystemClock};
use tikiti_marketplace::{
    gateway::{MockEventCatalog, MockPurchaseGateway},
    BuyerDetails, Capacity, Cart, CartEnvironment, CheckoutService, Config, EventDraft,
    EventPublisher, EventWithTickets, FileStore, MemoryStore, PurchaseIntentBuilder,
    TicketListing, TicketSelection, TierWizardAction, TierWizardEnvironment, TierWizardReducer,
    TierWizardState,
};
use tikiti_runtime::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tikiti_marketplace=debug", config.log.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n============================================");
    println!("   Tikiti Marketplace - Demo");
    println!("============================================\n");

    // ========== Organizer: tier wizard ==========

    println!("1. Organizer fills the ticket wizard");

    let event_day = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(30))
        .ok_or("event date out of range")?;
    let draft = EventDraft {
        name: "Koroga Festival".to_string(),
        location: "Nairobi".to_string(),
        description: Some("Afro-fusion weekend".to_string()),
        category: Some("Music".to_string()),
        capacity: Capacity::new(100),
        start_date: event_day,
        start_time: None,
        end_date: event_day,
        end_time: None,
    };

    let mut wizard = Store::new(
        TierWizardState::new(draft),
        TierWizardReducer,
        TierWizardEnvironment::new(Arc::new(SystemClock)),
    );

    for (index, quantity, price) in [(0, "40", "1500"), (1, "50", "2000"), (2, "20", "5000")] {
        wizard.send(TierWizardAction::SetQuantity { index, input: quantity.to_string() });
        wizard.send(TierWizardAction::SetPrice { index, input: price.to_string() });
    }
    if let Some(message) = wizard.state(|s| s.last_error.clone()) {
        println!("   ! {message}");
    }
    wizard.send(TierWizardAction::ToggleDiscount { index: 0, enabled: true });
    wizard.send(TierWizardAction::SetDiscountValue { index: 0, input: "10".to_string() });

    println!(
        "   Tickets: {}  Projected earnings: {}",
        wizard.state(TierWizardState::total_tickets),
        wizard.state(TierWizardState::total_earnings)
    );

    wizard.send(TierWizardAction::Finish);
    let request = wizard
        .state(|s| s.request.clone())
        .ok_or("wizard did not finish")?;

    // ========== Organizer: publish ==========

    println!("\n2. Publishing the event");

    let catalog = Arc::new(MockEventCatalog::new());
    let publisher = EventPublisher::new(catalog.clone());
    let listings: Vec<TicketListing> = request
        .tiers
        .iter()
        .map(|tier| TicketListing {
            ticket_type: tier.ticket_type.clone(),
            quantity: tier.quantity,
            quantity_sold: 0,
            price: tier.base_price,
            discount: tier.discount.clone(),
        })
        .collect();
    let name = request.event.name.clone();
    let published = publisher.publish(request).await?;
    println!("   Event {} created with {} tiers", published.event_id, published.tickets.len());

    // ========== Buyer: selection and cart ==========

    println!("\n3. Buyer picks tickets");

    let storage: Arc<dyn KeyValueStore> = match &config.cart.storage_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => Arc::new(MemoryStore::new()),
    };
    let mut cart = Cart::load(CartEnvironment::new(storage, config.cart.storage_key.clone()));
    let _badge = cart.subscribe(|lines| {
        let count: u32 = lines.iter().map(|line| line.quantity).sum();
        println!("   [cart badge] {count} tickets");
    });

    let page = EventWithTickets {
        id: published.event_id,
        name,
        tickets: listings,
    };
    let mut selection = TicketSelection::from_cart(&page, &cart.snapshot());

    cart.dispatch(selection.increment(0)?.action);
    cart.dispatch(selection.increment(0)?.action);
    let update = selection.set_quantity(2, "25")?;
    if let Some(condition) = &update.condition {
        println!("   ! {condition}");
    }
    cart.dispatch(update.action);

    println!("   Subtotal: {}", selection.subtotal());
    for line in cart.snapshot() {
        println!("   - {} x {} @ {}", line.quantity, line.ticket_type, line.unit_price);
    }

    // ========== Buyer: checkout ==========

    println!("\n4. Checking out");

    let gateway = MockPurchaseGateway::new();
    let checkout = CheckoutService::new(
        PurchaseIntentBuilder::new(&config.checkout),
        Arc::new(gateway.clone()),
    );

    let typo = BuyerDetails::new("W", "wanjiku.example.com", "0812");
    if let Err(error) = checkout.checkout(&mut cart, &typo).await {
        println!("   ! {error}");
    }

    let buyer = BuyerDetails::new("Wanjiku Mwangi", "Wanjiku@Example.com", "0712 345 678");
    let receipt = checkout.checkout(&mut cart, &buyer).await?;
    println!("   Purchase {} for {} accepted", receipt.reference, receipt.amount);
    if let Some(intent) = gateway.submitted().last() {
        println!("   Push payment sent to {}", intent.buyer_phone());
        println!("   Payload: {}", serde_json::to_string(intent)?);
    }

    println!("\n✓ Demo complete. Cart empty: {}\n", cart.is_empty());
    Ok(())
}
