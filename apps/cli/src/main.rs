use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    DurableSessionCache, HttpRequestGateway, ImagePicker, MenuEvent, MenuScreen, Navigator,
    Notifier, PlacePicker, ProfileScreen, Prompter, Route, SessionCache, SessionContext,
};
use shared::domain::{PhotoSelection, Place, PlaceId};
use tracing::info;
use url::Url;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Exercise the food-ordering screen controllers against a live backend")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print today's menu for a place.
    Menu {
        #[arg(long)]
        place_id: i64,
        #[arg(long)]
        place_name: Option<String>,
    },
    /// Fetch and print the signed-in user's profile.
    Profile,
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, message: &str) {
        println!("! {message}");
    }
}

struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!(?route, "navigate");
    }

    fn go_back(&self) {
        info!("navigate back");
    }

    fn set_picker_affordance(&self, visible: bool) {
        info!(visible, "picker affordance");
    }
}

struct FixedPlacePicker {
    place: Place,
}

#[async_trait]
impl PlacePicker for FixedPlacePicker {
    async fn resolve_place(&self) -> Result<Option<Place>> {
        Ok(Some(self.place.clone()))
    }
}

struct NoImagePicker;

#[async_trait]
impl ImagePicker for NoImagePicker {
    async fn pick(&self) -> Result<Option<PhotoSelection>> {
        Ok(None)
    }
}

struct KeepEditing;

#[async_trait]
impl Prompter for KeepEditing {
    async fn confirm_discard(&self, _message: &str) -> bool {
        false
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();
    Url::parse(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;

    let cache = DurableSessionCache::initialize(&settings.database_url).await?;
    let session = SessionContext::new(cache.load().await?);
    let gateway = Arc::new(HttpRequestGateway::new(
        settings.server_url.clone(),
        session.clone(),
    ));

    match args.command {
        Command::Menu {
            place_id,
            place_name,
        } => {
            let place = Place {
                id: PlaceId(place_id),
                name: place_name.unwrap_or_else(|| format!("place {place_id}")),
            };
            let screen = MenuScreen::new(
                gateway,
                Arc::new(FixedPlacePicker {
                    place: place.clone(),
                }),
                Arc::new(LogNavigator),
                Arc::new(ConsoleNotifier),
                session,
            );

            let mut events = screen.subscribe_events();
            screen.on_place_resolved(Some(place)).await;
            loop {
                match events.recv().await? {
                    MenuEvent::MenuLoaded | MenuEvent::MenuFetchFailed => break,
                    _ => {}
                }
            }

            let state = screen.snapshot().await;
            if state.error {
                println!("failed to load the menu; try again");
            } else if let Some(items) = &state.menu {
                println!("{} {}", state.date_window.weekday, state.date_window.date);
                if items.is_empty() {
                    println!("no menu today");
                }
                for item in items {
                    println!(
                        "{}: HKD {} (was {})",
                        item.name, item.price, item.original_price
                    );
                }
                println!("{}", state.date_window.deadline);
            }
        }
        Command::Profile => {
            let screen = ProfileScreen::new(
                gateway,
                Arc::new(LogNavigator),
                Arc::new(ConsoleNotifier),
                Arc::new(NoImagePicker),
                Arc::new(KeepEditing),
                Arc::clone(&cache) as Arc<dyn SessionCache>,
                session,
            );
            screen.initialize().await;

            let state = screen.snapshot().await;
            match state.profile {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => println!("profile unavailable"),
            }
        }
    }

    Ok(())
}
