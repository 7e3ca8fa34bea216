use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings,
    draft::{DraftAction, DraftWorkflow},
    geocode::GeocodeClient,
    CityStore,
};
use shared::domain::{distinct_countries, CityId};

#[derive(Parser, Debug)]
#[command(about = "drive the city travel log from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every recorded city.
    ListCities,
    /// List the distinct countries across the collection.
    ListCountries,
    /// Show a single city by id.
    ShowCity { id: i64 },
    /// Resolve a coordinate and record a new visited city.
    AddCity {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        /// Override the resolved city name.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a recorded city by id.
    DeleteCity { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let cli = Cli::parse();
    let settings = load_settings();
    let store = CityStore::new(settings.api_base()?);

    match cli.command {
        Command::ListCities => {
            store.load_all().await?;
            let state = store.snapshot().await;
            for city in &state.cities {
                println!(
                    "{:>10}  {} {} ({}) — {}",
                    city.id.0,
                    city.emoji,
                    city.city_name,
                    city.country,
                    city.date.format("%Y-%m-%d")
                );
            }
        }
        Command::ListCountries => {
            store.load_all().await?;
            let state = store.snapshot().await;
            for country in distinct_countries(&state.cities) {
                println!("{} {}", country.emoji, country.country);
            }
        }
        Command::ShowCity { id } => {
            store.get_by_id(CityId(id)).await?;
            let state = store.snapshot().await;
            if let Some(city) = state.current_city {
                println!("{} {} ({})", city.emoji, city.city_name, city.country);
                println!("visited {}", city.date.format("%Y-%m-%d"));
                println!("at ({}, {})", city.position.lat, city.position.lng);
                if !city.notes.is_empty() {
                    println!("{}", city.notes);
                }
            }
        }
        Command::AddCity {
            lat,
            lng,
            name,
            notes,
        } => {
            let geocoder = Arc::new(GeocodeClient::new(settings.geocode_endpoint()?));
            let workflow = DraftWorkflow::new(geocoder);
            workflow.set_position(lat, lng).await;
            if let Some(name) = name {
                workflow.dispatch(DraftAction::CityName(name)).await;
            }
            if let Some(notes) = notes {
                workflow.dispatch(DraftAction::Notes(notes)).await;
            }
            let city = workflow.submit(&store).await?;
            println!(
                "recorded {} {} ({}) as id {}",
                city.emoji, city.city_name, city.country, city.id.0
            );
        }
        Command::DeleteCity { id } => {
            store.delete(CityId(id)).await?;
            println!("deleted city {id}");
        }
    }

    Ok(())
}
