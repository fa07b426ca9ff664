use std::sync::{Arc, Mutex};

use movieverse_core::{
    AppController, ClientConfig, FavoritesStore, KeyValueStore, MemoryStore, OmdbClient, Theme,
    ThemeManager,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("movieverse_core=debug"))
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "batman".to_string());

    let client = OmdbClient::with_config(ClientConfig::from_env())?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let favorites = Arc::new(Mutex::new(FavoritesStore::new(Arc::clone(&storage))));
    let theme = Arc::new(Mutex::new(ThemeManager::new(storage, Theme::Light)));
    let controller = AppController::new(client, favorites, theme);

    println!("Searching for '{}'...\n", query);
    controller.search(&query).await?;

    while controller.has_more_pages() && controller.session().current_page < 3 {
        controller.load_more().await?;
    }

    let view = controller.view();
    if let Some(header) = &view.results_header {
        println!("{}\n{}\n", header.title, header.count);
    }
    for (i, card) in view.results.iter().enumerate() {
        println!("  {}. {} ({}) - {}", i + 1, card.movie.title, card.movie.year, card.movie.imdb_id);
    }
    if let Some(button) = &view.load_more {
        println!("\n[{}]", button.label);
    }

    if let Some(first) = view.results.first() {
        controller.toggle_favorite(&first.movie);
        controller.show_details(&first.movie.imdb_id).await?;

        let view = controller.view();
        if let Some(title) = &view.modal_title {
            println!("\nDetails: {}", title);
        }
        println!("\nFavorites export:\n{}", controller.export_favorites());
    }

    Ok(())
}
