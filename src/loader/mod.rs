pub mod lyrics_loader;
