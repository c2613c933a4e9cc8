//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::catalog::models::{Movie, UNRANKED_VALUE};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a table of movies
pub fn print_movie_table(movies: &[Movie]) {
    if movies.is_empty() {
        info("No movies found. Load some with 'magicstream seed <file>'");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("IMDB").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Genres").fg(Color::Cyan),
            Cell::new("Ranking").fg(Color::Cyan),
            Cell::new("Review").fg(Color::Cyan),
        ]);

    for movie in movies {
        let ranking_color = if movie.ranking.ranking_value == UNRANKED_VALUE {
            Color::DarkGrey
        } else {
            Color::Green
        };

        let genres = movie
            .genre
            .iter()
            .map(|g| g.genre_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let review = if movie.admin_review.is_empty() {
            "-"
        } else {
            movie.admin_review.as_str()
        };

        table.add_row(vec![
            Cell::new(&movie.imdb_id),
            Cell::new(&movie.title),
            Cell::new(genres),
            Cell::new(&movie.ranking.ranking_name).fg(ranking_color),
            Cell::new(review),
        ]);
    }

    println!("{table}");
}
