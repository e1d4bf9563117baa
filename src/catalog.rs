//! The movie catalog displayed by the menu.

use std::path::{Path, PathBuf};

const POSTER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/posters");

/// Width of a placeholder poster, in pixels.
pub const POSTER_WIDTH: u32 = 80;
/// Height of a placeholder poster, in pixels.
pub const POSTER_HEIGHT: u32 = 120;

/// A single movie entry: title, synopsis, and poster artwork.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MovieRecord {
    title: String,
    synopsis: String,
    poster: PosterArt,
}

impl MovieRecord {
    /// Creates a new `MovieRecord` with the given title, synopsis, and poster artwork.
    pub fn new(title: impl Into<String>, synopsis: impl Into<String>, poster: PosterArt) -> Self {
        MovieRecord {
            title: title.into(),
            synopsis: synopsis.into(),
            poster,
        }
    }

    /// Returns the title displayed in the list.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the synopsis shown by the details dialog.
    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    /// Returns the poster artwork for this movie.
    pub fn poster(&self) -> &PosterArt {
        &self.poster
    }
}

/// Poster artwork for a movie, opaque to everything but the widget layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PosterArt {
    /// A drawn stand-in of [`POSTER_WIDTH`] × [`POSTER_HEIGHT`] pixels, used when no real
    /// artwork exists.
    Placeholder,
    /// Real artwork loaded from an image file on disk.
    Image(PathBuf),
}

/// An ordered collection of movies, read-only once constructed.
///
/// Insertion order is display order. Titles carry no identity and may repeat; the menu refers
/// to entries by position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Catalog {
    records: Vec<MovieRecord>,
}

impl Catalog {
    /// Creates a new `Catalog` containing the given records, in order.
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Catalog { records }
    }

    /// Returns the number of movies in the catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the catalog contains no movies.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record at display position `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.records.get(index)
    }

    /// Returns an iterator over the records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> {
        self.records.iter()
    }
}

impl FromIterator<MovieRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = MovieRecord>>(iter: I) -> Self {
        Catalog {
            records: iter.into_iter().collect(),
        }
    }
}

/// Returns the built-in catalog shown at startup.
///
/// Artwork is looked up under `assets/posters/` by slugged title; entries without an artwork
/// file fall back to the drawn placeholder.
pub fn seed() -> Catalog {
    const MOVIES: [(&str, &str); 5] = [
        (
            "Inception",
            "A mind-bending thriller about dreams within dreams.",
        ),
        (
            "Stranger Things",
            "A group of kids uncover supernatural mysteries in their town.",
        ),
        (
            "The Witcher",
            "A monster hunter struggles to find his place in a turbulent world.",
        ),
        (
            "Interstellar",
            "Explorers travel through a wormhole in space to save humanity.",
        ),
        (
            "Dark",
            "A time-travel mystery that spans multiple generations.",
        ),
    ];

    MOVIES
        .into_iter()
        .map(|(title, synopsis)| MovieRecord::new(title, synopsis, poster_for(title)))
        .collect()
}

/// Returns the artwork for `title`, preferring a real image file when one exists.
fn poster_for(title: &str) -> PosterArt {
    let slug: String = title
        .chars()
        .map(|c| if c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect();

    let path = Path::new(POSTER_DIR).join(slug).with_extension("png");
    if path.is_file() {
        PosterArt::Image(path)
    } else {
        PosterArt::Placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_preserves_insertion_order() {
        let catalog = seed();
        let titles: Vec<_> = catalog.iter().map(|r| r.title()).collect();
        assert_eq!(
            titles,
            ["Inception", "Stranger Things", "The Witcher", "Interstellar", "Dark"]
        );
    }

    #[test]
    fn seed_falls_back_to_placeholder_posters() {
        // No artwork ships with the crate, so every entry gets the drawn stand-in.
        assert!(seed().iter().all(|r| *r.poster() == PosterArt::Placeholder));
    }

    #[test]
    fn poster_lookup_slugs_titles() {
        // "Stranger Things" resolves to stranger-things.png, which does not exist on disk.
        assert_eq!(poster_for("Stranger Things"), PosterArt::Placeholder);
    }

    #[test]
    fn duplicate_titles_are_allowed() {
        let catalog: Catalog = (0..2)
            .map(|_| MovieRecord::new("Dark", "Same title, different entry.", PosterArt::Placeholder))
            .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).map(|r| r.title()), Some("Dark"));
        assert_eq!(catalog.get(1).map(|r| r.title()), Some("Dark"));
    }

    #[test]
    fn empty_catalog_is_valid() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.get(0), None);
    }
}
