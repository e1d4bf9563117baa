//! Business logic for the application.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Texture;
use sdl2::ttf::FontStyle;

use crate::app::{
    Action, Context, Notification, Properties, State, Widget, WidgetId, Widgets,
};
use crate::catalog::{Catalog, MovieRecord, PosterArt, POSTER_HEIGHT, POSTER_WIDTH};

const FONT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/fonts/DejaVuSans.ttf");
const FONT_STYLE: FontStyle = FontStyle::NORMAL;

const BACKGROUND_COLOR: Color = Color::RGB(16, 18, 24);

const LEFT_MARGIN: i32 = 24;
const TOP_MARGIN: i32 = 24;

const ROW_PADDING: u32 = 8;
const ROW_HEIGHT: u32 = POSTER_HEIGHT + 2 * ROW_PADDING;
const ROW_SPACING: u32 = 8;
const ROW_BACKGROUND: Color = Color::RGB(28, 32, 42);
const ROW_FOREGROUND: Color = Color::RGB(235, 235, 240);
const SELECTION_BACKGROUND: Color = Color::RGB(38, 92, 170);
const SELECTION_FOREGROUND: Color = Color::WHITE;

const LABEL_GAP: u32 = 16;
const LABEL_POINT_SIZE: u16 = 28;

const POSTER_FILL: Color = Color::RGB(64, 64, 64);
const POSTER_INK: Color = Color::WHITE;
const POSTER_CAPTION: &str = "Poster";
const POSTER_POINT_SIZE: u16 = 14;

const BUTTON_WIDTH: u32 = 132;
const BUTTON_HEIGHT: u32 = 44;
const BUTTON_SPACING: i32 = 24;
const BUTTON_BOTTOM_MARGIN: u32 = 20;
const BUTTON_COLOR: Color = Color::RGB(46, 52, 66);
const BUTTON_BORDER_COLOR: Color = Color::RGB(96, 104, 122);
const BUTTON_POINT_SIZE: u16 = 18;

const PLAY_CAPTION: &str = "Play";
const DETAILS_CAPTION: &str = "Details";

const PLAYBACK_TITLE: &str = "Playback";
const NO_SELECTION_TITLE: &str = "No movie selected";
const NO_SELECTION_MESSAGE: &str = "Select a movie from the list";

/// Contains the state for the movie browser: the catalog and the current selection.
#[derive(Debug)]
pub struct Browser {
    catalog: Catalog,
    selection: Option<usize>,
    rows: Vec<RowWidgets>,
    play_button: Option<WidgetId>,
    details_button: Option<WidgetId>,
}

/// Widget IDs making up one catalog row.
#[derive(Clone, Copy, Debug)]
struct RowWidgets {
    backdrop: WidgetId,
    poster: WidgetId,
    label: WidgetId,
}

impl Browser {
    /// Creates a new `Browser` over the given catalog, with nothing selected.
    pub fn new(catalog: Catalog) -> Self {
        Browser {
            catalog,
            selection: None,
            rows: Vec::new(),
            play_button: None,
            details_button: None,
        }
    }

    /// Returns the index of the currently selected row, if any.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Returns the currently selected record, if any.
    pub fn selected_record(&self) -> Option<&MovieRecord> {
        self.selection.and_then(|index| self.catalog.get(index))
    }

    /// Selects the row at `index`, replacing any previous selection.
    ///
    /// Indexes beyond the end of the catalog are ignored; the UI cannot produce them.
    pub fn select(&mut self, index: usize) {
        match self.catalog.get(index) {
            Some(record) => {
                log::debug!("selected row {}: {}", index, record.title());
                self.selection = Some(index);
            }
            None => log::warn!("ignoring selection of row {} beyond catalog end", index),
        }
    }

    /// Builds the notification for the "Play" action against the current selection.
    ///
    /// No media is actually started; playback begins and ends with the notification.
    pub fn play_notification(&self) -> Notification {
        match self.selected_record() {
            Some(record) => Notification::info(
                PLAYBACK_TITLE,
                format!("Starting movie: {}", record.title()),
            ),
            None => no_selection_warning(),
        }
    }

    /// Builds the notification for the "Details" action against the current selection.
    pub fn details_notification(&self) -> Notification {
        match self.selected_record() {
            Some(record) => Notification::info(record.title(), record.synopsis()),
            None => no_selection_warning(),
        }
    }

    /// Returns the row that a selection moved by `delta` would land on.
    ///
    /// With no selection, any movement lands on the first row. Movement clamps at both ends of
    /// the catalog. Returns `None` when the catalog is empty.
    fn next_selection(&self, delta: i32) -> Option<usize> {
        if self.catalog.is_empty() {
            return None;
        }

        let last = (self.catalog.len() - 1) as i32;
        let next = match self.selection {
            None => 0,
            Some(index) => (index as i32 + delta).clamp(0, last),
        };

        Some(next as usize)
    }

    /// Selects `index` and restyles the rows whose appearance changed.
    fn select_row(&mut self, index: usize, widgets: &Widgets<WidgetKind>) {
        let previous = self.selection;
        self.select(index);

        if previous != self.selection {
            if let Some(prev) = previous {
                self.refresh_row(prev, widgets);
            }
            if let Some(current) = self.selection {
                self.refresh_row(current, widgets);
            }
        }
    }

    /// Moves the selection by `delta` rows, clamped to the catalog bounds.
    fn step_selection(&mut self, delta: i32, widgets: &Widgets<WidgetKind>) {
        if let Some(next) = self.next_selection(delta) {
            self.select_row(next, widgets);
        }
    }

    /// Reapplies the row visuals for `index` based on the current selection.
    fn refresh_row(&self, index: usize, widgets: &Widgets<WidgetKind>) {
        let (record, row) = match (self.catalog.get(index), self.rows.get(index)) {
            (Some(record), Some(row)) => (record, row),
            _ => return,
        };

        let visual = render_row(record, self.selection == Some(index));
        widgets.get_mut(row.backdrop).set_color(visual.background);

        let mut label = widgets.get_mut(row.label);
        if let WidgetKind::Label { background, .. } = &mut *label {
            *background = visual.background;
        }
        label.set_color(visual.foreground);
    }

    /// Maps a hit-tested widget back to the catalog row it belongs to, if any.
    fn row_at(&self, id: WidgetId) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.backdrop == id || row.poster == id || row.label == id)
    }

    fn handle_click(&mut self, x: i32, y: i32, widgets: &mut Widgets<WidgetKind>) -> Action {
        let hit = match widgets.hit_test(x, y) {
            Some(id) => id,
            None => return Action::Continue,
        };

        if Some(hit) == self.play_button {
            return Action::Notify(self.play_notification());
        }

        if Some(hit) == self.details_button {
            return Action::Notify(self.details_notification());
        }

        if let Some(index) = self.row_at(hit) {
            self.select_row(index, widgets);
        }

        Action::Continue
    }
}

impl State<WidgetKind> for Browser {
    fn initialize(&mut self, widgets: &mut Widgets<WidgetKind>) -> anyhow::Result<()> {
        let (max_width, max_height) = widgets.get(widgets.root()).properties().bounds;
        let row_width = max_width - 2 * LEFT_MARGIN as u32;

        for (index, record) in self.catalog.iter().enumerate() {
            let row_y = TOP_MARGIN + (index as u32 * (ROW_HEIGHT + ROW_SPACING)) as i32;
            let visual = render_row(record, false);

            let backdrop = widgets.insert(
                WidgetKind::new_row(LEFT_MARGIN, row_y, row_width),
                widgets.root(),
            );

            let poster = widgets.insert(
                WidgetKind::new_poster(
                    record.poster().clone(),
                    LEFT_MARGIN + ROW_PADDING as i32,
                    row_y + ROW_PADDING as i32,
                ),
                backdrop,
            );

            let label_x = LEFT_MARGIN + (ROW_PADDING + POSTER_WIDTH + LABEL_GAP) as i32;
            let label_y =
                row_y + (ROW_HEIGHT as i32 - approx_text_height(LABEL_POINT_SIZE) as i32) / 2;
            let label_max = row_width - (2 * ROW_PADDING + POSTER_WIDTH + LABEL_GAP);
            let label = widgets.insert(
                WidgetKind::new_label(visual.label, LABEL_POINT_SIZE, label_x, label_y, label_max),
                backdrop,
            );

            self.rows.push(RowWidgets {
                backdrop,
                poster,
                label,
            });
        }

        let button_y = (max_height - BUTTON_HEIGHT - BUTTON_BOTTOM_MARGIN) as i32;
        let center_x = max_width as i32 / 2;

        let play_x = center_x - BUTTON_WIDTH as i32 - BUTTON_SPACING / 2;
        let play = WidgetKind::new_button(PLAY_CAPTION, play_x, button_y);
        self.play_button = Some(widgets.insert(play, widgets.root()));

        let details_x = center_x + BUTTON_SPACING / 2;
        let details = WidgetKind::new_button(DETAILS_CAPTION, details_x, button_y);
        self.details_button = Some(widgets.insert(details, widgets.root()));

        log::debug!("built movie list with {} rows", self.rows.len());

        Ok(())
    }

    fn handle_event(&mut self, event: &Event, widgets: &mut Widgets<WidgetKind>) -> Action {
        match *event {
            Event::Quit { .. } => return Action::Quit,
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => match key {
                Keycode::Escape => return Action::Quit,
                Keycode::Up => self.step_selection(-1, widgets),
                Keycode::Down => self.step_selection(1, widgets),
                _ => {}
            },
            Event::MouseButtonDown {
                mouse_btn: MouseButton::Left,
                x,
                y,
                ..
            } => return self.handle_click(x, y, widgets),
            _ => {}
        }

        Action::Continue
    }
}

/// The visual representation of one catalog row.
#[derive(Clone, Debug, PartialEq)]
pub struct RowVisual {
    /// Text shown next to the poster.
    pub label: String,
    /// Fill color behind the row.
    pub background: Color,
    /// Color of the label text.
    pub foreground: Color,
}

/// Produces the visual representation of `record` as a list row.
///
/// Pure and deterministic: equal inputs always yield equal output, and calling it never touches
/// the widget tree. The selection palette applies only when `is_selected` is set.
pub fn render_row(record: &MovieRecord, is_selected: bool) -> RowVisual {
    let (background, foreground) = if is_selected {
        (SELECTION_BACKGROUND, SELECTION_FOREGROUND)
    } else {
        (ROW_BACKGROUND, ROW_FOREGROUND)
    };

    RowVisual {
        label: record.title().to_owned(),
        background,
        foreground,
    }
}

/// Builds the fixed warning shown when an action fires with nothing selected.
fn no_selection_warning() -> Notification {
    Notification::warning(NO_SELECTION_TITLE, NO_SELECTION_MESSAGE)
}

/// Approximates the rendered height of text at `point_size`, with a bit of bottom padding.
fn approx_text_height(point_size: u16) -> u32 {
    (point_size as f32 * 1.333f32) as u32
}

/// A list of types which implement the [`Widget`](crate::app::Widget) trait.
#[derive(Debug)]
pub enum WidgetKind {
    Root {
        properties: Properties,
    },
    Row {
        properties: Properties,
    },
    Poster {
        art: PosterArt,
        properties: Properties,
    },
    Label {
        text: String,
        point_size: u16,
        background: Color,
        properties: Properties,
    },
    Button {
        caption: String,
        properties: Properties,
    },
}

impl WidgetKind {
    /// Creates a new root widget with the given width and height.
    pub fn new_root(width: u32, height: u32) -> Self {
        WidgetKind::Root {
            properties: Properties {
                bounds: (width, height),
                color: BACKGROUND_COLOR,
                ..Properties::default()
            },
        }
    }

    /// Creates a new row backdrop of the given width located at (X, Y).
    pub fn new_row(x: i32, y: i32, width: u32) -> Self {
        WidgetKind::Row {
            properties: Properties {
                origin: (x, y),
                bounds: (width, ROW_HEIGHT),
                color: ROW_BACKGROUND,
                ..Properties::default()
            },
        }
    }

    /// Creates a new poster widget of fixed size located at (X, Y).
    pub fn new_poster(art: PosterArt, x: i32, y: i32) -> Self {
        WidgetKind::Poster {
            art,
            properties: Properties {
                origin: (x, y),
                bounds: (POSTER_WIDTH, POSTER_HEIGHT),
                color: POSTER_FILL,
                ..Properties::default()
            },
        }
    }

    /// Creates a new label widget with the given text and properties.
    pub fn new_label(text: String, point_size: u16, x: i32, y: i32, max_width: u32) -> Self {
        WidgetKind::Label {
            text,
            point_size,
            background: ROW_BACKGROUND,
            properties: Properties {
                origin: (x, y),
                bounds: (max_width, approx_text_height(point_size)),
                color: ROW_FOREGROUND,
                ..Properties::default()
            },
        }
    }

    /// Creates a new bordered button with the given caption located at (X, Y).
    pub fn new_button(caption: impl Into<String>, x: i32, y: i32) -> Self {
        WidgetKind::Button {
            caption: caption.into(),
            properties: Properties {
                origin: (x, y),
                bounds: (BUTTON_WIDTH, BUTTON_HEIGHT),
                color: BUTTON_COLOR,
                border: Some((BUTTON_BORDER_COLOR, 1)),
                ..Properties::default()
            },
        }
    }
}

impl Widget for WidgetKind {
    fn properties(&self) -> &Properties {
        match self {
            WidgetKind::Root { properties } => properties,
            WidgetKind::Row { properties } => properties,
            WidgetKind::Poster { properties, .. } => properties,
            WidgetKind::Label { properties, .. } => properties,
            WidgetKind::Button { properties, .. } => properties,
        }
    }

    fn properties_mut(&mut self) -> &mut Properties {
        match self {
            WidgetKind::Root { properties } => properties,
            WidgetKind::Row { properties } => properties,
            WidgetKind::Poster { properties, .. } => properties,
            WidgetKind::Label { properties, .. } => properties,
            WidgetKind::Button { properties, .. } => properties,
        }
    }

    fn draw(&mut self, ctx: &mut Context, target: &mut Texture) -> anyhow::Result<()> {
        match self {
            WidgetKind::Root { properties } | WidgetKind::Row { properties } => {
                let color = properties.color;
                ctx.canvas.with_texture_canvas(target, |texture| {
                    texture.set_draw_color(color);
                    texture.clear();
                })?
            }
            WidgetKind::Poster { art, properties } => match art {
                PosterArt::Image(path) => {
                    let image = ctx.assets.load_image(path.clone())?;
                    ctx.canvas.with_texture_canvas(target, |texture| {
                        texture.copy(image, None, None).unwrap();
                    })?;
                }
                PosterArt::Placeholder => {
                    let (width, height) = properties.bounds;
                    let caption = ctx.assets.render_text(
                        FONT_PATH,
                        POSTER_POINT_SIZE,
                        FONT_STYLE,
                        POSTER_INK,
                        width,
                        POSTER_CAPTION,
                    )?;

                    ctx.canvas.with_texture_canvas(target, |texture| {
                        texture.set_draw_color(POSTER_FILL);
                        texture.clear();

                        // White inset frame around the stand-in artwork.
                        texture.set_draw_color(POSTER_INK);
                        let frame = Rect::new(5, 5, width - 10, height - 10);
                        texture.draw_rect(frame).unwrap();

                        let (text_width, text_height) = caption.bounds;
                        let dst = Rect::new(
                            (width.saturating_sub(text_width) / 2) as i32,
                            (height.saturating_sub(text_height) / 2) as i32,
                            text_width,
                            text_height,
                        );
                        texture.copy(&caption.texture, None, dst).unwrap();
                    })?;
                }
            },
            WidgetKind::Label {
                text,
                point_size,
                background,
                properties,
            } => {
                let (wrap_width, _) = properties.bounds;
                let rendered = ctx.assets.render_text(
                    FONT_PATH,
                    *point_size,
                    FONT_STYLE,
                    properties.color,
                    wrap_width,
                    text,
                )?;

                let background = *background;
                ctx.canvas.with_texture_canvas(target, |texture| {
                    texture.set_draw_color(background);
                    texture.clear();

                    let (text_width, text_height) = rendered.bounds;
                    let dst = Rect::new(0, 0, text_width, text_height);
                    texture.copy(&rendered.texture, None, dst).unwrap();
                })?;
            }
            WidgetKind::Button {
                caption,
                properties,
            } => {
                let (width, height) = properties.bounds;
                let rendered = ctx.assets.render_text(
                    FONT_PATH,
                    BUTTON_POINT_SIZE,
                    FONT_STYLE,
                    POSTER_INK,
                    width,
                    caption,
                )?;

                let fill = properties.color;
                ctx.canvas.with_texture_canvas(target, |texture| {
                    texture.set_draw_color(fill);
                    texture.clear();

                    let (text_width, text_height) = rendered.bounds;
                    let dst = Rect::new(
                        (width.saturating_sub(text_width) / 2) as i32,
                        (height.saturating_sub(text_height) / 2) as i32,
                        text_width,
                        text_height,
                    );
                    texture.copy(&rendered.texture, None, dst).unwrap();
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NotificationKind;

    fn two_movies() -> Catalog {
        Catalog::new(vec![
            MovieRecord::new(
                "Inception",
                "A mind-bending thriller about dreams within dreams.",
                PosterArt::Placeholder,
            ),
            MovieRecord::new(
                "Stranger Things",
                "A group of kids uncover supernatural mysteries in their town.",
                PosterArt::Placeholder,
            ),
        ])
    }

    #[test]
    fn warns_when_nothing_is_selected() {
        for catalog in [Catalog::default(), two_movies()] {
            let browser = Browser::new(catalog);
            let expected = Notification::warning(NO_SELECTION_TITLE, NO_SELECTION_MESSAGE);

            assert_eq!(browser.play_notification(), expected);
            assert_eq!(browser.details_notification(), expected);
        }
    }

    #[test]
    fn play_reports_the_selected_title() {
        let mut browser = Browser::new(two_movies());
        browser.select(0);

        let note = browser.play_notification();
        assert_eq!(note.kind, NotificationKind::Info);
        assert_eq!(note.title, "Playback");
        assert_eq!(note.message, "Starting movie: Inception");
    }

    #[test]
    fn details_show_title_and_synopsis() {
        let mut browser = Browser::new(two_movies());
        browser.select(1);

        let note = browser.details_notification();
        assert_eq!(note.kind, NotificationKind::Info);
        assert_eq!(note.title, "Stranger Things");
        assert_eq!(
            note.message,
            "A group of kids uncover supernatural mysteries in their town."
        );
    }

    #[test]
    fn latest_selection_wins() {
        let mut browser = Browser::new(two_movies());
        browser.select(0);
        browser.select(1);

        assert_eq!(browser.selection(), Some(1));
        assert_eq!(
            browser.play_notification().message,
            "Starting movie: Stranger Things"
        );
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut browser = Browser::new(two_movies());
        browser.select(5);
        assert_eq!(browser.selection(), None);

        browser.select(1);
        browser.select(9);
        assert_eq!(browser.selection(), Some(1));
    }

    #[test]
    fn selection_survives_a_dismissed_notification() {
        let mut browser = Browser::new(two_movies());
        browser.select(0);

        let _ = browser.play_notification();
        let _ = browser.details_notification();
        assert_eq!(browser.selection(), Some(0));
    }

    #[test]
    fn stepping_moves_from_nothing_to_the_first_row() {
        let mut browser = Browser::new(two_movies());
        assert_eq!(browser.next_selection(1), Some(0));
        assert_eq!(browser.next_selection(-1), Some(0));

        browser.select(0);
        assert_eq!(browser.next_selection(1), Some(1));
    }

    #[test]
    fn stepping_clamps_at_both_ends() {
        let mut browser = Browser::new(two_movies());
        browser.select(0);
        assert_eq!(browser.next_selection(-1), Some(0));

        browser.select(1);
        assert_eq!(browser.next_selection(1), Some(1));
    }

    #[test]
    fn stepping_does_nothing_on_an_empty_catalog() {
        let browser = Browser::new(Catalog::default());
        assert_eq!(browser.next_selection(1), None);
        assert_eq!(browser.next_selection(-1), None);
    }

    #[test]
    fn render_row_is_deterministic() {
        let catalog = two_movies();
        let record = catalog.get(0).unwrap();

        assert_eq!(render_row(record, true), render_row(record, true));
        assert_eq!(render_row(record, false), render_row(record, false));
    }

    #[test]
    fn render_row_applies_the_selection_palette() {
        let catalog = two_movies();
        let record = catalog.get(0).unwrap();

        let selected = render_row(record, true);
        let unselected = render_row(record, false);

        assert_eq!(selected.label, "Inception");
        assert_eq!(unselected.label, "Inception");
        assert_ne!(selected.background, unselected.background);
        assert_eq!(selected.background, SELECTION_BACKGROUND);
        assert_eq!(unselected.background, ROW_BACKGROUND);
    }
}
