//! Generic abstraction for UI applications.

pub use self::widget::{Assets, Context, Properties, RenderedText, Widget, WidgetId, Widgets};

use std::time::{Duration, Instant};

use anyhow::Error;
use sdl2::event::Event;
use sdl2::messagebox::{show_simple_message_box, MessageBoxFlag};
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::Sdl;

const TARGET_FRAME_RATE: u16 = 60;
const ERROR_BOX_KIND: MessageBoxFlag = MessageBoxFlag::ERROR;

mod widget;

/// An action to take upon receiving an SDL event.
#[derive(Clone, Debug)]
pub enum Action {
    /// Continue to run the application.
    Continue,
    /// Display a modal notification, then continue to run.
    Notify(Notification),
    /// Shut down the application.
    Quit,
}

/// A modal, user-dismissible message box requested by the application state.
///
/// Construction is plain data and requires no live SDL context, so states can
/// build and inspect notifications in unit tests. The [`App`] event loop is
/// what actually puts one on screen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    /// Severity of the notification.
    pub kind: NotificationKind,
    /// Title shown in the message box title bar.
    pub title: String,
    /// Body text of the message box.
    pub message: String,
}

impl Notification {
    /// Creates an informational notification.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a warning notification.
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Warning,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// A list of supported notification severities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotificationKind {
    /// Conveys information about an action that took place.
    Info,
    /// Prompts the user to correct something before retrying.
    Warning,
}

impl NotificationKind {
    fn message_box_flag(self) -> MessageBoxFlag {
        match self {
            NotificationKind::Info => MessageBoxFlag::INFORMATION,
            NotificationKind::Warning => MessageBoxFlag::WARNING,
        }
    }
}

/// A trait implemented by the main application state.
pub trait State<W: Widget> {
    /// This method is called at initialization time, before any drawing has taken place, and is
    /// responsible for building the initial UI widget layout of the application.
    ///
    /// This trait method is _required_ and is guaranteed to only be called once.
    fn initialize(&mut self, widgets: &mut Widgets<W>) -> anyhow::Result<()>;

    /// This callback is called every time an [SDL event](sdl2::event::Event) is produced from the
    /// window event loop.
    ///
    /// Returns an [`Action`] specifying whether the application should continue to run, display a
    /// modal notification, or quit.
    ///
    /// This trait method is _provided_. If it is not implemented, this method will do nothing and
    /// always return [`Action::Continue`].
    fn handle_event(&mut self, _event: &Event, _widgets: &mut Widgets<W>) -> Action {
        Action::Continue
    }
}

/// Engine which drives the application state and event loop.
#[derive(Debug)]
pub struct App<W, S> {
    state: S,
    root_widget: W,
    error_message_box: Option<&'static str>,
}

impl<W: Widget, S: State<W>> App<W, S> {
    /// Creates a new `App` with the given application [`State`] and root widget.
    #[inline]
    pub fn new(state: S, root_widget: W) -> Self {
        App {
            state,
            root_widget,
            error_message_box: None,
        }
    }

    /// Displays fatal errors in a graphical error message box whenever possible.
    ///
    /// Certain classes of errors, e.g. fatal SDL initialization errors and message box display
    /// errors, naturally cannot be displayed in a message box. The resulting error chain can still
    /// be inspected in its entirety via the return value of [`App::run()`].
    ///
    /// This setting is not enabled by default.
    #[inline]
    pub fn with_error_message_box(mut self, window_title: &'static str) -> Self {
        self.error_message_box = Some(window_title);
        self
    }

    /// Executes the main loop with the given [`Sdl`](sdl2::Sdl) context and
    /// [`Window`](sdl2::video::Window) handle.
    ///
    /// Returns `Ok` when the application has exited successfully, or returns `Err` if the
    /// application failed to initialize or an SDL error was encountered.
    #[inline]
    pub fn run(self, sdl: Sdl, window: Window) -> anyhow::Result<()> {
        let mut canvas = window.into_canvas().accelerated().present_vsync().build()?;

        let error_message_box = self.error_message_box;
        let result = self.main_loop(sdl, &mut canvas);

        if let Some((window_title, error)) = error_message_box.zip(result.as_ref().err()) {
            let message = format!("{:?}", error);
            show_simple_message_box(ERROR_BOX_KIND, window_title, &message, canvas.window())?;
        }

        result
    }

    fn main_loop(mut self, sdl: Sdl, canvas: &mut Canvas<Window>) -> anyhow::Result<()> {
        let mut events = sdl.event_pump().map_err(Error::msg)?;

        let texture_creator = canvas.texture_creator();
        let assets = Assets::new(&texture_creator)?;
        let mut widgets = Widgets::new(self.root_widget, assets);

        // Build and populate the `Widgets` cache.
        self.state.initialize(&mut widgets)?;

        'running: loop {
            let start = Instant::now();

            // Handle all pending SDL events.
            for event in events.poll_iter() {
                match self.state.handle_event(&event, &mut widgets) {
                    Action::Continue => {}
                    Action::Notify(note) => notify(&note, canvas.window())?,
                    Action::Quit => break 'running,
                }
            }

            // Advance the internal state of the widgets.
            widgets.update();

            // Draw the next frame onto the canvas.
            if widgets.is_invalidated() {
                widgets.draw(canvas)?;
            }

            let frame_time = start.elapsed();
            let target_frame_time = Duration::from_secs_f64(1.0 / TARGET_FRAME_RATE as f64);

            // Put the CPU to sleep to save power, if necessary.
            if frame_time < target_frame_time {
                std::thread::sleep(target_frame_time - frame_time);
            }
        }

        Ok(())
    }
}

/// Blocks on a modal message box over `window` until the user dismisses it.
///
/// Input directed at the rest of the window is suspended while the box is up,
/// but nothing else runs in this process, so there is nothing to stall.
fn notify(note: &Notification, window: &Window) -> anyhow::Result<()> {
    log::debug!("showing {:?} notification: {}", note.kind, note.title);

    let flag = note.kind.message_box_flag();
    show_simple_message_box(flag, &note.title, &note.message, window)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_severity() {
        let info = Notification::info("Playback", "Starting movie: Inception");
        assert_eq!(info.kind, NotificationKind::Info);
        assert_eq!(info.title, "Playback");

        let warning = Notification::warning("No movie selected", "Select a movie from the list");
        assert_eq!(warning.kind, NotificationKind::Warning);
        assert_eq!(warning.message, "Select a movie from the list");
    }

    #[test]
    fn severities_map_to_distinct_message_box_flags() {
        let info = NotificationKind::Info.message_box_flag();
        let warning = NotificationKind::Warning.message_box_flag();
        assert_ne!(info, warning);
    }
}
