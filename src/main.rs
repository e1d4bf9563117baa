use anyhow::Error;
use reel_menu::app::App;
use reel_menu::browser::{Browser, WidgetKind};
use reel_menu::catalog;

const WINDOW_TITLE: &str = "Reel Menu";
const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 840;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let context = sdl2::init().map_err(Error::msg)?;
    let video_sys = context.video().map_err(Error::msg)?;

    let window = video_sys
        .window(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT)
        .position_centered()
        .build()?;

    let catalog = catalog::seed();
    log::info!("seeded catalog with {} movies", catalog.len());

    let root_widget = WidgetKind::new_root(WINDOW_WIDTH, WINDOW_HEIGHT);
    App::new(Browser::new(catalog), root_widget)
        .with_error_message_box(WINDOW_TITLE)
        .run(context, window)
}
