use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::KeyCode;
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;

use tap_to_empire::app::App;
use tap_to_empire::engine::save;
use tap_to_empire::render;
use tap_to_empire::time::now_ms;

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    // Load + offline catch-up happen here, before any handler is registered.
    let app = Rc::new(RefCell::new(App::start(save::default_store(), now_ms())));
    save_on_exit(&app);
    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                // Only hard reset is case-sensitive.
                let key = if c == 'R' { c } else { c.to_ascii_lowercase() };
                app.borrow_mut().handle_key(key, now_ms());
            }
        }
    });

    terminal.draw_web(move |f| {
        let now = now_ms();
        let mut app = app.borrow_mut();
        app.frame(now);
        render::render(f, &app, now);
    });

    Ok(())
}

/// Save when the page is closed or hidden for good.
fn save_on_exit(app: &Rc<RefCell<App>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_exit = Closure::<dyn FnMut()>::new({
        let app = app.clone();
        move || {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.checkpoint(now_ms());
            }
        }
    });
    for event in ["pagehide", "beforeunload"] {
        if let Err(e) =
            window.add_event_listener_with_callback(event, on_exit.as_ref().unchecked_ref())
        {
            web_sys::console::warn_1(&e);
        }
    }
    // The listener lives as long as the page.
    on_exit.forget();
}
