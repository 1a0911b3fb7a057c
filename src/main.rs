#[cfg(target_arch = "wasm32")]
mod web {
    use std::{cell::RefCell, io, rc::Rc};

    use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
    use ratzilla::ratatui::Terminal;
    use ratzilla::{DomBackend, WebRenderer};

    use tap_earn::auth::MemoryAuthenticator;
    use tap_earn::config::EconomyConfig;
    use tap_earn::error::GameResult;
    use tap_earn::game::accounts::{self, Registration};
    use tap_earn::game::session::Session;
    use tap_earn::game::TapGame;
    use tap_earn::input::{ClickState, InputEvent};
    use tap_earn::rng::SeedRng;
    use tap_earn::store::{Collection, DocumentStore, LocalStorageStore};
    use tap_earn::time::{BrowserClock, Clock};

    /// localStorage key remembering which account this browser plays.
    const UID_KEY: &str = "tap_earn_uid";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    fn saved_uid() -> Option<String> {
        storage()?.get_item(UID_KEY).ok().flatten()
    }

    fn remember_uid(uid: &str) {
        if let Some(s) = storage() {
            if s.set_item(UID_KEY, uid).is_err() {
                web_sys::console::warn_1(&"Tap Earn: could not remember account".into());
            }
        }
    }

    /// Open this browser's account, registering a fresh one on first visit.
    fn boot() -> GameResult<TapGame> {
        let config = Rc::new(EconomyConfig::embedded()?);
        let store: Rc<dyn DocumentStore> = Rc::new(LocalStorageStore::open()?);
        let clock: Rc<dyn Clock> = Rc::new(BrowserClock);

        let existing = match saved_uid() {
            Some(uid) if store.get_document(Collection::Users, &uid)?.is_some() => Some(uid),
            _ => None,
        };
        let uid = match existing {
            Some(uid) => uid,
            None => {
                let seed = clock.now_ms();
                let mut rng = SeedRng::new(seed);
                let mut auth = MemoryAuthenticator::new(seed.rotate_left(17));
                let username = format!("player-{}", rng.hex(8));
                let password = rng.hex(16);
                let form = Registration {
                    username: &username,
                    email: "",
                    password: &password,
                    avatar: None,
                };
                let state = accounts::register(&*store, &mut auth, &mut rng, &form, &config)?;
                remember_uid(&state.account.uid);
                state.account.uid
            }
        };

        let session = Session::open(store, &uid, config, clock)?;
        Ok(TapGame::new(session))
    }

    /// Pixel position relative to the grid container, with its size.
    fn grid_position(mouse_x: u32, mouse_y: u32) -> Option<(f64, f64, f64, f64)> {
        let document = web_sys::window()?.document()?;
        // DomBackend creates a <div> as the grid container inside <body>.
        let grid = document.query_selector("body > div").ok()??;
        let rect = grid.get_bounding_client_rect();
        Some((
            mouse_x as f64 - rect.left(),
            mouse_y as f64 - rect.top(),
            rect.width(),
            rect.height(),
        ))
    }

    pub fn run() -> io::Result<()> {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();

        let game = match boot() {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                web_sys::console::error_1(&format!("Tap Earn: {e}").into());
                return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
            }
        };
        let click_state = Rc::new(RefCell::new(ClickState::new()));
        let backend = DomBackend::new()?;
        let terminal = Terminal::new(backend)?;

        // Mouse/touch click handler
        terminal.on_mouse_event({
            let game = game.clone();
            let click_state = click_state.clone();
            move |mouse_event| {
                if mouse_event.event != MouseEventKind::Pressed
                    || mouse_event.button != MouseButton::Left
                {
                    return;
                }
                let Some((x, y, w, h)) = grid_position(mouse_event.x, mouse_event.y) else {
                    return;
                };
                let event = click_state.borrow().click_at(x, y, w, h);
                if let Some(event) = event {
                    game.borrow_mut().handle_input(&event);
                }
            }
        });

        // Keyboard handler
        terminal.on_key_event({
            let game = game.clone();
            move |key_event| {
                if let KeyCode::Char(c) = key_event.code {
                    game.borrow_mut().handle_input(&InputEvent::Key(c));
                }
            }
        });

        terminal.draw_web(move |f| {
            game.borrow_mut().tick();

            let size = f.area();
            click_state.borrow_mut().begin_frame(size.width, size.height);
            game.borrow().render(f, size, &click_state);
        });

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn main() -> std::io::Result<()> {
    web::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("tap-earn runs in the browser; build it for wasm32-unknown-unknown.");
}
