//! # Page Wiring
//!
//! Connects the theme stage to the document:
//!
//! ```text
//! DOMContentLoaded ─► document_ready      beforeunload ─► before_unload
//! mousemove ────────► on_pointer_move     click [data-entity] ─► on_interact
//! ```
//!
//! and exports the entry points the site calls: `startTheme(name)` and one
//! `cleanup*` function per theme.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;
use valalah_core::{Dispatch, EffectError, Viewport, Wakeup};
use valalah_themes::{Theme, ThemeFactory, ThemeKind, ThemeOverrides, ThemeParts, ThemeStage};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, MouseEvent, Window};

use crate::dom::DomSurface;
use crate::markup::{self, ENTITY_ATTR, ENTITY_SELECTOR};
use crate::sound::HtmlSoundLoader;
use crate::timers::{BrowserScheduler, DispatchTarget};

/// The stage as it runs in the browser.
pub type BrowserStage = ThemeStage<DomSurface, BrowserScheduler, ChaCha8Rng>;

/// Holds the stage once it exists. Timers deliver here.
#[derive(Default)]
struct StageSlot(Option<BrowserStage>);

impl Dispatch for StageSlot {
    fn dispatch(&mut self, wakeup: Wakeup) {
        if let Some(stage) = self.0.as_mut() {
            stage.dispatch(wakeup);
        }
    }
}

/// Everything that must outlive the call to `startTheme`.
struct Page {
    slot: Rc<RefCell<StageSlot>>,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn viewport(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        #[allow(clippy::cast_possible_truncation)]
        let px = value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        px
    };
    Viewport {
        width_px: dimension(window.inner_width()),
        height_px: dimension(window.inner_height()),
        touch: js_sys::Reflect::has(window, &JsValue::from_str("ontouchstart")).unwrap_or(false),
    }
}

fn seeded_rng() -> ChaCha8Rng {
    let mut seed = [0u8; 32];
    match getrandom::fill(&mut seed) {
        Ok(()) => ChaCha8Rng::from_seed(seed),
        Err(err) => {
            warn!(error = %err, "no system entropy, seeding from the clock");
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let fallback = js_sys::Date::now() as u64;
            ChaCha8Rng::seed_from_u64(fallback)
        }
    }
}

fn browser_factory(
    window: Window,
    document: Document,
    target: DispatchTarget,
) -> ThemeFactory<DomSurface, BrowserScheduler, ChaCha8Rng> {
    let overrides = ThemeOverrides::none();
    Box::new(move |kind| {
        let parts = ThemeParts {
            surface: DomSurface::new(&document),
            scheduler: BrowserScheduler::new(window.clone(), target.clone()),
            rng: seeded_rng(),
        };
        Theme::build(kind, &overrides, &viewport(&window), parts, &mut HtmlSoundLoader)
    })
}

/// Runs `f` on the stage, if there is one and it is not busy.
fn with_stage(slot: &RefCell<StageSlot>, f: impl FnOnce(&mut BrowserStage)) {
    match slot.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(stage) = slot.0.as_mut() {
                f(stage);
            }
        }
        Err(_) => warn!("stage busy, event dropped"),
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    slot: &Rc<RefCell<StageSlot>>,
    handler: fn(&mut BrowserStage, &Event),
) -> Result<Closure<dyn FnMut(Event)>, JsValue> {
    let slot = Rc::clone(slot);
    let closure: Closure<dyn FnMut(Event)> = Closure::new(move |event: Event| {
        with_stage(&slot, |stage| handler(stage, &event));
    });
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

fn pointer_time() -> Duration {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now());
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn on_mouse_move(stage: &mut BrowserStage, event: &Event) {
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        #[allow(clippy::cast_precision_loss)]
        let (x, y) = (mouse.client_x() as f32, mouse.client_y() as f32);
        stage.on_pointer_move(x, y, pointer_time());
    }
}

fn on_click(stage: &mut BrowserStage, event: &Event) {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    let Ok(Some(node)) = element.closest(ENTITY_SELECTOR) else {
        return;
    };
    let Some(id) = node.get_attribute(ENTITY_ATTR).as_deref().and_then(markup::parse_entity) else {
        return;
    };
    let rect = node.get_bounding_client_rect();
    #[allow(clippy::cast_possible_truncation)]
    let center = (
        (rect.left() + rect.width() / 2.0) as f32,
        (rect.top() + rect.height() / 2.0) as f32,
    );
    stage.on_interact(id, center);
}

fn create_page(window: &Window, document: &Document, kind: ThemeKind) -> Result<Page, JsValue> {
    let slot = Rc::new(RefCell::new(StageSlot::default()));
    let target: DispatchTarget = Rc::downgrade(&slot);

    let stage = ThemeStage::new(kind, browser_factory(window.clone(), document.clone(), target))
        .map_err(js_error)?;
    slot.borrow_mut().0 = Some(stage);

    let listeners = vec![
        listen(window, "beforeunload", &slot, |stage, _| stage.before_unload())?,
        listen(document, "mousemove", &slot, on_mouse_move)?,
        listen(document, "click", &slot, on_click)?,
        listen(document, "DOMContentLoaded", &slot, |stage, _| stage.document_ready())?,
    ];
    if document.ready_state() != "loading" {
        with_stage(&slot, BrowserStage::document_ready);
    }

    Ok(Page {
        slot,
        _listeners: listeners,
    })
}

/// Shows theme `name` (`winter`, `easter-eggs`, ...). The first call wires
/// the page; later calls switch themes.
///
/// # Errors
///
/// Throws for an unknown theme name or a page without a body.
#[wasm_bindgen(js_name = startTheme)]
pub fn start_theme(name: &str) -> Result<(), JsValue> {
    let kind: ThemeKind = name.parse().map_err(js_error)?;
    let window = web_sys::window().ok_or_else(|| js_error(EffectError::Surface("no window".into())))?;
    let document = window
        .document()
        .ok_or_else(|| js_error(EffectError::Surface("no document".into())))?;

    PAGE.with(|page| {
        let mut page = page.borrow_mut();
        if let Some(existing) = page.as_ref() {
            let mut result = Ok(());
            with_stage(&existing.slot, |stage| result = stage.switch_to(kind).map_err(js_error));
            return result;
        }
        *page = Some(create_page(&window, &document, kind)?);
        Ok(())
    })
}

/// Stops `kind` if it is the active theme.
fn cleanup(kind: ThemeKind) {
    PAGE.with(|page| {
        if let Some(page) = page.borrow().as_ref() {
            with_stage(&page.slot, |stage| {
                if stage.kind() == kind {
                    stage.stop();
                }
            });
        }
    });
}

/// Removes every leaf and stops spawning.
#[wasm_bindgen(js_name = cleanupAutumnLeaves)]
pub fn cleanup_autumn_leaves() {
    cleanup(ThemeKind::Autumn);
}

/// Removes every snowflake and stops spawning.
#[wasm_bindgen(js_name = cleanupWinterSnowflakes)]
pub fn cleanup_winter_snowflakes() {
    cleanup(ThemeKind::Winter);
}

/// Removes every egg and chocolate piece and stops spawning.
#[wasm_bindgen(js_name = cleanupEasterEggs)]
pub fn cleanup_easter_eggs() {
    cleanup(ThemeKind::Easter);
}

/// Removes the glow, trail and sparkles and stops following the pointer.
#[wasm_bindgen(js_name = cleanupSummerGlow)]
pub fn cleanup_summer_glow() {
    cleanup(ThemeKind::Summer);
}
