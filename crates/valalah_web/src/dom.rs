//! # DOM Surface
//!
//! Every node is a `div` appended to `<body>`. Position and animation timing
//! go into inline styles; the theme stylesheet does the actual animating.

use tracing::debug;
use valalah_core::{EffectError, EffectResult, EntityId, Mark, Placement, Sprite, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::markup::{self, CRACKED_CLASS, ENTITY_ATTR};

fn surface_error(err: &JsValue) -> EffectError {
    EffectError::Surface(format!("{err:?}"))
}

/// Draws particles into the live document.
///
/// The body is looked up on every create, so a surface built while the
/// document is still loading works once the body exists.
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    /// Binds to `document`.
    #[must_use]
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
        }
    }

    fn body(&self) -> EffectResult<HtmlElement> {
        self.document
            .body()
            .ok_or_else(|| EffectError::Surface("document has no body".into()))
    }

    fn style(node: &HtmlElement, property: &str, value: &str) -> EffectResult<()> {
        node.style()
            .set_property(property, value)
            .map_err(|e| surface_error(&e))
    }
}

impl Surface for DomSurface {
    type Node = HtmlElement;

    fn create(&mut self, sprite: &Sprite<'_>) -> EffectResult<HtmlElement> {
        let body = self.body()?;
        let node: HtmlElement = self
            .document
            .create_element("div")
            .map_err(|e| surface_error(&e))?
            .dyn_into()
            .map_err(|e| surface_error(&e))?;

        node.set_class_name(sprite.class);
        if let Some(tint) = sprite.tint {
            node.class_list().add_1(tint).map_err(|e| surface_error(&e))?;
        }
        if let Some(glyph) = sprite.glyph {
            node.set_text_content(Some(glyph));
        }

        match sprite.placement {
            Placement::Column { left_vw } => Self::style(&node, "left", &markup::vw(left_vw))?,
            Placement::Point { x, y } => {
                Self::style(&node, "left", &markup::px(x))?;
                Self::style(&node, "top", &markup::px(y))?;
            }
        }
        if let Some(timing) = sprite.timing {
            Self::style(&node, "animation-duration", &timing.css())?;
        }
        if let Some((tx, ty)) = sprite.drift {
            Self::style(&node, "--tx", &markup::px(tx))?;
            Self::style(&node, "--ty", &markup::px(ty))?;
        }

        body.append_child(&node).map_err(|e| surface_error(&e))?;
        Ok(node)
    }

    fn place(&mut self, node: &HtmlElement, x: f32, y: f32) {
        let placed = Self::style(node, "left", &markup::px(x))
            .and_then(|()| Self::style(node, "top", &markup::px(y)));
        if let Err(err) = placed {
            debug!(error = %err, "place failed");
        }
    }

    fn mark(&mut self, node: &HtmlElement, mark: Mark) {
        let marked = match mark {
            Mark::Cracked => node.class_list().add_1(CRACKED_CLASS).map_err(|e| surface_error(&e)),
            Mark::Fading => Self::style(node, "opacity", "0"),
        };
        if let Err(err) = marked {
            debug!(error = %err, ?mark, "mark failed");
        }
    }

    fn attach(&mut self, node: &HtmlElement, id: EntityId) {
        if let Err(err) = node.set_attribute(ENTITY_ATTR, &markup::entity_attr(id)) {
            debug!(error = ?err, ?id, "attach failed, node will not be clickable");
        }
    }

    fn remove(&mut self, node: HtmlElement) {
        node.remove();
    }
}
