//! `<audio>` playback. One preloaded element per sound, cloned per play so
//! overlapping plays do not cut each other off.

use valalah_core::{EffectError, EffectResult, Sound, SoundConfig, SoundLoader};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlAudioElement;

fn audio_error(err: &JsValue) -> EffectError {
    EffectError::Audio(format!("{err:?}"))
}

/// A preloaded sound.
pub struct HtmlSound {
    template: HtmlAudioElement,
    volume: f64,
}

impl Sound for HtmlSound {
    fn play(&mut self) -> EffectResult<()> {
        let audio: HtmlAudioElement = self
            .template
            .clone_node()
            .map_err(|e| audio_error(&e))?
            .dyn_into()
            .map_err(|e| audio_error(&e))?;
        audio.set_volume(self.volume);
        // Autoplay rejections arrive later through the promise and only show
        // up in the console.
        let _ = audio.play().map_err(|e| audio_error(&e))?;
        Ok(())
    }
}

/// Loads sounds as `<audio>` elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlSoundLoader;

impl SoundLoader for HtmlSoundLoader {
    fn load(&mut self, config: &SoundConfig) -> EffectResult<Box<dyn Sound>> {
        let template = HtmlAudioElement::new_with_src(&config.src).map_err(|e| audio_error(&e))?;
        let volume = f64::from(config.volume);
        template.set_volume(volume);
        Ok(Box::new(HtmlSound { template, volume }))
    }
}
