//! Resource loader backing the internal service.
//!
//! Picks a concrete producer from the shape of the resource string:
//! `blank`, `tone`, `tone:<hz>` or a path ending in `.wav`.

use std::path::Path;

use log::debug;

use crate::{
    error::ProducerError,
    factory::Factory,
    producer::{FrameSource, blank::BlankProducer, tone::ToneProducer, wav::WavProducer},
    profile::Profile,
};

pub fn create(
    factory: &Factory,
    profile: &Profile,
    resource: &str,
) -> Result<Box<dyn FrameSource>, ProducerError> {
    let resource = resource.trim();

    if resource == "blank" {
        debug!("Loading blank producer");
        return BlankProducer::create(factory, profile, resource);
    }

    if let Some(freq) = resource.strip_prefix("tone") {
        let freq = match freq.strip_prefix(':') {
            Some(freq) => freq,
            None if freq.is_empty() => "",
            None => return Err(ProducerError::UnsupportedResource(resource.to_owned())),
        };
        debug!("Loading tone producer ({freq})");
        return ToneProducer::create(factory, profile, freq);
    }

    let is_wav = Path::new(resource)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if is_wav {
        debug!("Loading WAV producer for '{resource}'");
        return WavProducer::create(factory, profile, resource);
    }

    Err(ProducerError::UnsupportedResource(resource.to_owned()))
}
