use std::collections::BTreeMap;

use log::debug;

use crate::{
    constants::{FRAMERANGE_SERVICE, INTERNAL_SERVICE, VARISPEED_SERVICE},
    error::ProducerError,
    filter::framerange::FrameRangeFilter,
    producer::{
        FrameSource, blank::BlankProducer, loader, tone::ToneProducer,
        varispeed::VarispeedProducer, wav::WavProducer,
    },
    profile::Profile,
};

/// Builds a producer for `resource`. Receives the factory so decorators can
/// create the source they wrap.
pub type ProducerConstructor =
    fn(&Factory, &Profile, &str) -> Result<Box<dyn FrameSource>, ProducerError>;

/// Registry of producer constructors keyed by service id.
#[derive(Debug, Clone, Default)]
pub struct Factory {
    services: BTreeMap<String, ProducerConstructor>,
}

impl Factory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with every built-in service registered.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register("blank", BlankProducer::create);
        factory.register("tone", ToneProducer::create);
        factory.register("wav", WavProducer::create);
        factory.register(INTERNAL_SERVICE, loader::create);
        factory.register(VARISPEED_SERVICE, VarispeedProducer::create);
        factory.register(FRAMERANGE_SERVICE, FrameRangeFilter::create);
        factory
    }

    /// Registers `constructor` under `service`, replacing any previous entry.
    pub fn register(&mut self, service: impl Into<String>, constructor: ProducerConstructor) {
        self.services.insert(service.into(), constructor);
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn producer(
        &self,
        profile: &Profile,
        service: &str,
        resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        let constructor = self
            .services
            .get(service)
            .ok_or_else(|| ProducerError::UnknownService(service.to_owned()))?;

        debug!("Creating '{service}' producer for '{resource}'");
        constructor(self, profile, resource)
    }
}
