// MIT/Apache2 License

use super::{cache::CacheInner, Image, ImageCache, ResourceIndex};
use crate::LoadError;
use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    sync::{Arc, Weak},
};

/// The host facility that turns a source into an [`Image`].
///
/// `load` is called once per distinct source. It should start loading and return right away, then report the
/// outcome through `completion` whenever it is ready, from whichever thread it likes. Completing inside of `load`
/// itself is also fine.
pub trait ImageLoader {
    /// Begin loading `source`.
    fn load(&self, source: &str, completion: LoadCompletion);
}

impl<F: Fn(&str, LoadCompletion) + ?Sized> ImageLoader for F {
    #[inline]
    fn load(&self, source: &str, completion: LoadCompletion) {
        (self)(source, completion)
    }
}

/// A one-shot token used to report the outcome of a load.
///
/// Reporting consumes the token, so a resource settles at most once. Dropping the token without reporting
/// settles the resource as [`LoadError::Abandoned`], so it settles at least once as well.
#[derive(Debug)]
pub struct LoadCompletion {
    cache: Weak<CacheInner>,
    index: ResourceIndex,
    source: String,
    reported: bool,
}

impl LoadCompletion {
    #[inline]
    pub(crate) fn new(cache: Weak<CacheInner>, index: ResourceIndex, source: &str) -> Self {
        Self {
            cache,
            index,
            source: source.to_string(),
            reported: false,
        }
    }

    /// The source being loaded.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The resource this completion settles.
    #[inline]
    pub fn index(&self) -> ResourceIndex {
        self.index
    }

    /// Report that the source loaded as `image`. Every draw waiting on it is replayed before this returns; if any
    /// of them failed, the first error is returned.
    #[inline]
    pub fn complete(mut self, image: Image) -> crate::Result {
        self.report(Ok(image))
    }

    /// Report that the source could not be loaded.
    #[inline]
    pub fn fail(mut self, reason: impl Into<String>) -> crate::Result {
        self.report(Err(LoadError::Failed(reason.into())))
    }

    fn report(&mut self, result: Result<Image, LoadError>) -> crate::Result {
        self.reported = true;
        match self.cache.upgrade() {
            Some(inner) => ImageCache::from_inner(inner).complete(self.index, result),
            None => {
                log::debug!("Cache for \"{}\" is gone, discarding load result", self.source);
                Ok(())
            }
        }
    }
}

impl Drop for LoadCompletion {
    fn drop(&mut self) {
        if !self.reported {
            if let Err(e) = self.report(Err(LoadError::Abandoned)) {
                log::error!("Failed to abandon load of \"{}\": {}", self.source, e);
            }
        }
    }
}

/// A loader that parks every request until the host resolves it.
///
/// This suits hosts that decode images on their own event loop: pull a completion out with `take` or `pop`,
/// load the source however is convenient, then `complete` or `fail` it. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct QueuedLoader {
    queue: Arc<Mutex<VecDeque<LoadCompletion>>>,
}

impl QueuedLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of loads waiting to be resolved.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// The sources waiting to be resolved, oldest first.
    pub fn sources(&self) -> Vec<String> {
        self.queue
            .lock()
            .iter()
            .map(|completion| completion.source.clone())
            .collect()
    }

    /// Remove the oldest request.
    #[inline]
    pub fn pop(&self) -> Option<LoadCompletion> {
        self.queue.lock().pop_front()
    }

    /// Remove the request for `source`, if there is one.
    pub fn take(&self, source: &str) -> Option<LoadCompletion> {
        let mut queue = self.queue.lock();
        let position = queue
            .iter()
            .position(|completion| completion.source == source)?;
        queue.remove(position)
    }
}

impl ImageLoader for QueuedLoader {
    #[inline]
    fn load(&self, source: &str, completion: LoadCompletion) {
        log::trace!("Queueing load of \"{}\"", source);
        self.queue.lock().push_back(completion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{image, init_logger};

    #[test]
    fn queue_resolves_by_source() {
        init_logger();
        let loader = QueuedLoader::new();
        let cache = ImageCache::new(loader.clone());
        let a = cache.register("a.png").index;
        let b = cache.register("b.png").index;
        assert_eq!(loader.sources(), vec!["a.png".to_string(), "b.png".to_string()]);

        let completion = loader.take("b.png").unwrap();
        assert_eq!(completion.source(), "b.png");
        assert_eq!(completion.index(), b);
        assert!(loader.take("b.png").is_none());
        completion.complete(image(2)).unwrap();

        assert_eq!(cache.image(b).unwrap(), image(2));
        assert!(cache.image(a).is_err());
        assert_eq!(loader.len(), 1);
    }
}
