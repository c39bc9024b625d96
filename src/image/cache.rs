// MIT/Apache2 License

use super::{Image, ImageDrawable, ImageLoader, LoadCompletion};
use crate::{Error, LoadError, SharedContext};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt, mem,
    sync::Arc,
};

#[cfg(feature = "async")]
use std::task::{Context, Poll, Waker};

/// Identifies one resource inside of an [`ImageCache`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ResourceIndex(usize);

impl ResourceIndex {
    /// Get the position of the resource in its cache.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

/// The result of registering a source with an [`ImageCache`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Registration {
    /// The resource the source maps to.
    pub index: ResourceIndex,
    /// Was the resource already loaded when it was registered?
    pub already_loaded: bool,
}

/// Where a resource is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    Loading,
    Loaded,
    Failed,
}

/// What happened to a draw request handed to [`ImageCache::enqueue_draw`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Enqueued {
    /// The request was queued and will be replayed once the resource loads.
    Deferred,
    /// The resource has already loaded; the caller should draw this image now.
    Ready(Image),
}

/// A registry of image resources, keyed by source.
///
/// Every distinct source is loaded exactly once, no matter how many [`ImageDrawable`]s refer to it. While a
/// resource is loading, draws against it are queued as pending requests; when the loader reports completion the
/// queue is replayed once, in the order the requests were made, and then discarded. Resources are never evicted.
///
/// `ImageCache` is a cheap handle; clones refer to the same registry. Access is serialized by one lock over the
/// resource table and one lock per resource, so loaders may report completion from any thread.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<CacheInner>,
}

pub(crate) struct CacheInner {
    loader: Box<dyn ImageLoader + Send + Sync>,
    table: Mutex<ResourceTable>,
}

#[derive(Default)]
struct ResourceTable {
    by_source: HashMap<String, ResourceIndex>,
    resources: Vec<Arc<Resource>>,
}

/// One image source and everything waiting on it.
pub(crate) struct Resource {
    source: String,
    state: Mutex<LoadState>,
}

enum LoadState {
    Loading(Waiting),
    Loaded(Image),
    Failed(LoadError),
}

#[derive(Default)]
struct Waiting {
    pending: Vec<PendingRequest>,
    #[cfg(feature = "async")]
    listeners: Vec<Waker>,
}

/// A draw that was requested before its image loaded. A request without a context only marks the drawable as
/// loaded when replayed.
struct PendingRequest {
    context: Option<SharedContext>,
    drawable: ImageDrawable,
}

impl ImageCache {
    /// Create an empty cache that starts loads through `loader`.
    #[inline]
    pub fn new<L: ImageLoader + Send + Sync + 'static>(loader: L) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                loader: Box::new(loader),
                table: Mutex::new(ResourceTable::default()),
            }),
        }
    }

    #[inline]
    pub(crate) fn from_inner(inner: Arc<CacheInner>) -> Self {
        Self { inner }
    }

    /// Look up the resource for `source`, creating it and starting its load if this is the first time the
    /// source has been seen.
    pub fn register(&self, source: &str) -> Registration {
        let (index, resource, created) = {
            let mut table = self.inner.table.lock();
            match table.by_source.get(source).copied() {
                Some(index) => (index, table.resources[index.0].clone(), false),
                None => {
                    let index = ResourceIndex(table.resources.len());
                    let resource = Arc::new(Resource::new(source));
                    table.resources.push(resource.clone());
                    table.by_source.insert(source.to_string(), index);
                    (index, resource, true)
                }
            }
        };

        // the loader may report completion before returning, so no lock can be held here
        if created {
            log::debug!("Loading image resource #{} from \"{}\"", index.0, source);
            let completion = LoadCompletion::new(Arc::downgrade(&self.inner), index, source);
            self.inner.loader.load(source, completion);
        }

        Registration {
            index,
            already_loaded: resource.status() == LoadStatus::Loaded,
        }
    }

    /// Queue a draw of `drawable` onto `context` for when the resource finishes loading.
    ///
    /// If the resource has loaded in the meantime nothing is queued and the image is handed back instead. If it
    /// failed to load, the load error is returned.
    pub fn enqueue_draw(
        &self,
        index: ResourceIndex,
        context: Option<SharedContext>,
        drawable: &ImageDrawable,
    ) -> crate::Result<Enqueued> {
        let resource = self.resource(index)?;
        let mut state = resource.state.lock();
        match &mut *state {
            LoadState::Loading(waiting) => {
                log::trace!(
                    "Image \"{}\" has not loaded yet, deferring draw #{}",
                    resource.source,
                    waiting.pending.len()
                );
                waiting.pending.push(PendingRequest {
                    context,
                    drawable: drawable.clone(),
                });
                Ok(Enqueued::Deferred)
            }
            LoadState::Loaded(image) => Ok(Enqueued::Ready(*image)),
            LoadState::Failed(error) => Err(resource.failure(error.clone())),
        }
    }

    /// Settle a resource and replay its pending requests. Called once per resource by its `LoadCompletion`.
    ///
    /// The resource is marked as settled before any request is replayed, so draws that race with the replay are
    /// served immediately instead of being queued behind it. Replay keeps going past failed draws; the first
    /// failure is returned.
    pub(crate) fn complete(
        &self,
        index: ResourceIndex,
        result: Result<Image, LoadError>,
    ) -> crate::Result {
        let resource = self.resource(index)?;
        let next = match &result {
            Ok(image) => LoadState::Loaded(*image),
            Err(error) => LoadState::Failed(error.clone()),
        };

        let waiting = match resource.state.lock().settle(next) {
            Some(waiting) => waiting,
            None => {
                log::warn!(
                    "Image resource #{} (\"{}\") was already settled",
                    index.0,
                    resource.source
                );
                return Ok(());
            }
        };

        let Waiting {
            pending,
            #[cfg(feature = "async")]
            listeners,
        } = waiting;

        let outcome = match result {
            Ok(image) => {
                log::debug!(
                    "Image resource #{} (\"{}\") loaded, replaying {} pending requests",
                    index.0,
                    resource.source,
                    pending.len()
                );

                let mut first_error = None;
                for PendingRequest { context, drawable } in pending {
                    drawable.mark_loaded();
                    if let Some(context) = context {
                        if let Err(e) = drawable.render(&context, image) {
                            log::error!("Replaying draw of \"{}\" failed: {}", resource.source, e);
                            first_error.get_or_insert(e);
                        }
                    }
                }

                match first_error {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }
            Err(error) => {
                let dropped = pending
                    .iter()
                    .filter(|request| request.context.is_some())
                    .count();
                log::warn!(
                    "Image resource #{} (\"{}\") failed to load: {}; dropping {} pending draws",
                    index.0,
                    resource.source,
                    error,
                    dropped
                );
                Ok(())
            }
        };

        #[cfg(feature = "async")]
        listeners.into_iter().for_each(Waker::wake);

        outcome
    }

    /// The number of resources in this cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.table.lock().resources.len()
    }

    /// Is this cache empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the resource for `source` without creating it.
    #[inline]
    pub fn lookup(&self, source: &str) -> Option<ResourceIndex> {
        self.inner.table.lock().by_source.get(source).copied()
    }

    /// Get the lifecycle status of a resource.
    #[inline]
    pub fn status(&self, index: ResourceIndex) -> crate::Result<LoadStatus> {
        Ok(self.resource(index)?.status())
    }

    /// The number of requests waiting on a resource, including those without a context.
    pub fn pending(&self, index: ResourceIndex) -> crate::Result<usize> {
        let resource = self.resource(index)?;
        let state = resource.state.lock();
        Ok(match &*state {
            LoadState::Loading(waiting) => waiting.pending.len(),
            _ => 0,
        })
    }

    /// The source a resource was registered under.
    #[inline]
    pub fn source(&self, index: ResourceIndex) -> crate::Result<String> {
        Ok(self.resource(index)?.source.clone())
    }

    /// The loaded image behind a resource.
    pub fn image(&self, index: ResourceIndex) -> crate::Result<Image> {
        let resource = self.resource(index)?;
        let state = resource.state.lock();
        match &*state {
            LoadState::Loaded(image) => Ok(*image),
            LoadState::Failed(error) => Err(resource.failure(error.clone())),
            LoadState::Loading(_) => Err(Error::StaticMsg("Image has not finished loading")),
        }
    }

    pub(crate) fn resource(&self, index: ResourceIndex) -> crate::Result<Arc<Resource>> {
        self.inner
            .table
            .lock()
            .resources
            .get(index.0)
            .cloned()
            .ok_or(Error::NoResource(index))
    }
}

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCache")
            .field("resources", &self.len())
            .finish()
    }
}

impl Resource {
    #[inline]
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            state: Mutex::new(LoadState::Loading(Waiting::default())),
        }
    }

    #[inline]
    fn status(&self) -> LoadStatus {
        match &*self.state.lock() {
            LoadState::Loading(_) => LoadStatus::Loading,
            LoadState::Loaded(_) => LoadStatus::Loaded,
            LoadState::Failed(_) => LoadStatus::Failed,
        }
    }

    #[inline]
    fn failure(&self, error: LoadError) -> Error {
        Error::LoadFailed {
            source: self.source.clone(),
            error,
        }
    }

    /// Resolve once the resource leaves the loading state, registering `cx`'s waker otherwise.
    #[cfg(feature = "async")]
    pub(crate) fn poll_settled(&self, cx: &mut Context<'_>) -> Poll<crate::Result<Image>> {
        let mut state = self.state.lock();
        match &mut *state {
            LoadState::Loading(waiting) => {
                if !waiting
                    .listeners
                    .iter()
                    .any(|waker| waker.will_wake(cx.waker()))
                {
                    waiting.listeners.push(cx.waker().clone());
                }
                Poll::Pending
            }
            LoadState::Loaded(image) => Poll::Ready(Ok(*image)),
            LoadState::Failed(error) => Poll::Ready(Err(self.failure(error.clone()))),
        }
    }
}

impl LoadState {
    /// Leave the loading state, handing back whatever was waiting. Returns `None` if already settled.
    #[inline]
    fn settle(&mut self, next: LoadState) -> Option<Waiting> {
        if !matches!(self, LoadState::Loading(_)) {
            return None;
        }

        match mem::replace(self, next) {
            LoadState::Loading(waiting) => Some(waiting),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{image, init_logger, recording, Call},
        Color, Drawable, QueuedLoader, RenderContext,
    };
    use lyon_geom::Angle;
    use std::{sync::Barrier, thread};

    fn cache() -> (QueuedLoader, ImageCache) {
        init_logger();
        let loader = QueuedLoader::new();
        let cache = ImageCache::new(loader.clone());
        (loader, cache)
    }

    #[test]
    fn one_resource_per_source() {
        let (loader, cache) = cache();
        let drawables: Vec<_> = (0..5)
            .map(|i| ImageDrawable::new(&cache, "a.png", i as f32, 0.0, 10.0, 10.0))
            .collect();

        assert_eq!(cache.len(), 1);
        assert_eq!(loader.len(), 1);
        assert_eq!(loader.sources(), vec!["a.png".to_string()]);
        assert!(drawables
            .iter()
            .all(|d| d.index() == drawables[0].index()));
    }

    #[test]
    fn distinct_sources_replay_independently() {
        let (loader, cache) = cache();
        let (record, context) = recording();

        let a1 = ImageDrawable::new(&cache, "a.png", 1.0, 0.0, 10.0, 10.0);
        let a2 = ImageDrawable::new(&cache, "a.png", 2.0, 0.0, 10.0, 10.0);
        let b = ImageDrawable::new(&cache, "b.png", 3.0, 0.0, 10.0, 10.0);
        assert_eq!(cache.len(), 2);
        assert_ne!(a1.index(), b.index());

        for drawable in [&a1, &a2, &b].iter() {
            drawable.draw(Some(&context)).unwrap();
        }
        assert!(record.lock().calls.is_empty());

        loader.take("a.png").unwrap().complete(image(1)).unwrap();
        assert_eq!(
            record.lock().images(),
            vec![
                Call::DrawImage(image(1), 1.0, 0.0, 10.0, 10.0),
                Call::DrawImage(image(1), 2.0, 0.0, 10.0, 10.0),
            ]
        );
        assert!(a1.is_loaded() && a2.is_loaded());
        assert!(!b.is_loaded());
        assert_eq!(cache.status(b.index()).unwrap(), LoadStatus::Loading);
        assert_eq!(cache.pending(b.index()).unwrap(), 2);
    }

    #[test]
    fn pending_draws_replay_in_request_order() {
        let (loader, cache) = cache();
        let (record_a, context_a) = recording();
        let (record_b, context_b) = recording();
        let (order, shared) = recording();

        let d1 = ImageDrawable::new(&cache, "a.png", 1.0, 1.0, 5.0, 5.0);
        let d2 = ImageDrawable::new(&cache, "a.png", 2.0, 2.0, 5.0, 5.0);
        d1.draw(Some(&context_a)).unwrap();
        d2.draw(Some(&context_b)).unwrap();
        d2.draw(Some(&shared)).unwrap();
        d1.draw(Some(&shared)).unwrap();

        loader.pop().unwrap().complete(image(9)).unwrap();

        assert_eq!(
            record_a.lock().calls,
            vec![Call::DrawImage(image(9), 1.0, 1.0, 5.0, 5.0)]
        );
        assert_eq!(
            record_b.lock().calls,
            vec![Call::DrawImage(image(9), 2.0, 2.0, 5.0, 5.0)]
        );
        assert_eq!(
            order.lock().calls,
            vec![
                Call::DrawImage(image(9), 2.0, 2.0, 5.0, 5.0),
                Call::DrawImage(image(9), 1.0, 1.0, 5.0, 5.0),
            ]
        );
        assert_eq!(cache.pending(d1.index()).unwrap(), 0);
    }

    #[test]
    fn loaded_flag_is_set_by_replay_and_stays_set() {
        let (loader, cache) = cache();
        let idle = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        assert!(!idle.is_loaded());
        // the constructor queues a context-less request so replay can flip the flag
        assert_eq!(cache.pending(idle.index()).unwrap(), 1);

        loader.pop().unwrap().complete(image(1)).unwrap();
        assert!(idle.is_loaded());

        let late = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        assert!(late.is_loaded());
        assert_eq!(cache.pending(late.index()).unwrap(), 0);

        let (_, context) = recording();
        late.draw(Some(&context)).unwrap();
        assert!(late.is_loaded() && idle.is_loaded());
    }

    #[test]
    fn draw_without_context_never_renders_or_queues() {
        let (loader, cache) = cache();
        let drawable = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        let before = cache.pending(drawable.index()).unwrap();

        drawable.draw(None).unwrap();
        drawable.draw(None).unwrap();
        assert_eq!(cache.pending(drawable.index()).unwrap(), before);

        loader.pop().unwrap().complete(image(1)).unwrap();
        drawable.draw(None).unwrap();
    }

    #[test]
    fn draws_after_load_render_immediately() {
        let (loader, cache) = cache();
        let (record, context) = recording();
        let drawable = ImageDrawable::new(&cache, "a.png", 4.0, 5.0, 6.0, 7.0);
        loader.pop().unwrap().complete(image(3)).unwrap();

        drawable.draw(Some(&context)).unwrap();
        assert_eq!(
            record.lock().calls,
            vec![Call::DrawImage(image(3), 4.0, 5.0, 7.0, 6.0)]
        );
        assert_eq!(cache.image(drawable.index()).unwrap(), image(3));
    }

    #[test]
    fn replay_uses_geometry_at_completion_time() {
        let (loader, cache) = cache();
        let (record, context) = recording();
        let drawable = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        drawable.draw(Some(&context)).unwrap();
        drawable.set_position(8.0, 9.0).set_width(20.0).set_height(30.0);
        assert!(record.lock().calls.is_empty());

        loader.pop().unwrap().complete(image(1)).unwrap();
        assert_eq!(
            record.lock().calls,
            vec![Call::DrawImage(image(1), 8.0, 9.0, 20.0, 30.0)]
        );
    }

    #[test]
    fn failed_loads_surface_an_error() {
        let (loader, cache) = cache();
        let (record, context) = recording();
        let drawable = ImageDrawable::new(&cache, "missing.png", 0.0, 0.0, 1.0, 1.0);
        drawable.draw(Some(&context)).unwrap();

        loader.pop().unwrap().fail("404").unwrap();
        assert!(record.lock().calls.is_empty());
        assert!(!drawable.is_loaded());
        assert_eq!(cache.status(drawable.index()).unwrap(), LoadStatus::Failed);

        match drawable.draw(Some(&context)) {
            Err(Error::LoadFailed { source, error }) => {
                assert_eq!(source, "missing.png");
                assert_eq!(error, LoadError::Failed("404".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // no retry: the failed resource is reused
        let again = ImageDrawable::new(&cache, "missing.png", 0.0, 0.0, 1.0, 1.0);
        assert_eq!(again.index(), drawable.index());
        assert!(loader.is_empty());
    }

    #[test]
    fn dropped_completion_is_reported_as_abandoned() {
        let (loader, cache) = cache();
        let drawable = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        drop(loader.pop());

        match cache.image(drawable.index()) {
            Err(Error::LoadFailed { error, .. }) => assert_eq!(error, LoadError::Abandoned),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn replay_continues_past_failed_draws() {
        let (loader, cache) = cache();
        let (broken, broken_context) = recording();
        broken.lock().reject_images = true;
        let (record, context) = recording();

        let drawable = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        drawable.draw(Some(&broken_context)).unwrap();
        drawable.draw(Some(&context)).unwrap();

        let result = loader.pop().unwrap().complete(image(2));
        assert!(matches!(result, Err(Error::UnknownImage(_))));
        assert_eq!(record.lock().images().len(), 1);
        assert!(drawable.is_loaded());
    }

    #[test]
    fn loaders_may_complete_synchronously() {
        init_logger();
        let cache = ImageCache::new(|_source: &str, completion: LoadCompletion| {
            completion.complete(image(5)).unwrap();
        });

        let registration = cache.register("inline.png");
        assert!(registration.already_loaded);

        let drawable = ImageDrawable::new(&cache, "inline.png", 0.0, 0.0, 1.0, 1.0);
        assert!(drawable.is_loaded());
        assert_eq!(cache.pending(drawable.index()).unwrap(), 0);
    }

    #[test]
    fn unknown_indices_are_errors() {
        let (_loader, cache) = cache();
        assert!(matches!(
            cache.status(ResourceIndex(3)),
            Err(Error::NoResource(ResourceIndex(3)))
        ));
        assert_eq!(cache.lookup("a.png"), None);
        let registration = cache.register("a.png");
        assert_eq!(cache.lookup("a.png"), Some(registration.index));
        assert_eq!(cache.source(registration.index).unwrap(), "a.png");
    }

    /// A context that draws another drawable the first time an image lands on it.
    struct ChainedContext {
        next: Option<(ImageDrawable, SharedContext)>,
        images: usize,
    }

    impl RenderContext for ChainedContext {
        fn set_fill_color(&mut self, _: Color) -> crate::Result {
            Ok(())
        }
        fn set_stroke_color(&mut self, _: Color) -> crate::Result {
            Ok(())
        }
        fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32) -> crate::Result {
            Ok(())
        }
        fn stroke_rect(&mut self, _: f32, _: f32, _: f32, _: f32) -> crate::Result {
            Ok(())
        }
        fn begin_path(&mut self) -> crate::Result {
            Ok(())
        }
        fn arc(&mut self, _: f32, _: f32, _: f32, _: Angle<f32>, _: Angle<f32>) -> crate::Result {
            Ok(())
        }
        fn fill(&mut self) -> crate::Result {
            Ok(())
        }
        fn stroke(&mut self) -> crate::Result {
            Ok(())
        }
        fn draw_image(&mut self, _: Image, _: f32, _: f32, _: f32, _: f32) -> crate::Result {
            self.images += 1;
            match self.next.take() {
                Some((drawable, context)) => drawable.draw(Some(&context)),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn draws_during_replay_render_immediately() {
        let (loader, cache) = cache();
        let (record, context) = recording();

        let first = ImageDrawable::new(&cache, "a.png", 1.0, 0.0, 1.0, 1.0);
        let chained = Arc::new(Mutex::new(ChainedContext {
            next: None,
            images: 0,
        }));
        let chained_context: SharedContext = chained.clone();
        first.draw(Some(&chained_context)).unwrap();

        // queued behind the chained draw, so it is still unloaded when that draw runs
        let second = ImageDrawable::new(&cache, "a.png", 2.0, 0.0, 1.0, 1.0);
        assert!(!second.is_loaded());
        chained.lock().next = Some((second.clone(), context));

        loader.pop().unwrap().complete(image(1)).unwrap();

        assert_eq!(chained.lock().images, 1);
        assert_eq!(
            record.lock().calls,
            vec![Call::DrawImage(image(1), 2.0, 0.0, 1.0, 1.0)]
        );
        assert!(second.is_loaded());
        assert_eq!(cache.pending(second.index()).unwrap(), 0);
    }

    #[test]
    fn completion_from_another_thread_renders_each_draw_once() {
        let (loader, cache) = cache();
        ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        let completion = loader.pop().unwrap();

        let start = Arc::new(Barrier::new(2));
        let completer = {
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                completion.complete(image(7))
            })
        };

        start.wait();
        let records: Vec<_> = (0..64)
            .map(|i| {
                let (record, context) = recording();
                let drawable = ImageDrawable::new(&cache, "a.png", i as f32, 0.0, 1.0, 1.0);
                drawable.draw(Some(&context)).unwrap();
                record
            })
            .collect();

        completer.join().unwrap().unwrap();

        assert_eq!(cache.status(ResourceIndex(0)).unwrap(), LoadStatus::Loaded);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(
                record.lock().calls,
                vec![Call::DrawImage(image(7), i as f32, 0.0, 1.0, 1.0)]
            );
        }
    }

    #[test]
    fn completions_outlive_cache_handles() {
        let (loader, cache) = cache();
        ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);
        let completion = loader.pop().unwrap();
        drop(cache);
        completion.complete(image(1)).unwrap();
    }
}
