// MIT/Apache2 License

use super::{Image, ImageCache, ImageDrawable, ResourceIndex};
use futures_lite::future;

impl ImageCache {
    /// Wait for a resource to settle, resolving to its image or to the error it failed with.
    pub async fn loaded(&self, index: ResourceIndex) -> crate::Result<Image> {
        let resource = self.resource(index)?;
        future::poll_fn(|cx| resource.poll_settled(cx)).await
    }
}

impl ImageDrawable {
    /// Wait until this drawable's resource has settled.
    ///
    /// Once this resolves successfully, this drawable draws immediately. Draws queued before the load completed
    /// may still be replaying on the thread that reported the completion.
    #[inline]
    pub async fn ready(&self) -> crate::Result<Image> {
        self.cache().loaded(self.index()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::image, Error, LoadError, QueuedLoader};
    use futures_lite::future::{block_on, poll_once};

    #[test]
    fn resolves_after_completion() {
        let loader = QueuedLoader::new();
        let cache = ImageCache::new(loader.clone());
        let drawable = ImageDrawable::new(&cache, "a.png", 0.0, 0.0, 1.0, 1.0);

        let mut ready = Box::pin(drawable.ready());
        assert!(block_on(poll_once(&mut ready)).is_none());

        loader.pop().unwrap().complete(image(4)).unwrap();
        assert_eq!(block_on(ready).unwrap(), image(4));
        assert!(drawable.is_loaded());
    }

    #[test]
    fn resolves_to_the_load_error() {
        let loader = QueuedLoader::new();
        let cache = ImageCache::new(loader.clone());
        let index = cache.register("a.png").index;
        loader.pop().unwrap().fail("corrupt").unwrap();

        match block_on(cache.loaded(index)) {
            Err(Error::LoadFailed { error, .. }) => {
                assert_eq!(error, LoadError::Failed("corrupt".to_string()))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
