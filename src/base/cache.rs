use log::debug;

/// A single-slot memo of a distribution handle, keyed by the parameters it was built from.
///
/// The handle is rebuilt when no parameters were seen yet, when the parameter count changes or
/// when any parameter differs from the previous call (`f64` equality, NaN always rebuilds).
/// A failed build is remembered just like a successful one.
#[derive(Clone, Debug)]
pub struct ParamCache<H> {
    params: Option<Vec<f64>>,
    handle: Option<H>,
    builds: usize,
}

impl<H> ParamCache<H> {
    /// Create a new, empty [`ParamCache`].
    pub fn new() -> Self {
        Self {
            params: None,
            handle: None,
            builds: 0,
        }
    }

    /// Number of times the build function has been invoked.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Returns the cached handle for `params`, invoking `build` only if the parameters differ
    /// from the previous call.
    pub fn get_or_build<F>(&mut self, params: &[f64], build: F) -> Option<&H>
    where
        F: FnOnce(&[f64]) -> Option<H>,
    {
        let hit = self
            .params
            .as_deref()
            .is_some_and(|previous| previous == params);

        if !hit {
            debug!("ParamCache::get_or_build rebuilding handle for {:?}", params);

            self.handle = build(params);
            self.builds += 1;

            match self.params.as_mut() {
                Some(previous) => {
                    previous.clear();
                    previous.extend_from_slice(params);
                }
                None => self.params = Some(params.to_vec()),
            }
        }

        self.handle.as_ref()
    }
}

impl<H> Default for ParamCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
