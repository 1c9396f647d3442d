//! Ordered hook pipelines.
//!
//! A resolution carries at most one hook per slot. These pipelines let a
//! resolver put several hooks behind that one slot.
//!
//! | Pipeline | Stops at | Is a |
//! |----------|----------|------|
//! | [`BeforePipeline`] | first item returning a response | [`PreHook`] |
//! | [`AfterPipeline`] | never, every item runs | [`PostHook`] |
//! | [`ErrorPipeline`] | first item returning a response | [`ErrorHook`] |

use courier_core::{
    CancellationToken, Context, DynPostHook, DynPreHook, ErrorHook, Fault, PostHook, PreHook,
    Response,
};

type SyncBefore = Box<dyn Fn(&mut Context) -> Option<Response> + Send + Sync>;
type SyncAfter = Box<dyn Fn(&mut Context) + Send + Sync>;

enum BeforeItem {
    Sync(SyncBefore),
    Async(Box<dyn DynPreHook>),
}

/// Pre hooks run in order until one produces a response.
///
/// ```rust,ignore
/// let before = BeforePipeline::new()
///     .with_sync(|ctx| ctx.request().headers().get(AUTHORIZATION).is_none()
///         .then(|| Response::new(StatusCode::UNAUTHORIZED)))
///     .with_hook(LoadSession::new(store));
/// ```
#[derive(Default)]
pub struct BeforePipeline {
    items: Vec<BeforeItem>,
}

impl BeforePipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a synchronous item.
    pub fn with_sync<F>(mut self, item: F) -> Self
    where
        F: Fn(&mut Context) -> Option<Response> + Send + Sync + 'static,
    {
        self.items.push(BeforeItem::Sync(Box::new(item)));
        self
    }

    /// Append an asynchronous pre hook.
    pub fn with_hook<H: PreHook>(mut self, hook: H) -> Self {
        self.items.push(BeforeItem::Async(Box::new(hook)));
        self
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pipeline has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PreHook for BeforePipeline {
    async fn before(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        for item in &self.items {
            let response = match item {
                BeforeItem::Sync(item) => item(ctx),
                BeforeItem::Async(hook) => hook.before_dyn(ctx, cancel).await?,
            };
            if response.is_some() {
                return Ok(response);
            }
        }
        Ok(None)
    }
}

enum AfterItem {
    Sync(SyncAfter),
    Async(Box<dyn DynPostHook>),
}

/// Post hooks run in order. A fault stops the pipeline.
#[derive(Default)]
pub struct AfterPipeline {
    items: Vec<AfterItem>,
}

impl AfterPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a synchronous item.
    pub fn with_sync<F>(mut self, item: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.items.push(AfterItem::Sync(Box::new(item)));
        self
    }

    /// Append an asynchronous post hook.
    pub fn with_hook<H: PostHook>(mut self, hook: H) -> Self {
        self.items.push(AfterItem::Async(Box::new(hook)));
        self
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pipeline has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PostHook for AfterPipeline {
    async fn after(&self, ctx: &mut Context, cancel: &CancellationToken) -> Result<(), Fault> {
        for item in &self.items {
            match item {
                AfterItem::Sync(item) => item(ctx),
                AfterItem::Async(hook) => hook.after_dyn(ctx, cancel).await?,
            }
        }
        Ok(())
    }
}

/// Error hooks tried in order; the first response wins.
#[derive(Default)]
pub struct ErrorPipeline {
    items: Vec<Box<dyn ErrorHook>>,
}

impl ErrorPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error hook.
    pub fn with<H: ErrorHook>(mut self, hook: H) -> Self {
        self.items.push(Box::new(hook));
        self
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pipeline has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ErrorHook for ErrorPipeline {
    fn on_error(&self, ctx: &mut Context, fault: &Fault) -> Option<Response> {
        self.items.iter().find_map(|hook| hook.on_error(ctx, fault))
    }
}
