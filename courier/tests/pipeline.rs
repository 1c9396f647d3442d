use courier::{
    CancellationToken, Context, DynPostHook, DynPreHook, DynRequestDispatcher, Fault, Parameters,
    PostHook, PreHook, RequestDispatcher, Resolution, Response, Route,
    testing::{
        CountingInvoker, FailingHook, FakeRoute, Journal, RecordingPostHook, RecordingPreHook,
        TestFailure,
    },
};
use http::{Method, StatusCode};
use std::sync::Arc;

mod common;
use common::{ctx, dispatcher};

fn unavailable(_ctx: &mut Context, _fault: &Fault) -> Option<Response> {
    Some(Response::new(StatusCode::SERVICE_UNAVAILABLE))
}

fn cancelled_to_timeout(_ctx: &mut Context, fault: &Fault) -> Option<Response> {
    fault
        .is_cancelled()
        .then(|| Response::new(StatusCode::REQUEST_TIMEOUT))
}

/// Cancels the request, then never finishes.
struct CancellingHook;

impl PreHook for CancellingHook {
    async fn before(
        &self,
        _ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        cancel.cancel();
        futures::future::pending().await
    }
}

impl PostHook for CancellingHook {
    async fn after(&self, _ctx: &mut Context, cancel: &CancellationToken) -> Result<(), Fault> {
        cancel.cancel();
        futures::future::pending().await
    }
}

#[tokio::test]
async fn test_short_circuit_never_invokes_route() {
    let fake = FakeRoute::responding(Response::text("from route"));
    let post = RecordingPostHook::new();
    let invoker = CountingInvoker::new();
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_before(RecordingPreHook::responding(Response::new(
            StatusCode::FORBIDDEN,
        )))
        .with_after(post.clone());
    let dispatcher = dispatcher(resolution, invoker.clone());

    let response = dispatcher
        .dispatch(&mut ctx("/"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(invoker.count(), 0);
    assert!(!fake.was_invoked());
    assert_eq!(post.seen(), [Some(StatusCode::FORBIDDEN)]);
}

#[tokio::test]
async fn test_post_hook_view_of_short_circuit_is_published() {
    let fake = FakeRoute::responding(Response::text("from route"));
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_before(RecordingPreHook::responding(Response::new(
            StatusCode::FORBIDDEN,
        )))
        .with_after(RecordingPostHook::replacing(Response::new(
            StatusCode::UNAUTHORIZED,
        )));
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let response = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.response().unwrap().status(), StatusCode::UNAUTHORIZED);
    assert!(!fake.was_invoked());
}

#[tokio::test]
async fn test_post_hook_runs_once_after_invocation() {
    let journal = Journal::new();
    let fake = FakeRoute::responding(Response::text("ok")).with_journal(&journal, "route");
    let post = RecordingPostHook::new().with_journal(&journal, "post");
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_before(RecordingPreHook::new().with_journal(&journal, "pre"))
        .with_after(post.clone());
    let dispatcher = dispatcher(resolution, CountingInvoker::new());

    let response = dispatcher
        .dispatch(&mut ctx("/"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.body().as_bytes().unwrap(), "ok");
    assert_eq!(journal.entries(), ["pre", "route", "post"]);
    assert_eq!(post.count(), 1);
}

#[tokio::test]
async fn test_post_hook_runs_once_after_short_circuit() {
    let journal = Journal::new();
    let fake = FakeRoute::responding(Response::text("ok")).with_journal(&journal, "route");
    let post = RecordingPostHook::new().with_journal(&journal, "post");
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_before(
            RecordingPreHook::responding(Response::new(StatusCode::NOT_MODIFIED))
                .with_journal(&journal, "pre"),
        )
        .with_after(post.clone());
    let dispatcher = dispatcher(resolution, CountingInvoker::new());

    dispatcher
        .dispatch(&mut ctx("/"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(journal.entries(), ["pre", "post"]);
    assert_eq!(post.count(), 1);
}

#[tokio::test]
async fn test_invocation_fault_is_recovered() {
    let post = RecordingPostHook::new();
    let resolution = Resolution::matched(FakeRoute::failing("db down").route(), Parameters::new())
        .with_after(post.clone())
        .with_on_error(|_ctx: &mut Context, fault: &Fault| -> Option<Response> {
            let failure = fault.downcast_ref::<TestFailure>()?;
            Some(Response::text(failure.0).with_status(StatusCode::BAD_GATEWAY))
        });
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let response = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.body().as_bytes().unwrap(), "db down");
    assert_eq!(ctx.response().unwrap().status(), StatusCode::BAD_GATEWAY);
    assert_eq!(post.count(), 0, "post hook does not re-run after recovery");
}

#[tokio::test]
async fn test_pre_hook_fault_is_recovered() {
    let fake = FakeRoute::responding(Response::text("ok"));
    let failing = FailingHook::new("auth backend down");
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_before(failing.clone())
        .with_on_error(unavailable);
    let dispatcher = dispatcher(resolution, CountingInvoker::new());

    let response = dispatcher
        .dispatch(&mut ctx("/"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(failing.count(), 1);
    assert!(!fake.was_invoked());
}

#[tokio::test]
async fn test_unrecovered_post_hook_fault_propagates_unchanged() {
    let resolution = Resolution::matched(
        FakeRoute::responding(Response::text("ok")).route(),
        Parameters::new(),
    )
    .with_after(FailingHook::new("post exploded"));
    let dispatcher = dispatcher(resolution, CountingInvoker::new());

    let fault = dispatcher
        .dispatch(&mut ctx("/"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        fault.downcast_ref::<TestFailure>(),
        Some(&TestFailure("post exploded"))
    );
}

#[tokio::test]
async fn test_declining_error_hook_propagates_fault() {
    let resolution = Resolution::matched(FakeRoute::failing("nope").route(), Parameters::new())
        .with_on_error(|_ctx: &mut Context, fault: &Fault| -> Option<Response> {
            fault
                .is_cancelled()
                .then(|| Response::new(StatusCode::SERVICE_UNAVAILABLE))
        });
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let fault = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(fault.downcast_ref::<TestFailure>(), Some(&TestFailure("nope")));
    assert!(ctx.response().is_none());
}

fn cancelling_route() -> Route {
    Route::new(Method::GET, "/slow", |_, cancel: CancellationToken| async move {
        cancel.cancel();
        futures::future::pending::<Result<Response, Fault>>().await
    })
}

#[tokio::test]
async fn test_cancellation_during_invocation_is_recovered() {
    let post = RecordingPostHook::new();
    let resolution = Resolution::matched(cancelling_route(), Parameters::new())
        .with_after(post.clone())
        .with_on_error(|_ctx: &mut Context, fault: &Fault| -> Option<Response> {
            fault
                .is_cancelled()
                .then(|| Response::new(StatusCode::REQUEST_TIMEOUT))
        });
    let dispatcher = dispatcher(resolution, CountingInvoker::new());

    let response = dispatcher
        .dispatch(&mut ctx("/slow"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(post.count(), 0);
}

#[tokio::test]
async fn test_cancellation_without_error_hook_propagates() {
    let resolution = Resolution::matched(cancelling_route(), Parameters::new());
    let dispatcher = dispatcher(resolution, CountingInvoker::new());

    let fault = dispatcher
        .dispatch(&mut ctx("/slow"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(fault.is_cancelled());
}

#[tokio::test]
async fn test_cancelled_before_dispatch_skips_route() {
    let fake = FakeRoute::responding(Response::text("ok"));
    let invoker = CountingInvoker::new();
    let dispatcher = dispatcher(
        Resolution::matched(fake.route(), Parameters::new()),
        invoker.clone(),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let fault = dispatcher
        .dispatch(&mut ctx("/"), &cancel)
        .await
        .unwrap_err();

    assert!(fault.is_cancelled());
    assert_eq!(invoker.count(), 0);
    assert!(!fake.was_invoked());
}

#[tokio::test]
async fn test_concurrent_dispatches_are_independent() {
    let fake = FakeRoute::responding(Response::text("ok"));
    let invoker = CountingInvoker::new();
    let resolution = Resolution::matched(fake.route(), Parameters::new());
    let dispatcher: Arc<dyn DynRequestDispatcher> =
        Arc::new(dispatcher(resolution, invoker.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let mut ctx = ctx(&format!("/{i}"));
                let response = dispatcher
                    .dispatch_dyn(&mut ctx, &CancellationToken::new())
                    .await?;
                Ok::<_, Fault>((response.status(), ctx.request().path().to_owned()))
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let (status, path) = task.await.unwrap().unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(path, format!("/{i}"));
    }
    assert_eq!(invoker.count(), 8);
    assert_eq!(fake.invocation_count(), 8);
}

#[tokio::test]
async fn test_shared_hooks_run_through_dispatch() {
    let pre = RecordingPreHook::new();
    let post = RecordingPostHook::new();
    let shared_pre: Arc<dyn DynPreHook> = Arc::new(pre.clone());
    let shared_post: Arc<dyn DynPostHook> = Arc::new(post.clone());
    let fake = FakeRoute::responding(Response::text("ok"));

    for _ in 0..2 {
        let resolution = Resolution::matched(fake.route(), Parameters::new())
            .with_before(shared_pre.clone())
            .with_after(shared_post.clone());
        let response = dispatcher(resolution, CountingInvoker::new())
            .dispatch(&mut ctx("/"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(pre.count(), 2);
    assert_eq!(post.count(), 2);
    assert_eq!(fake.invocation_count(), 2);
}

#[tokio::test]
async fn test_post_hook_fault_is_recovered() {
    let fake = FakeRoute::responding(Response::text("ok"));
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_after(FailingHook::new("post exploded"))
        .with_on_error(|_ctx: &mut Context, fault: &Fault| -> Option<Response> {
            fault
                .downcast_ref::<TestFailure>()
                .map(|_| Response::new(StatusCode::IM_A_TEAPOT))
        });
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let response = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(ctx.response().unwrap().status(), StatusCode::IM_A_TEAPOT);
    assert!(fake.was_invoked());
}

#[tokio::test]
async fn test_cleared_slot_is_recovered() {
    let resolution = Resolution::matched(
        FakeRoute::responding(Response::text("ok")).route(),
        Parameters::new(),
    )
    .with_after(RecordingPostHook::clearing())
    .with_on_error(|_ctx: &mut Context, fault: &Fault| -> Option<Response> {
        matches!(fault, Fault::MissingResponse)
            .then(|| Response::new(StatusCode::INTERNAL_SERVER_ERROR))
    });
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let response = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        ctx.response().unwrap().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_cleared_slot_without_error_hook_faults() {
    let post = RecordingPostHook::clearing();
    let resolution = Resolution::matched(
        FakeRoute::responding(Response::text("ok")).route(),
        Parameters::new(),
    )
    .with_after(post.clone());
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let fault = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(fault, Fault::MissingResponse));
    assert_eq!(post.count(), 1);
    assert!(ctx.response().is_none());
}

#[tokio::test]
async fn test_cancellation_in_post_hook_is_recovered() {
    let fake = FakeRoute::responding(Response::text("ok"));
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_after(CancellingHook)
        .with_on_error(cancelled_to_timeout);
    let dispatcher = dispatcher(resolution, CountingInvoker::new());
    let mut ctx = ctx("/");

    let response = dispatcher
        .dispatch(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(ctx.response().unwrap().status(), StatusCode::REQUEST_TIMEOUT);
    assert!(fake.was_invoked());
}

#[tokio::test]
async fn test_cancellation_in_pre_hook_is_recovered() {
    let fake = FakeRoute::responding(Response::text("ok"));
    let invoker = CountingInvoker::new();
    let resolution = Resolution::matched(fake.route(), Parameters::new())
        .with_before(CancellingHook)
        .with_on_error(cancelled_to_timeout);
    let dispatcher = dispatcher(resolution, invoker.clone());

    let response = dispatcher
        .dispatch(&mut ctx("/"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(invoker.count(), 0);
    assert!(!fake.was_invoked());
}
