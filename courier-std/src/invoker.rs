//! The standard route invoker.

use courier_core::{
    CancellationToken, Context, Fault, Parameters, Response, RouteInvoker, RouteMatch,
};

/// Runs matched routes and answers unmatched requests with `404 Not Found`.
///
/// Before running a route, the captured parameters are copied into the
/// context so that post and error hooks can see them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInvoker;

impl RouteInvoker for DefaultInvoker {
    async fn invoke(
        &self,
        route: &RouteMatch,
        cancel: &CancellationToken,
        parameters: Parameters,
        ctx: &mut Context,
    ) -> Result<Response, Fault> {
        match route {
            RouteMatch::NotFound => Ok(Response::not_found()),
            RouteMatch::Matched(route) => {
                ctx.set_parameters(parameters.clone());
                route.invoke(parameters, cancel.clone()).await
            }
        }
    }
}
