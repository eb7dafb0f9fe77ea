//! Request pipeline orchestration.
//!
//! # Responsibilities
//! - Resolve the servlet, build and run the filter chain
//! - Bracket every request with filter start/stop
//! - Convert any failure into an error response, exactly once
//! - Run error page resolution and flush the response
//!
//! # Design Decisions
//! - `process` never fails; every error ends up in the response
//! - Servlets are instantiated and initialised per request and destroyed
//!   once the chain returns
//! - A failure raised after the error has already been rendered only
//!   re-renders the default page

use std::sync::Arc;
use std::time::Instant;

use crate::application::context::Context;
use crate::application::error_page::ErrorPageResolver;
use crate::config::loader::ConfigError;
use crate::config::schema::ApplicationConfig;
use crate::error::ServletError;
use crate::filter::chain::ChainOutcome;
use crate::filter::config::DispatcherTypes;
use crate::filter::factory::FilterChainFactory;
use crate::http::{attributes, Request, Response};
use crate::observability::{metrics, tracing::request_span};
use crate::registry::Registry;
use crate::servlet::{Servlet, ServletConfig};

/// Runs requests through one application.
#[derive(Debug)]
pub struct Host {
    context: Context,
    chain_factory: FilterChainFactory,
}

impl Host {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            chain_factory: FilterChainFactory::new(),
        }
    }

    pub fn from_config(config: &ApplicationConfig, registry: Arc<Registry>) -> Result<Self, ConfigError> {
        Ok(Self::new(Context::from_config(config, registry)?))
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Run `request` through the pipeline and return the committed response.
    pub fn process(&mut self, mut request: Request) -> Response {
        let span = request_span(&request);
        let _guard = span.enter();
        let start = Instant::now();

        let mut response = Response::new(self.context.autoflush());
        if request.attribute(attributes::BASE_PATH).is_none() {
            let base = self.context.base_path().display().to_string();
            request.set_attribute(attributes::BASE_PATH, base);
        }

        self.context.filter_start();
        let servlet_name = match self.service(&mut request, &mut response) {
            Ok(servlet_name) => servlet_name,
            Err(err) => {
                self.fail(&mut request, &mut response, err);
                None
            }
        };
        self.context.filter_stop();

        response.flush_buffer();
        metrics::record_request(
            servlet_name.as_deref().unwrap_or("-"),
            response.status(),
            start.elapsed(),
        );
        response
    }

    /// Resolve, run and resolve errors. Returns the servlet that handled it.
    fn service(&self, request: &mut Request, response: &mut Response) -> Result<Option<String>, ServletError> {
        let mapping = self.context.router().resolve(request.path())?;
        request.set_servlet_path(mapping.servlet_path.clone());
        request.set_path_info(Some(mapping.path_info.clone()));

        let def = self
            .context
            .find_servlet(&mapping.servlet_name)
            .ok_or_else(|| ServletError::NoHandlerAvailable {
                path: request.path().to_string(),
            })?;
        let config = ServletConfig::from_def(def, Some(&mapping.pattern));

        let mut servlet = self.context.registry().create_servlet(&def.class)?;
        servlet.init(&config)?;
        tracing::debug!(servlet = %mapping.servlet_name, class = %def.class, "Servlet initialised");

        let result = self.run_chain(servlet.as_ref(), &mapping.servlet_name, request, response);
        servlet.destroy();
        result?;

        if !response.is_committed() && response.is_error() {
            ErrorPageResolver::commit(request, response, &self.context);
        }
        Ok(Some(mapping.servlet_name))
    }

    fn run_chain(
        &self,
        servlet: &dyn Servlet,
        servlet_name: &str,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        let chain = self.chain_factory.create_filter_chain(
            &self.context,
            request,
            servlet_name,
            servlet,
            DispatcherTypes::REQUEST,
        );

        match chain {
            Some(mut chain) => {
                metrics::record_filter_chain(chain.len());
                if let ChainOutcome::ShortCircuited { at } = chain.do_filter(request, response)? {
                    tracing::debug!(filter = %at, servlet = %servlet_name, "Filter chain short-circuited");
                }
            }
            None => servlet.service(&self.context, request, response)?,
        }
        Ok(())
    }

    /// Turn a failure into an error response.
    fn fail(&self, request: &mut Request, response: &mut Response, err: ServletError) {
        tracing::error!(
            error = %err,
            kind = err.kind(),
            path = %request.path(),
            "Request failed"
        );

        let message = err.to_string();
        if response.send_error(err.status_code(), message.clone()).is_err() {
            tracing::warn!(path = %request.path(), "Response already committed, cannot report failure");
            return;
        }
        request.set_attribute(attributes::ERROR_MESSAGE, message.clone());
        request.set_attribute(attributes::ERROR_EXCEPTION, message);
        request.set_attribute(attributes::ERROR_EXCEPTION_TYPE, err.kind());

        if response.is_error_resolved() {
            // Already inside error handling for this request.
            ErrorPageResolver::render_default(request, response);
        } else {
            ErrorPageResolver::commit(request, response, &self.context);
        }
    }
}
