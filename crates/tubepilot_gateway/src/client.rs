use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tubepilot_core::{
    Analytics, LogPage, LogQuery, QuotaInfo, RemoteSchedulerConfig, ScraperResult,
    SchedulerStatus, SettingsPatch, UploadResult,
};
use tubepilot_logging::{pilot_debug, pilot_error, pilot_info, pilot_warn};
use url::Url;

use crate::error::map_reqwest_error;
use crate::gateway::{ProgressSink, RemoteGateway};
use crate::upload::build_upload_form;
use crate::wire::{
    BatchScrapeRequest, DownloadRequest, DownloadResponse, ProcessRequest, ProcessResponse,
    ScrapeRequest, UploadRequest,
};
use crate::{CredentialStore, FailureKind, GatewayError, GatewaySettings, SessionObserver};

/// HTTP implementation of [`RemoteGateway`] over a single base URL.
pub struct ReqwestGateway {
    client: reqwest::Client,
    settings: GatewaySettings,
    credentials: CredentialStore,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl ReqwestGateway {
    pub fn new(
        settings: GatewaySettings,
        credentials: CredentialStore,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            settings,
            credentials,
            observer: None,
        })
    }

    /// Registers the listener told about a 401 after the credential is dropped.
    pub fn with_session_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.settings.base_url.join(path).map_err(|err| {
            GatewayError::new(
                FailureKind::Validation,
                format!("invalid endpoint {path:?}: {err}"),
            )
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, GatewayError> {
        let url = self.endpoint(path)?;
        pilot_debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match self.credentials.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await.map_err(|err| {
            let err = map_reqwest_error(err);
            pilot_warn!("Request failed before a response arrived: {}", err);
            err
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let err = GatewayError::from_status(status.as_u16(), &body);
        pilot_warn!("{} answered {}: {}", url, status, err);
        if err.kind == FailureKind::Unauthorized {
            self.end_session();
        }
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            GatewayError::new(FailureKind::Server, format!("malformed response: {err}"))
        })
    }

    async fn execute_unit(&self, builder: RequestBuilder) -> Result<(), GatewayError> {
        self.execute(builder).await.map(|_| ())
    }

    fn end_session(&self) {
        pilot_info!("Session ended by the service; dropping stored credential");
        if let Err(err) = self.credentials.clear() {
            pilot_error!("Failed to remove stored credential: {}", err);
        }
        if let Some(observer) = &self.observer {
            observer.session_ended();
        }
    }
}

#[async_trait]
impl RemoteGateway for ReqwestGateway {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScraperResult, GatewayError> {
        let builder = self.request(Method::POST, "scrape")?.json(request);
        self.execute_json(builder).await
    }

    async fn scrape_batch(
        &self,
        request: &BatchScrapeRequest,
    ) -> Result<Vec<ScraperResult>, GatewayError> {
        let builder = self.request(Method::POST, "scrape/batch")?.json(request);
        self.execute_json(builder).await
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadResponse, GatewayError> {
        let builder = self.request(Method::POST, "download")?.json(request);
        self.execute_json(builder).await
    }

    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResponse, GatewayError> {
        let builder = self.request(Method::POST, "process")?.json(request);
        self.execute_json(builder).await
    }

    async fn upload(
        &self,
        request: &UploadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<UploadResult, GatewayError> {
        let form = build_upload_form(request, progress).await?;
        let builder = self.request(Method::POST, "upload")?.multipart(form);
        self.execute_json(builder).await
    }

    async fn scheduler_config(&self) -> Result<RemoteSchedulerConfig, GatewayError> {
        let builder = self.request(Method::GET, "scheduler/config")?;
        self.execute_json(builder).await
    }

    async fn update_scheduler_config(
        &self,
        config: &RemoteSchedulerConfig,
    ) -> Result<(), GatewayError> {
        let builder = self.request(Method::PUT, "scheduler/config")?.json(config);
        self.execute_unit(builder).await
    }

    async fn start_scheduler(&self) -> Result<(), GatewayError> {
        let builder = self.request(Method::POST, "scheduler/start")?;
        self.execute_unit(builder).await
    }

    async fn stop_scheduler(&self) -> Result<(), GatewayError> {
        let builder = self.request(Method::POST, "scheduler/stop")?;
        self.execute_unit(builder).await
    }

    async fn scheduler_status(&self) -> Result<SchedulerStatus, GatewayError> {
        let builder = self.request(Method::GET, "scheduler/status")?;
        self.execute_json(builder).await
    }

    async fn quota(&self) -> Result<QuotaInfo, GatewayError> {
        let builder = self.request(Method::GET, "quota")?;
        self.execute_json(builder).await
    }

    async fn analytics(&self) -> Result<Analytics, GatewayError> {
        let builder = self.request(Method::GET, "analytics")?;
        self.execute_json(builder).await
    }

    async fn settings(&self) -> Result<SettingsPatch, GatewayError> {
        let builder = self.request(Method::GET, "settings")?;
        self.execute_json(builder).await
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> Result<(), GatewayError> {
        let builder = self.request(Method::PUT, "settings")?.json(patch);
        self.execute_unit(builder).await
    }

    async fn logs(&self, query: &LogQuery) -> Result<LogPage, GatewayError> {
        let builder = self.request(Method::GET, "logs")?.query(query);
        self.execute_json(builder).await
    }

    async fn clear_logs(&self) -> Result<(), GatewayError> {
        let builder = self.request(Method::DELETE, "logs")?;
        self.execute_unit(builder).await
    }
}
